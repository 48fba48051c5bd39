//! Address bar routes of the form `#<courseId>/<part>`.

use bridge_traits::location::RouteState;
use core_content::Part;
use std::fmt;

/// A parsed `#<courseId>/<part>` fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub course_id: String,
    pub part: Part,
}

impl Route {
    pub fn new(course_id: impl Into<String>, part: Part) -> Self {
        Self {
            course_id: course_id.into(),
            part,
        }
    }

    /// Parse a fragment. The leading `#` is optional.
    ///
    /// Exactly two non-empty segments are accepted and the second must be
    /// `A` or `B`. Anything else is not a route.
    pub fn parse(hash: &str) -> Option<Route> {
        let route = hash.strip_prefix('#').unwrap_or(hash);
        if route.is_empty() {
            return None;
        }

        let mut segments = route.split('/');
        let course_id = segments.next()?;
        let part = segments.next()?;
        if segments.next().is_some() || course_id.is_empty() {
            return None;
        }

        Some(Route::new(course_id, Part::parse(part)?))
    }

    /// Fragment including the leading `#`.
    pub fn to_hash(&self) -> String {
        self.to_string()
    }

    pub fn to_state(&self) -> RouteState {
        RouteState {
            course_id: self.course_id.clone(),
            part: self.part.as_str().to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}/{}", self.course_id, self.part)
    }
}
