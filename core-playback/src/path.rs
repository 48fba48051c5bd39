//! Audio path resolution.
//!
//! Lesson files reference audio relative to the site root
//! (`Sound/Class01/a_1.opus`). The page itself may be served from the root,
//! from a sub-directory, or from a static host with a hash route in the
//! address (`#Class01/A`), and the browser resolves relative URLs against
//! whatever it shows. [`base_path`] computes the prefix that brings a
//! relative reference back to the site root for a given [`PageLocation`].

use bridge_traits::location::{NavigationHistory, PageLocation};
use core_runtime::config::{AppConfig, BasePathRules};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("audio path is empty")]
    Empty,
}

fn has_hash_route(location: &PageLocation) -> bool {
    location.hash.contains('/')
}

/// Prefix that maps a root-relative reference onto the deployed site.
pub fn base_path(location: &PageLocation, rules: &BasePathRules) -> String {
    let hash_route = has_hash_route(location);

    if let Some(rule) = rules
        .hosting
        .iter()
        .find(|rule| location.origin.contains(&rule.origin_contains))
    {
        return if hash_route && location.pathname.contains(&rule.path_contains) {
            "../../".to_string()
        } else {
            "./".to_string()
        };
    }

    if location.pathname == "/" || location.pathname == "/index.html" {
        return if hash_route { "../../" } else { "./" }.to_string();
    }

    let segments = location
        .pathname
        .split('/')
        .filter(|segment| !segment.is_empty())
        .count();
    let mut back = segments.saturating_sub(1);
    if hash_route {
        back += 2;
    }

    if back == 0 {
        "./".to_string()
    } else {
        "../".repeat(back)
    }
}

/// Resolve `reference` to a fetchable URL.
///
/// Absolute URLs and `/`-rooted paths are returned unchanged. References
/// under `media_root` are prefixed with the base path; anything else is
/// assumed to be relative to `media_root`.
pub fn resolve_audio_path(
    reference: &str,
    location: &PageLocation,
    rules: &BasePathRules,
    media_root: &str,
) -> Result<String, PathError> {
    if reference.is_empty() {
        return Err(PathError::Empty);
    }

    if reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with('/')
    {
        return Ok(reference.to_string());
    }

    let base = base_path(location, rules);
    let media_prefix = format!("{}/", media_root.trim_end_matches('/'));

    if reference.starts_with(&media_prefix) {
        return Ok(format!("{}{}", base, reference));
    }
    if let Some(stripped) = reference.strip_prefix("./") {
        if stripped.starts_with(&media_prefix) {
            return Ok(format!("{}{}", base, stripped));
        }
    }

    Ok(format!("{}{}{}", base, media_prefix, reference))
}

/// Resolver bound to the deployment rules and the live page location.
pub struct PathResolver {
    rules: BasePathRules,
    media_root: String,
    history: Option<Arc<dyn NavigationHistory>>,
}

impl PathResolver {
    pub fn new(rules: BasePathRules, media_root: impl Into<String>) -> Self {
        Self {
            rules,
            media_root: media_root.into(),
            history: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            rules: config.base_path_rules.clone(),
            media_root: config.media_root.clone(),
            history: config.history.clone(),
        }
    }

    /// Read the page location from `history` on every resolve.
    pub fn with_history(mut self, history: Arc<dyn NavigationHistory>) -> Self {
        self.history = Some(history);
        self
    }

    /// Current page location, or the local site root without a host history.
    pub fn location(&self) -> PageLocation {
        self.history
            .as_ref()
            .map(|history| history.location())
            .unwrap_or_else(PageLocation::local)
    }

    pub fn resolve(&self, reference: &str) -> Result<String, PathError> {
        self.resolve_at(reference, &self.location())
    }

    pub fn resolve_at(&self, reference: &str, location: &PageLocation) -> Result<String, PathError> {
        resolve_audio_path(reference, location, &self.rules, &self.media_root)
    }
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("rules", &self.rules)
            .field("media_root", &self.media_root)
            .field("has_history", &self.history.is_some())
            .finish()
    }
}
