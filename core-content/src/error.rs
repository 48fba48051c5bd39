use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to fetch course {course_id}: {source}")]
    Fetch {
        course_id: String,
        #[source]
        source: BridgeError,
    },

    #[error("Invalid course data for {course_id}: {field} - {message}")]
    Invalid {
        course_id: String,
        field: String,
        message: String,
    },

    #[error("Course not found: {0}")]
    NotFound(String),

    #[error("Invalid part: {0}")]
    InvalidPart(String),
}

impl ContentError {
    pub(crate) fn invalid(
        course_id: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ContentError::Invalid {
            course_id: course_id.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;
