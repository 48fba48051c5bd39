use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Course id and part are required")]
    MissingSelection,

    #[error("Unknown course: {0}")]
    UnknownCourse(String),

    #[error("Invalid part: {0}")]
    InvalidPart(String),

    #[error("Course {course_id} has no Part {part}")]
    EmptyPart { course_id: String, part: String },
}

pub type Result<T> = std::result::Result<T, NavigationError>;
