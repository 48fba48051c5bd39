//! # Lesson Content
//!
//! Lesson data model and the store that loads it.
//!
//! ## Overview
//!
//! Each course lives at `<data_root>/<courseId>/courses.json`:
//!
//! ```json
//! {
//!   "id": "Class01",
//!   "name": "第一课",
//!   "partA": [
//!     { "paragraph": 1, "originalText": "...", "jyutping": "...",
//!       "audioFile": "Sound/Class01/a_1.opus" }
//!   ],
//!   "partB": []
//! }
//! ```
//!
//! [`ContentStore`] discovers the configured course ids, fetches and
//! validates each file field by field, and drops (with a warning) anything
//! malformed. Helpers compute statistics, per-course status badges and
//! integrity issues for the course list.

pub mod error;
pub mod models;
pub mod naming;
pub mod stats;
pub mod store;
pub mod validation;

pub use error::{ContentError, Result};
pub use models::{audio_id, Course, Paragraph, Part};
pub use naming::{audio_path_for, course_display_name};
pub use stats::{course_status, CourseStatistics, CourseStatus, IntegrityIssue};
pub use store::ContentStore;
pub use validation::{validate_audio_path, validate_course};
