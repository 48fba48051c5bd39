//! # Navigation
//!
//! Which course and part the learner is looking at, and how that choice is
//! kept in step with the address bar.
//!
//! - [`SelectionState`]: validating mutator, history ring buffer and
//!   listener fan-out
//! - [`Route`]: the `#<courseId>/<part>` fragment grammar
//! - [`Router`]: pushes committed selections as routes and replays
//!   location changes without pushing again

pub mod error;
pub mod route;
pub mod router;
pub mod selection;

pub use error::{NavigationError, Result};
pub use route::Route;
pub use router::Router;
pub use selection::{HistoryEntry, Selection, SelectionChange, SelectionState};
