//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the lesson crates:
//! - Configuration ([`config::AppConfig`]) with fail-fast validation
//! - Event bus ([`events::EventBus`]) and synchronous listener registry
//!   ([`events::StateListeners`])
//! - Logging and tracing setup ([`logging`])

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
