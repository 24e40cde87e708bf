//! rigdash - Live dashboard for mining testbench telemetry.
//!
//! This library exposes the core components for testing.

pub mod app;
pub mod cli;
pub mod control;
pub mod demo;
pub mod graphs;
pub mod layout;
pub mod message;
pub mod mock;
pub mod navigate;
pub mod subscription;
pub mod view;

// Re-export commonly used types
pub use app::{FeedMode, Rigdash};
pub use control::{ControlChannel, ControlError, ControlHandle};
pub use layout::{Dashboard, Panel};
pub use message::Message;
