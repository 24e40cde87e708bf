//! View components for the rigdash application.

pub mod dashboard;
pub mod formatting;
pub mod panel;
pub mod surface;
pub mod theme;
