//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod accounts;
pub mod analytics;
pub mod audit;
pub mod import;
pub mod simulation;
pub mod transactions;
pub mod users;

// Re-export all handlers for use in router
pub use accounts::*;
pub use analytics::*;
pub use audit::*;
pub use import::*;
pub use simulation::*;
pub use transactions::*;
pub use users::*;
