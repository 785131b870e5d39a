#![forbid(unsafe_code)]

pub mod api;
pub mod bridge;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod invoke;
pub mod model;
pub mod session;
pub mod telemetry;

pub use error::{CommandError, Result};

// Re-export the main entry points at the crate root for convenience
pub use api::Api;
pub use bridge::{CommandBridge, CommandRequest, SocketBridge};
pub use filter::FilterSpec;
pub use invoke::Invoker;
pub use session::{CurrentUser, RefreshGate, SessionExpiredHook};
