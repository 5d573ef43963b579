// Library module for richiesta-cleanup
// Re-exports modules for use in integration tests and the command-line binary

pub mod cleanup;
pub mod error;
pub mod schedule;
pub mod settings;
pub mod store;

pub use error::{CleanupError, Result};
