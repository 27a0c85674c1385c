//! Shared types for the Beatport token tooling
//!
//! Holds the pieces both the auth library and the CLI need without pulling
//! in HTTP: a redacting `Secret` wrapper for credentials and tokens, and the
//! configuration-level error type.

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
