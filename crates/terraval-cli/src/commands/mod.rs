//! Command implementations
//!
//! Each command returns the JSON value to print, or a [`Failure`] that
//! carries its exit code.

pub mod agent;
pub mod run;
pub mod score;

use serde::Serialize;

use crate::exit_codes;

/// A failure that ends the command
#[derive(Debug)]
pub struct Failure {
    pub code: i32,
    pub error: anyhow::Error,
}

impl Failure {
    /// Bad input, arguments or settings
    pub fn input(error: impl Into<anyhow::Error>) -> Self {
        Self {
            code: exit_codes::INVALID_INPUT,
            error: error.into(),
        }
    }

    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self {
            code: exit_codes::INTERNAL,
            error: error.into(),
        }
    }
}

pub type Outcome = Result<serde_json::Value, Failure>;

/// Serialize a command's output
pub fn to_json<T: Serialize>(value: &T) -> Outcome {
    serde_json::to_value(value).map_err(Failure::internal)
}
