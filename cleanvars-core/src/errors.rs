// cleanvars-core/src/errors.rs
//! Custom error types for the cleanvars-core library.
//!
//! The scrubbing pipeline never fails on user input, however malformed.
//! The variants below describe conditions that are impossible on a
//! well-formed node chain and therefore indicate a bug in a pass, not a
//! problem with the text being scrubbed.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `cleanvars-core`
/// library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrubError {
    /// A pass observed a node chain state the design rules out, such as a
    /// value scan landing on an already identified secret. Asserted in
    /// development builds; the public entry points swallow it and return
    /// the input unchanged.
    #[error("node chain invariant violated: {0}")]
    InvariantViolation(String),
}
