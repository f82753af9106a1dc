//! Generate passwords and secrets from a compact pattern language.
//!
//! A pattern is interpreted in a single pass that both validates it and
//! draws one random sample, together with the Shannon entropy (in bits) of
//! the choices that produced the sample. See [`pattern`] for the syntax.
//!
//! # Example
//!
//! ```rust
//! let out = passgen::generate("[a-z]{8}-\\d{4}").unwrap();
//!
//! assert_eq!(out.text.len(), 13);
//! assert!((out.entropy - (8.0 * 26f64.log2() + 4.0 * 10f64.log2())).abs() < 1e-9);
//! ```
//!
//! Errors carry the position of the offending construct:
//!
//! ```rust
//! let pattern = "(abc) \\2";
//! let err = passgen::generate(pattern).unwrap_err();
//!
//! assert_eq!(err.to_string(), "value error near index 6: invalid group id '2'");
//! ```

pub mod error;
pub mod logging;
pub mod pattern;
pub mod random;
pub mod split;
pub mod transform;

pub use error::{ErrorKind, PatternError};
pub use pattern::{Generated, MAX_PATTERN_LEN, MAX_REPEAT, generate_with};

/// Interpret `pattern` using the operating system's random source.
pub fn generate(pattern: &str) -> Result<Generated, PatternError> {
    generate_with(pattern, &mut random::secure_rng())
}
