//! Small helpers shared by the `tendermint-lite` crates.

#![doc = include_str!("../README.md")]
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

#[cfg(test)]
use serde_json as _;

pub mod serde;

/// Ensure that a condition is true, otherwise return an error.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, PartialEq, Eq)]
    enum CheckError {
        TooLow(u64),
    }

    fn at_least_ten(value: u64) -> Result<u64, CheckError> {
        ensure!(value >= 10, CheckError::TooLow(value));
        Ok(value)
    }

    #[test]
    fn ensure_returns_the_error_when_the_condition_fails() {
        assert_eq!(at_least_ten(3), Err(CheckError::TooLow(3)));
        assert_eq!(at_least_ten(10), Ok(10));
    }
}
