//! Strength checks for configured secrets.
//!
//! Both web binaries refuse to start with a short, placeholder-looking or
//! low-entropy session secret.

use std::collections::HashMap;

use thiserror::Error;

pub const MIN_SESSION_SECRET_LENGTH: usize = 32;
pub const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a value copied from an example file.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SecretError {
    #[error("must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },
    #[error("appears to be a placeholder (contains '{0}')")]
    Placeholder(&'static str),
    #[error("entropy too low ({0:.2} bits/char, need >= 3.3); use a randomly generated value")]
    LowEntropy(f64),
}

/// Shannon entropy in bits per character.
#[must_use]
pub fn shannon_entropy(s: &str) -> f64 {
    let mut freq: HashMap<char, usize> = HashMap::new();
    let mut len = 0usize;
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
        len += 1;
    }
    if len == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = len as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholders and low-entropy values.
///
/// # Errors
///
/// Returns the first check the value fails.
pub fn check_strength(value: &str) -> Result<(), SecretError> {
    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(SecretError::Placeholder(pattern));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(SecretError::LowEntropy(entropy));
    }
    Ok(())
}

/// Length and strength checks for a session secret.
///
/// # Errors
///
/// Returns the first check the value fails.
pub fn check_session_secret(value: &str) -> Result<(), SecretError> {
    let actual = value.chars().count();
    if actual < MIN_SESSION_SECRET_LENGTH {
        return Err(SecretError::TooShort {
            min: MIN_SESSION_SECRET_LENGTH,
            actual,
        });
    }
    check_strength(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaaaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_placeholders_rejected() {
        assert_eq!(
            check_strength("your-session-key-goes-here"),
            Err(SecretError::Placeholder("your-"))
        );
        assert!(matches!(
            check_strength("CHANGEME-9f8e7d6c"),
            Err(SecretError::Placeholder("changeme"))
        ));
    }

    #[test]
    fn test_low_entropy_rejected() {
        assert!(matches!(
            check_session_secret(&"ab".repeat(20)),
            Err(SecretError::LowEntropy(_))
        ));
    }

    #[test]
    fn test_session_secret_length() {
        assert!(matches!(
            check_session_secret("aB3$xY9!"),
            Err(SecretError::TooShort { min: 32, actual: 8 })
        ));
        assert!(check_session_secret("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%").is_ok());
    }
}
