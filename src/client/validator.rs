//! Pre-flight validation of user input.
//!
//! Nothing here touches the transport. Input cleanup (see
//! [`normalize_join_code`]) happens where input is collected; the validators
//! only enforce the final shape.

use std::fmt;

/// Length of a lobby code.
pub const JOIN_CODE_LEN: usize = 4;

/// Input rejected before any command is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InvalidJoinCode,
    EmptyName,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJoinCode => write!(f, "Please enter a valid 4-letter code"),
            Self::EmptyName => write!(f, "Please enter your name"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check that a join code is exactly four uppercase ASCII letters.
pub fn validate_join_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == JOIN_CODE_LEN && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidJoinCode)
    }
}

/// Check that a player name is non-empty after trimming.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(())
    }
}

/// Clean raw code input: keep ASCII letters, uppercase, cap at four.
pub fn normalize_join_code(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .take(JOIN_CODE_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_join_codes() {
        for code in ["ABCD", "ZZZZ", "QWER"] {
            assert_eq!(validate_join_code(code), Ok(()));
        }
    }

    #[test]
    fn test_invalid_join_codes() {
        for code in ["", "ABC", "ABCDE", "abcd", "AbCD", "AB1D", "AB D", "ÄBCD", "ABÇ"] {
            assert_eq!(
                validate_join_code(code),
                Err(ValidationError::InvalidJoinCode),
                "{:?} should be rejected",
                code
            );
        }
    }

    #[test]
    fn test_exhaustive_letter_codes() {
        for a in b'A'..=b'Z' {
            let code: String = [a, b'Z', a, b'A'].iter().map(|&b| b as char).collect();
            assert!(validate_join_code(&code).is_ok());
        }
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Alice"), Ok(()));
        assert_eq!(validate_name("  Bob "), Ok(()));
        assert_eq!(validate_name(""), Err(ValidationError::EmptyName));
        assert_eq!(validate_name(" \t\n"), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_normalize_join_code() {
        assert_eq!(normalize_join_code("ab-cd"), "ABCD");
        assert_eq!(normalize_join_code("a1b2c3d4e5"), "ABCD");
        assert_eq!(normalize_join_code("xy"), "XY");
        assert_eq!(normalize_join_code("ñandú"), "AND");
        assert_eq!(normalize_join_code(""), "");
    }

    #[test]
    fn test_normalized_codes_validate() {
        assert!(validate_join_code(&normalize_join_code("wx yz!")).is_ok());
        assert!(validate_join_code(&normalize_join_code("wx1")).is_err());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::InvalidJoinCode.to_string(),
            "Please enter a valid 4-letter code"
        );
        assert_eq!(ValidationError::EmptyName.to_string(), "Please enter your name");
    }
}
