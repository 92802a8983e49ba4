//! Verification helpers for rendered payloads
//!
//! Provides assertion helpers over command lines and document lines

use netauto_render::Payload;
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Expected line '{expected}' not found in {actual:?}")]
    LineNotFound { expected: String, actual: Vec<String> },

    #[error("Line '{line}' should not be present")]
    UnexpectedLine { line: String },

    #[error("Expected {expected} lines, found {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Expected '{first}' before '{second}'")]
    OrderMismatch { first: String, second: String },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Command and document line verifier
///
/// Command payloads are checked line by line. Document payloads are checked
/// against their serialized lines with indentation stripped.
pub struct CommandVerifier {
    lines: Vec<String>,
}

impl CommandVerifier {
    /// Create a verifier over captured command lines
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Create a verifier over a payload
    pub fn from_payload(payload: &Payload) -> Self {
        let lines = match payload {
            Payload::Commands(lines) => lines.clone(),
            Payload::Document(doc) => doc
                .to_xml()
                .lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        };
        Self { lines }
    }

    fn position(&self, expected: &str) -> VerifyResult<usize> {
        self.lines
            .iter()
            .position(|line| line == expected)
            .ok_or_else(|| VerificationError::LineNotFound {
                expected: expected.to_string(),
                actual: self.lines.clone(),
            })
    }

    /// Verify that a line is present exactly
    pub fn assert_command_executed(&self, expected: &str) -> VerifyResult<()> {
        self.position(expected).map(|_| ())
    }

    /// Verify that some line contains `fragment`
    pub fn assert_command_contains(&self, fragment: &str) -> VerifyResult<()> {
        if self.lines.iter().any(|line| line.contains(fragment)) {
            Ok(())
        } else {
            Err(VerificationError::LineNotFound {
                expected: fragment.to_string(),
                actual: self.lines.clone(),
            })
        }
    }

    /// Verify that no line contains `fragment`
    pub fn assert_command_not_executed(&self, fragment: &str) -> VerifyResult<()> {
        match self.lines.iter().find(|line| line.contains(fragment)) {
            Some(line) => Err(VerificationError::UnexpectedLine { line: line.clone() }),
            None => Ok(()),
        }
    }

    /// Verify the number of lines
    pub fn assert_command_count(&self, expected: usize) -> VerifyResult<()> {
        let actual = self.lines.len();
        if actual != expected {
            Err(VerificationError::CountMismatch { expected, actual })
        } else {
            Ok(())
        }
    }

    /// Verify that each line appears, in the given relative order
    pub fn assert_order(&self, expected: &[&str]) -> VerifyResult<()> {
        let mut last: Option<(usize, &str)> = None;
        for &line in expected {
            let pos = self.position(line)?;
            if let Some((prev, prev_line)) = last {
                if pos <= prev {
                    return Err(VerificationError::OrderMismatch {
                        first: prev_line.to_string(),
                        second: line.to_string(),
                    });
                }
            }
            last = Some((pos, line));
        }
        Ok(())
    }

    /// Get all captured lines
    pub fn captured_commands(&self) -> &[String] {
        &self.lines
    }
}
