use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParticipantError {
    #[error("Please enter your email")]
    Empty,

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Email address identifying the quiz taker.
///
/// Accepts `local@domain.tld` shapes: no whitespace, exactly one `@`, and a
/// dot inside the domain with text on both sides.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ParticipantEmail(String);

impl ParticipantEmail {
    /// Validate and normalize a raw email string.
    ///
    /// # Errors
    ///
    /// Returns `ParticipantError::Empty` for blank input and
    /// `ParticipantError::InvalidEmail` when the shape does not match.
    pub fn parse(raw: &str) -> Result<Self, ParticipantError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParticipantError::Empty);
        }
        if !is_valid_email(trimmed) {
            return Err(ParticipantError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ParticipantEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantEmail({})", self.0)
    }
}

impl fmt::Display for ParticipantEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // some dot must have at least one character on each side
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
