//! Visitor registration details

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 100;
const MIN_MOBILE_LENGTH: usize = 10;
const MAX_MOBILE_LENGTH: usize = 15;

/// Details collected on the registration step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    /// Contact for the secondary verification channel
    #[serde(rename = "mobile")]
    pub secondary_contact: String,
}

impl Registration {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        secondary_contact: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            secondary_contact: secondary_contact.into(),
        }
    }

    /// Check field formats. Lengths are counted in characters after trimming.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name_len = self.full_name.trim().chars().count();
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&name_len) {
            return Err(ValidationError::InvalidName);
        }

        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }

        let mobile_len = self.secondary_contact.trim().chars().count();
        if !(MIN_MOBILE_LENGTH..=MAX_MOBILE_LENGTH).contains(&mobile_len) {
            return Err(ValidationError::InvalidMobile);
        }

        Ok(())
    }

    /// First word of the full name, used to address the visitor
    pub fn first_name(&self) -> &str {
        first_name(&self.full_name)
    }
}

/// First whitespace-separated word of a name, or "there" when empty
pub fn first_name(full_name: &str) -> &str {
    full_name.split_whitespace().next().unwrap_or("there")
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
