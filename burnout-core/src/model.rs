//! Identifiers and verification channels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Opaque session identifier assigned by the registration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Out-of-band channel a one-time code is delivered to.
///
/// Email is always verified first; the secondary channel is the visitor's
/// mobile number and is named `mobile` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "mobile", alias = "secondary")]
    Secondary,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Secondary => "mobile",
        }
    }

    /// The channel verified after this one, if any
    pub fn next(&self) -> Option<Channel> {
        match self {
            Channel::Email => Some(Channel::Secondary),
            Channel::Secondary => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "mobile" | "secondary" => Ok(Channel::Secondary),
            other => Err(ValidationError::InvalidChannel(other.to_string())),
        }
    }
}
