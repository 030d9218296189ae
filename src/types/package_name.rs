// ABOUTME: Validated application package name.
// ABOUTME: Enforces dot-separated segments that each start with a letter.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackageNameError {
    #[error("package name cannot be empty")]
    Empty,

    #[error("package name must have at least two segments: {0}")]
    SingleSegment(String),

    #[error("package name contains an empty segment: {0}")]
    EmptySegment(String),

    #[error("package segment must start with a letter: '{0}'")]
    SegmentStart(String),

    #[error("invalid character in package name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(value: &str) -> Result<Self, PackageNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(PackageNameError::Empty);
        }

        if !value.contains('.') {
            return Err(PackageNameError::SingleSegment(value.to_string()));
        }

        for segment in value.split('.') {
            let Some(first) = segment.chars().next() else {
                return Err(PackageNameError::EmptySegment(value.to_string()));
            };
            if !first.is_ascii_alphabetic() {
                return Err(PackageNameError::SegmentStart(segment.to_string()));
            }
            if let Some(c) = segment
                .chars()
                .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
            {
                return Err(PackageNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PackageName {
    type Err = PackageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for PackageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PackageName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}
