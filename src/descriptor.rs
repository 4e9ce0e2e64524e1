//! Connection descriptors: a single string of `key=value` pairs naming the
//! region, credentials and target resources, e.g.
//! `region=us-east-1;credentials=default;group=app-logs`.
//!
//! Pairs may be separated by `;` or whitespace.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub const REGION: &str = "region";
pub const CREDENTIALS: &str = "credentials";
pub const GROUP: &str = "group";
pub const STREAM: &str = "stream";
pub const QUEUE: &str = "queue";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    fields: BTreeMap<String, String>,
}

impl Descriptor {
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let mut fields = BTreeMap::new();

        for segment in input
            .split(|c: char| c == ';' || c.is_ascii_whitespace())
            .filter(|s| !s.is_empty())
        {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| ConfigError::Malformed(segment.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Malformed(segment.to_string()));
            }
            if fields
                .insert(key.to_string(), value.trim().to_string())
                .is_some()
            {
                return Err(ConfigError::DuplicateKey(key.to_string()));
            }
        }

        Ok(Self { fields })
    }

    /// Parses `input` and checks that every key in `required` has a value.
    pub fn parse_with_keys(input: &str, required: &[&str]) -> Result<Self, ConfigError> {
        let descriptor = Self::parse(input)?;
        descriptor.ensure_keys(required)?;
        Ok(descriptor)
    }

    pub fn ensure_keys(&self, required: &[&str]) -> Result<(), ConfigError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|key| self.get(key).is_none())
            .map(|key| key.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingKeys(missing))
        }
    }

    /// Value for `key`; empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingKeys(vec![key.to_string()]))
    }

    pub fn region(&self) -> Result<&str, ConfigError> {
        self.require(REGION)
    }

    pub fn credentials(&self) -> Result<&str, ConfigError> {
        self.require(CREDENTIALS)
    }
}

impl FromStr for Descriptor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Descriptor::parse(s)
    }
}

impl fmt::Display for Descriptor {
    // Credentials are redacted so descriptors can be logged.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.fields {
            if !first {
                write!(f, ";")?;
            }
            first = false;
            if key == CREDENTIALS && value.starts_with("static:") {
                write!(f, "{}=static:***", key)?;
            } else {
                write!(f, "{}={}", key, value)?;
            }
        }
        Ok(())
    }
}
