use crate::utils::hash::hash_parts;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of hexadecimal characters in an identifier (96 bits).
pub const OBJECT_ID_LEN: usize = 24;

/// Stable identity of a group or file reference in a manifest.
///
/// Identifiers are derived from the object's kind, its parent and its name,
/// so two runs over the same input produce the same identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

/// What an identifier names; part of the hashed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Group,
    File,
}

impl ObjectKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::File => "file",
        }
    }
}

impl ObjectId {
    /// Derive an identifier; `salt` is bumped by the caller on collision
    #[must_use]
    pub fn derive(kind: ObjectKind, parent: Option<&Self>, name: &str, salt: u32) -> Self {
        let parent = parent.map_or("", |p| p.as_str());
        let salt = salt.to_string();
        let digest = hash_parts(&[kind.as_str(), parent, name, &salt]);
        Self(format!("{:024X}", digest >> 32))
    }

    /// Parse an identifier, accepting lower-case input
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if `value` is not 24 hex digits.
    pub fn parse(value: &str) -> Result<Self, String> {
        if value.len() != OBJECT_ID_LEN || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "invalid object id '{value}' (expected {OBJECT_ID_LEN} hexadecimal characters)"
            ));
        }
        Ok(Self(value.to_ascii_uppercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic_and_well_formed() {
        let a = ObjectId::derive(ObjectKind::Group, None, "engine", 0);
        let b = ObjectId::derive(ObjectKind::Group, None, "engine", 0);

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), OBJECT_ID_LEN);
        assert!(a.as_str().chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_derive_inputs_matter() {
        let parent = ObjectId::derive(ObjectKind::Group, None, "App", 0);
        let group = ObjectId::derive(ObjectKind::Group, Some(&parent), "net", 0);

        assert_ne!(group, ObjectId::derive(ObjectKind::File, Some(&parent), "net", 0));
        assert_ne!(group, ObjectId::derive(ObjectKind::Group, None, "net", 0));
        assert_ne!(group, ObjectId::derive(ObjectKind::Group, Some(&parent), "net", 1));
    }

    #[test]
    fn test_parse() {
        let id = ObjectId::parse("0123456789abcdef01234567").unwrap();
        assert_eq!(id.as_str(), "0123456789ABCDEF01234567");

        assert!(ObjectId::parse("0123").is_err());
        assert!(ObjectId::parse("0123456789ABCDEF0123456G").is_err());
    }
}
