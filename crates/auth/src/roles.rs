use std::borrow::{Borrow, Cow};
use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Role tag held by a user.
///
/// Roles are intentionally opaque strings at this layer and share the
/// namespace of [`crate::Permission`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The set of tags held by the current user.
///
/// Deserialization never fails: a single string becomes a one-element set,
/// an array keeps its string members, and anything else is the empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// True iff at least one of `tags` is held.
    pub fn intersects<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter().any(|t| self.contains(t))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }
}

impl<R: Into<Role>> FromIterator<R> for RoleSet {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(RoleSet::from_json_lenient(&raw))
    }
}

impl RoleSet {
    /// Interpret an arbitrary JSON value as a role set (deny-by-default).
    pub fn from_json_lenient(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => {
                std::iter::once(s.trim().to_string()).collect()
            }
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => RoleSet::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_shapes() {
        let one: RoleSet = serde_json::from_str(r#""teacher""#).unwrap();
        assert!(one.contains("teacher"));
        assert_eq!(one.len(), 1);

        let many: RoleSet = serde_json::from_str(r#"["admin", 3, "teacher", ""]"#).unwrap();
        assert_eq!(many.len(), 2);
        assert!(many.contains("admin"));

        let junk: RoleSet = serde_json::from_str(r#"{"admin": true}"#).unwrap();
        assert!(junk.is_empty());

        let null: RoleSet = serde_json::from_str("null").unwrap();
        assert!(null.is_empty());
    }

    #[test]
    fn intersects_any() {
        let held: RoleSet = ["manager"].into_iter().collect();
        assert!(held.intersects(["admin", "manager"]));
        assert!(!held.intersects(["admin"]));
        assert!(!held.intersects(std::iter::empty::<&str>()));
    }

    #[test]
    fn lookup_matches_owned_and_static_tags() {
        let held: RoleSet = vec![String::from("teacher"), String::from("parent")]
            .into_iter()
            .chain(std::iter::once(String::from("admin")))
            .collect();
        assert!(held.contains("admin"));
        assert!(held.contains(&String::from("parent")));
        assert!(!held.contains("Admin"));
        assert!(!held.contains(""));
    }
}
