use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Permission tag.
///
/// Permissions are modeled as opaque strings (e.g. "lesson_plan.generate").
/// Roles held by a user live in the same namespace, so a requirement is met
/// by holding any tag with the same spelling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Set of permission tags attached to a route or UI element.
///
/// An empty requirement marks an open route. Declared statically; a missing
/// field in route/menu configuration deserializes to the empty (open) set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionRequirement(BTreeSet<Permission>);

impl PermissionRequirement {
    /// The open requirement: satisfied by everyone.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn any_of<I, P>(permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self(permissions.into_iter().map(Into::into).collect())
    }

    pub fn is_open(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }
}

impl<P: Into<Permission>> FromIterator<P> for PermissionRequirement {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::any_of(iter)
    }
}
