use serde::{Deserialize, Serialize};

use crate::RoleSet;

/// Snapshot of the signed-in user as persisted by the client.
///
/// Replaced wholesale on login and on profile update; never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, alias = "role", alias = "roles")]
    pub role_set: RoleSet,

    #[serde(default)]
    pub is_profile_completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,

    #[serde(default)]
    pub name: String,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, role_set: RoleSet) -> Self {
        Self {
            role_set,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn completed(mut self) -> Self {
        self.is_profile_completed = true;
        self
    }

    pub fn with_profile_image(mut self, url: impl Into<String>) -> Self {
        self.profile_image = Some(url.into());
        self
    }
}
