//! Sidebar/menu visibility.
//!
//! Pure filtering of a static menu tree against the current role set,
//! recomputed on every render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scholar_auth::{PermissionRequirement, RoleSet, Session, evaluate};

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("invalid menu definition: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    #[serde(default)]
    pub required_permissions: PermissionRequirement,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    pub fn link(label: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            route: Some(route.into()),
            required_permissions: PermissionRequirement::open(),
            children: Vec::new(),
        }
    }

    pub fn group(label: impl Into<String>, children: Vec<MenuEntry>) -> Self {
        Self {
            label: label.into(),
            route: None,
            required_permissions: PermissionRequirement::open(),
            children,
        }
    }

    pub fn requires(mut self, permissions: PermissionRequirement) -> Self {
        self.required_permissions = permissions;
        self
    }
}

/// Filter `entries` down to what `roles` may see, keeping order.
///
/// - A leaf is shown iff its own requirement is met.
/// - An entry with children is shown iff at least one child is shown; it
///   then carries only the shown children. With no shown children it falls
///   back to the leaf rule, but only if it has a route of its own.
pub fn visible_menu(entries: &[MenuEntry], roles: &RoleSet) -> Vec<MenuEntry> {
    entries
        .iter()
        .filter_map(|entry| visible_entry(entry, roles))
        .collect()
}

fn visible_entry(entry: &MenuEntry, roles: &RoleSet) -> Option<MenuEntry> {
    if entry.children.is_empty() {
        return evaluate(&entry.required_permissions, roles).then(|| entry.clone());
    }

    let children = visible_menu(&entry.children, roles);
    if !children.is_empty() {
        return Some(MenuEntry {
            children,
            ..shallow(entry)
        });
    }

    (entry.route.is_some() && evaluate(&entry.required_permissions, roles)).then(|| shallow(entry))
}

fn shallow(entry: &MenuEntry) -> MenuEntry {
    MenuEntry {
        label: entry.label.clone(),
        route: entry.route.clone(),
        required_permissions: entry.required_permissions.clone(),
        children: Vec::new(),
    }
}

fn live_roles(session: Option<&Session>, now: DateTime<Utc>) -> RoleSet {
    session
        .and_then(|s| s.roles_at(now))
        .cloned()
        .unwrap_or_default()
}

/// Whether a single UI element guarded by `required` should render.
pub fn element_visible(
    required: &PermissionRequirement,
    session: Option<&Session>,
    now: DateTime<Utc>,
) -> bool {
    evaluate(required, &live_roles(session, now))
}

/// A static menu definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(raw: &str) -> Result<Self, MenuError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Entries visible to `session` at `now`.
    ///
    /// No session, or one that is no longer logged in, sees only open entries.
    pub fn visible_for(&self, session: Option<&Session>, now: DateTime<Utc>) -> Vec<MenuEntry> {
        visible_menu(&self.entries, &live_roles(session, now))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use scholar_auth::UserProfile;

    use super::*;

    fn req(tags: &[&'static str]) -> PermissionRequirement {
        tags.iter().copied().collect()
    }

    fn roles(tags: &[&'static str]) -> RoleSet {
        tags.iter().copied().collect()
    }

    fn labels(entries: &[MenuEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn parent_shown_through_visible_child() {
        let menu = vec![
            MenuEntry::group(
                "Management",
                vec![
                    MenuEntry::link("Schools", "/admin/schools").requires(req(&["admin"])),
                    MenuEntry::link("My classes", "/classes").requires(req(&["standard"])),
                ],
            )
            .requires(req(&["admin"])),
        ];

        let visible = visible_menu(&menu, &roles(&["standard"]));
        assert_eq!(labels(&visible), vec!["Management"]);
        assert_eq!(labels(&visible[0].children), vec!["My classes"]);
    }

    #[test]
    fn childless_group_without_route_is_dropped() {
        let menu = vec![
            MenuEntry::link("Dashboard", "/dashboard"),
            MenuEntry::group(
                "Admin",
                vec![MenuEntry::link("Users", "/admin/users").requires(req(&["admin"]))],
            ),
        ];

        let visible = visible_menu(&menu, &roles(&["teacher"]));
        assert_eq!(labels(&visible), vec!["Dashboard"]);
    }

    #[test]
    fn parent_with_own_route_falls_back_to_own_requirement() {
        let parent = MenuEntry {
            children: vec![MenuEntry::link("Audit", "/reports/audit").requires(req(&["admin"]))],
            ..MenuEntry::link("Reports", "/reports").requires(req(&["teacher"]))
        };

        let visible = visible_menu(std::slice::from_ref(&parent), &roles(&["teacher"]));
        assert_eq!(labels(&visible), vec!["Reports"]);
        assert!(visible[0].children.is_empty());

        assert!(visible_menu(std::slice::from_ref(&parent), &roles(&["student"])).is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let menu = vec![
            MenuEntry::link("A", "/a"),
            MenuEntry::link("B", "/b").requires(req(&["admin"])),
            MenuEntry::link("C", "/c").requires(req(&["teacher", "admin"])),
            MenuEntry::link("D", "/d"),
        ];
        let visible = visible_menu(&menu, &roles(&["teacher"]));
        assert_eq!(labels(&visible), vec!["A", "C", "D"]);
    }

    #[test]
    fn nested_groups_filter_recursively() {
        let menu = vec![MenuEntry::group(
            "Content",
            vec![MenuEntry::group(
                "Question bank",
                vec![
                    MenuEntry::link("Generate", "/qb/generate").requires(req(&["teacher"])),
                    MenuEntry::link("Review", "/qb/review").requires(req(&["admin"])),
                ],
            )],
        )];

        let visible = visible_menu(&menu, &roles(&["teacher"]));
        assert_eq!(labels(&visible[0].children[0].children), vec!["Generate"]);
        assert!(visible_menu(&menu, &roles(&[])).is_empty());
    }

    #[test]
    fn menu_from_json_and_session() {
        let menu = Menu::from_json(
            r#"[
                {"label": "Dashboard", "route": "/dashboard"},
                {"label": "Admin", "required_permissions": ["admin"], "children": [
                    {"label": "Schools", "route": "/admin/schools", "required_permissions": ["admin"]}
                ]}
            ]"#,
        )
        .unwrap();

        let now = Utc::now();
        assert_eq!(labels(&menu.visible_for(None, now)), vec!["Dashboard"]);

        let admin = Session::new("tok", UserProfile::new("Root", roles(&["admin"])));
        assert_eq!(labels(&menu.visible_for(Some(&admin), now)), vec!["Dashboard", "Admin"]);
    }

    #[test]
    fn dead_sessions_see_only_open_entries() {
        let menu = Menu::new(vec![
            MenuEntry::link("Dashboard", "/dashboard"),
            MenuEntry::link("Schools", "/admin/schools").requires(req(&["admin"])),
        ]);
        let now = Utc::now();
        let admin = UserProfile::new("Root", roles(&["admin"]));

        let expired = Session::new("tok", admin.clone()).with_expiry(now - Duration::minutes(5));
        assert_eq!(labels(&menu.visible_for(Some(&expired), now)), vec!["Dashboard"]);
        assert!(!element_visible(&req(&["admin"]), Some(&expired), now));

        let blank = Session::new("", admin);
        assert_eq!(labels(&menu.visible_for(Some(&blank), now)), vec!["Dashboard"]);
        assert!(!element_visible(&req(&["admin"]), Some(&blank), now));
    }

    #[test]
    fn invalid_menu_is_an_error() {
        assert!(matches!(Menu::from_json("[{\"route\": 3}]"), Err(MenuError::Parse(_))));
    }

    #[test]
    fn element_visibility_without_session() {
        let now = Utc::now();
        assert!(element_visible(&PermissionRequirement::open(), None, now));
        assert!(!element_visible(&req(&["admin"]), None, now));
    }
}
