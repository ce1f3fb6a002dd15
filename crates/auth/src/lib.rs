//! `scholar-auth`: pure authorization vocabulary for the scholar client.
//!
//! This crate is intentionally decoupled from HTTP, storage and navigation.

pub mod evaluate;
pub mod permissions;
pub mod profile;
pub mod roles;
pub mod session;

pub use evaluate::{EvaluationExplanation, evaluate, explain_evaluation};
pub use permissions::{Permission, PermissionRequirement};
pub use profile::UserProfile;
pub use roles::{Role, RoleSet};
pub use session::{Session, SessionWindowError, validate_window};
