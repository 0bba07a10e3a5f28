//! services/app/src/app/router.rs
//!
//! The role-gated router: which dashboard variant renders for a resolved
//! role. `Unknown` stays on the loading placeholder until resolution; there
//! is deliberately no timeout for a hung resolution.

use learnx_core::domain::Role;

/// Exactly one of these renders at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardView {
    /// The placeholder shown while the role is still `Unknown`.
    Loading,
    Student,
    Instructor,
    Admin,
}

impl DashboardView {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Student => DashboardView::Student,
            Role::Instructor => DashboardView::Instructor,
            Role::Admin => DashboardView::Admin,
            Role::Unknown => DashboardView::Loading,
        }
    }
}
