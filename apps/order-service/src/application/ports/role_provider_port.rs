//! Role Provider Port
//!
//! Derives the roles a requester presents to the market oracle.

use crate::application::context::RequestContext;
use crate::application::ports::UserRole;
use crate::domain::shared::UserId;

/// Port for resolving requester roles.
pub trait RoleProviderPort: Send + Sync {
    /// Roles for `user_id` in the scope of this request.
    fn roles_for(&self, ctx: &RequestContext, user_id: &UserId) -> Vec<UserRole>;
}

/// Grants every requester the `COMMON` role.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRoleProvider;

impl RoleProviderPort for DefaultRoleProvider {
    fn roles_for(&self, _ctx: &RequestContext, _user_id: &UserId) -> Vec<UserRole> {
        vec![UserRole::Common]
    }
}
