//! Ownership policy.
//!
//! All owner-gated mutations (post and comment update/delete) go through the
//! same check instead of per-handler permission logic.

use ripple_common::{AppError, AppResult};
use ripple_db::entities::user;

/// Require that `actor` owns the resource belonging to `owner_id`.
///
/// Admins may act on any resource.
pub fn require_owner(actor: &user::Model, owner_id: &str) -> AppResult<()> {
    if actor.id == owner_id || actor.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author can modify this resource".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user_{id}"),
            username_lower: format!("user_{id}"),
            token: None,
            name: None,
            bio: None,
            avatar_url: None,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            is_admin,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_owner_is_allowed() {
        let actor = test_user("u1", false);
        assert!(require_owner(&actor, "u1").is_ok());
    }

    #[test]
    fn test_non_owner_is_forbidden() {
        let actor = test_user("u1", false);
        assert!(matches!(
            require_owner(&actor, "u2"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_admin_overrides_ownership() {
        let actor = test_user("u1", true);
        assert!(require_owner(&actor, "u2").is_ok());
    }
}
