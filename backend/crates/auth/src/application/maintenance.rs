//! Maintenance Utilities
//!
//! One-time data normalization, run at startup rather than on any request
//! path.

use std::sync::Arc;

use crate::domain::repository::UserRepository;
use crate::error::AuthResult;

/// Map a legacy English role label to its Portuguese replacement.
///
/// Returns `None` when the label is already normalized (or unknown), which
/// is what makes the migration idempotent.
pub fn normalize_role(role: &str) -> Option<&'static str> {
    match role {
        "doctor" => Some("medico"),
        "nurse" => Some("enfermeiro"),
        "receptionist" => Some("recepcionista"),
        "admin" => Some("administrador"),
        _ => None,
    }
}

/// Startup migration: rewrite legacy English role labels in place.
pub struct NormalizeRolesUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> NormalizeRolesUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Returns the number of users whose role changed.
    pub async fn execute(&self) -> AuthResult<u64> {
        let mut updated = 0u64;

        for mut user in self.user_repo.list().await? {
            let Some(role) = user.role.as_deref() else {
                continue;
            };
            if let Some(normalized) = normalize_role(role) {
                user.role = Some(normalized.to_string());
                user.touch();
                self.user_repo.update(&user).await?;
                updated += 1;
            }
        }

        if updated > 0 {
            tracing::info!(updated, "Normalized legacy role labels");
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_roles_map_to_portuguese() {
        assert_eq!(normalize_role("doctor"), Some("medico"));
        assert_eq!(normalize_role("nurse"), Some("enfermeiro"));
        assert_eq!(normalize_role("receptionist"), Some("recepcionista"));
        assert_eq!(normalize_role("admin"), Some("administrador"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        // A second pass over already-normalized labels changes nothing
        for normalized in ["medico", "enfermeiro", "recepcionista", "administrador"] {
            assert_eq!(normalize_role(normalized), None);
        }
    }

    #[test]
    fn test_unknown_roles_untouched() {
        assert_eq!(normalize_role("gestor"), None);
        assert_eq!(normalize_role(""), None);
    }
}
