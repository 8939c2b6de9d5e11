use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::{JwtKeys, TokenKind};
use crate::auth::repo::Role;
use crate::state::AppState;

/// The authenticated caller, extracted from a Bearer access token.
/// Handlers take this explicitly instead of reading ambient request state.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    /// Owner-or-admin check used for course and lesson mutation.
    pub fn may_manage(&self, instructor_id: Uuid) -> bool {
        self.user_id == instructor_id || self.role == Role::Admin
    }

    /// Course creation is limited to instructors and admins.
    pub fn may_create_courses(&self) -> bool {
        matches!(self.role, Role::Instructor | Role::Admin)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            ))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err((
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired token".to_string(),
                ));
            }
        };

        if claims.kind != TokenKind::Access {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Access token required".to_string(),
            ));
        }

        Ok(Actor {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_may_manage_own_course() {
        let id = Uuid::new_v4();
        let actor = Actor {
            user_id: id,
            role: Role::Instructor,
        };
        assert!(actor.may_manage(id));
    }

    #[test]
    fn non_owner_may_not_manage() {
        let actor = Actor {
            user_id: Uuid::new_v4(),
            role: Role::Instructor,
        };
        assert!(!actor.may_manage(Uuid::new_v4()));
    }

    #[test]
    fn admin_may_manage_any_course() {
        let actor = Actor {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(actor.may_manage(Uuid::new_v4()));
    }

    #[test]
    fn only_instructors_and_admins_create_courses() {
        let base = Actor {
            user_id: Uuid::new_v4(),
            role: Role::Student,
        };
        assert!(!base.may_create_courses());
        assert!(Actor {
            role: Role::Instructor,
            ..base
        }
        .may_create_courses());
        assert!(Actor {
            role: Role::Admin,
            ..base
        }
        .may_create_courses());
    }
}
