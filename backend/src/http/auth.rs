//! Extractors that resolve the `Authorization` header through the
//! configured [`Authenticator`](crate::auth::Authenticator).

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::AppError;
use super::state::AppState;
use crate::auth::{bearer_token, AuthenticatedUser};

fn credential(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
}

/// The caller of a protected route.
///
/// Rejects with 401 when no bearer credential is sent and 403 when the
/// credential is not recognised.
#[derive(Debug, Clone)]
pub struct RequireUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = credential(parts)
            .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

        match state.authenticator.resolve(token) {
            Some(user) => Ok(RequireUser(user)),
            None => {
                tracing::debug!("Rejected request to {}: unknown token", parts.uri.path());
                Err(AppError::Forbidden("Invalid or expired token".to_string()))
            }
        }
    }
}

/// The caller if a valid credential was sent. Never rejects.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Infallible> {
        Ok(MaybeUser(
            credential(parts).and_then(|token| state.authenticator.resolve(token)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, StaticTokenAuthenticator};
    use crate::db::repositories::LocalRepository;
    use crate::models::UserId;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;

    fn state() -> AppState {
        let auth = StaticTokenAuthenticator::new().with_token(
            "good",
            AuthenticatedUser {
                id: UserId(5),
                username: "ravi".to_string(),
                role: Role::User,
            },
        );
        AppState::new(Arc::new(LocalRepository::new()), Arc::new(auth))
    }

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_require_user_statuses() {
        let state = state();

        let err = RequireUser::from_request_parts(&mut parts(None), &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = RequireUser::from_request_parts(&mut parts(Some("Bearer bad")), &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let RequireUser(user) =
            RequireUser::from_request_parts(&mut parts(Some("Bearer good")), &state)
                .await
                .unwrap();
        assert_eq!(user.id, UserId(5));
    }

    #[tokio::test]
    async fn test_maybe_user_never_rejects() {
        let state = state();
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut parts(Some("Bearer bad")), &state)
            .await
            .unwrap();
        assert!(user.is_none());

        let MaybeUser(user) = MaybeUser::from_request_parts(&mut parts(Some("Bearer good")), &state)
            .await
            .unwrap();
        assert_eq!(user.map(|u| u.username), Some("ravi".to_string()));
    }
}
