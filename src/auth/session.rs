use axum::http::HeaderMap;
use serde::Serialize;
use uuid::Uuid;

use super::SessionKeys;
use crate::database::models::UserStatus;
use crate::database::Store;
use crate::error::ApiError;

/// Authenticated user resolved from the request's session token
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
}

/// Turns an inbound request into a principal, or refuses it
#[derive(Clone, Debug)]
pub struct SessionResolver {
    keys: SessionKeys,
}

impl SessionResolver {
    pub fn new(keys: SessionKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// `None` means anonymous: no token, a bad token, or a user that no longer exists
    pub async fn resolve(&self, store: &dyn Store, headers: &HeaderMap) -> Result<Option<Principal>, ApiError> {
        let token = match extract_bearer_token(headers) {
            Ok(token) => token,
            Err(reason) => {
                tracing::debug!("No session: {}", reason);
                return Ok(None);
            }
        };

        let claims = match self.keys.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                return Ok(None);
            }
        };

        let user = store.get_user(claims.sub).await?;
        let Some(user) = user else {
            tracing::warn!("Session token for unknown user {}", claims.sub);
            return Ok(None);
        };

        Ok(Some(Principal {
            user_id: user.id,
            name: user.name,
            email: user.email,
            status: user.status,
        }))
    }

    /// Principal with an active account: 401 when anonymous, 403 when inactive
    pub async fn require(&self, store: &dyn Store, headers: &HeaderMap) -> Result<Principal, ApiError> {
        let principal = self
            .resolve(store, headers)
            .await?
            .ok_or_else(|| ApiError::unauthorized("No autorizado"))?;

        if principal.status != UserStatus::Active {
            tracing::warn!("Inactive user {} attempted access", principal.user_id);
            return Err(ApiError::forbidden("Usuario inactivo"));
        }
        Ok(principal)
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing Authorization header")?;
    let value = header.to_str().map_err(|_| "Authorization header is not ASCII")?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::MemoryStore;
    use axum::http::HeaderValue;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
        assert_eq!(extract_bearer_token(&bearer("abc")).unwrap(), "abc");
    }

    #[tokio::test]
    async fn resolves_known_user_and_rejects_unknown() {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                status: UserStatus::Active,
                department_id: None,
            })
            .await
            .unwrap();
        let resolver = SessionResolver::new(SessionKeys::from_secret("s", 1).unwrap());

        let token = resolver.keys().issue(user.id, &user.email).unwrap();
        let principal = resolver.require(&store, &bearer(&token)).await.unwrap();
        assert_eq!(principal.user_id, user.id);

        let stranger = resolver.keys().issue(Uuid::new_v4(), "x@example.com").unwrap();
        let err = resolver.require(&store, &bearer(&stranger)).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn inactive_user_is_forbidden() {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                name: "Beto".into(),
                email: "beto@example.com".into(),
                status: UserStatus::Inactive,
                department_id: None,
            })
            .await
            .unwrap();
        let resolver = SessionResolver::new(SessionKeys::from_secret("s", 1).unwrap());
        let token = resolver.keys().issue(user.id, &user.email).unwrap();

        let err = resolver.require(&store, &bearer(&token)).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }
}
