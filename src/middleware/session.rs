use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the caller's session and injects the `Principal` into request extensions.
/// Anonymous requests stop here with 401.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = state.sessions.require(state.store.as_ref(), request.headers()).await?;

    tracing::debug!(
        "Session resolved: {} ({}) for {} {}",
        principal.email,
        principal.user_id,
        request.method(),
        request.uri().path()
    );

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
