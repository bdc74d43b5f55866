//! Router assembly.
//!
//! Public routes sit at the root. Everything under `/api` goes through
//! `require_session` first, then global layers wrap the whole tree.

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::require_session;
use crate::state::AppState;

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let api = Router::new()
        .merge(workspace_routes())
        .merge(project_routes())
        .merge(board_routes())
        .merge(finance_routes())
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Session required
        .merge(api)
        // The configured limit replaces axum's 2MB extractor default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(config));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}

fn workspace_routes() -> Router<AppState> {
    use protected::{links, members, workspaces};

    Router::new()
        .route("/api/workspaces", get(workspaces::list).post(workspaces::create))
        .route(
            "/api/workspaces/:workspace_id",
            get(workspaces::show).patch(workspaces::update),
        )
        // Membership
        .route(
            "/api/workspaces/:workspace_id/members",
            get(members::list).post(members::add),
        )
        .route("/api/workspaces/:workspace_id/members/:user_id", delete(members::remove))
        .route("/api/workspaces/:workspace_id/available-users", get(members::available_users))
        // Links
        .route(
            "/api/workspaces/:workspace_id/links",
            get(links::workspace_list).post(links::workspace_create),
        )
        .route("/api/workspaces/:workspace_id/links/:link_id", delete(links::workspace_delete))
}

fn project_routes() -> Router<AppState> {
    use protected::{links, projects};

    Router::new()
        .route(
            "/api/workspaces/:workspace_id/projects",
            get(projects::list).post(projects::create),
        )
        .route("/api/projects/:project_id", get(projects::show))
        .route("/api/projects/:project_id/board", get(projects::board))
        .route("/api/projects/:project_id/notes", patch(projects::update_notes))
        .route(
            "/api/projects/:project_id/links",
            get(links::project_list).post(links::project_create),
        )
        .route("/api/projects/:project_id/links/:link_id", delete(links::project_delete))
}

fn board_routes() -> Router<AppState> {
    use protected::{columns, tasks};

    Router::new()
        .route("/api/projects/:project_id/columns", post(columns::create))
        .route(
            "/api/columns/:column_id",
            patch(columns::update).delete(columns::delete),
        )
        .route("/api/columns/:column_id/tasks", post(tasks::create))
        .route("/api/tasks/:task_id", patch(tasks::update).delete(tasks::delete))
}

fn finance_routes() -> Router<AppState> {
    use protected::finance;

    Router::new()
        .route(
            "/api/workspaces/:workspace_id/finance/entries",
            get(finance::list).post(finance::create),
        )
        .route("/api/workspaces/:workspace_id/finance/dashboard", get(finance::dashboard))
}
