use std::sync::Arc;

use crate::auth::{SessionKeys, SessionResolver};
use crate::database::Store;
use crate::services::FinanceAnalyticsService;

/// Shared handles cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<SessionResolver>,
    pub finance: FinanceAnalyticsService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, keys: SessionKeys) -> Self {
        Self {
            finance: FinanceAnalyticsService::new(store.clone()),
            sessions: Arc::new(SessionResolver::new(keys)),
            store,
        }
    }
}
