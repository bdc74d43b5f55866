use axum::{extract::State, Extension};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::validate::{optional_text, required_text};
use crate::api::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::auth::Principal;
use crate::database::models::{DateRange, EntryKind, FinanceEntry, NewFinanceEntry};
use crate::error::ApiError;
use crate::services::access::require_member;
use crate::services::FinanceDashboard;
use crate::state::AppState;

/// Amounts are stored as NUMERIC(14,2)
const AMOUNT_SCALE: u32 = 2;
/// First whole amount that no longer fits twelve integer digits
const AMOUNT_LIMIT: i64 = 1_000_000_000_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub kind: Option<EntryKind>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub occurred_on: Option<NaiveDate>,
    pub project_id: Option<Uuid>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RangeQuery {
    fn into_range(self) -> Result<DateRange, ApiError> {
        let range = DateRange { from: self.from, to: self.to };
        if range.is_inverted() {
            return Err(ApiError::field("from", "La fecha inicial no puede ser posterior a la final"));
        }
        Ok(range)
    }
}

fn check_amount(amount: Option<Decimal>) -> Result<Decimal, ApiError> {
    let amount = amount.ok_or_else(|| ApiError::field("amount", "El monto es requerido"))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ApiError::field("amount", "El monto no puede ser negativo"));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(ApiError::field("amount", "El monto admite como máximo dos decimales"));
    }
    if amount >= Decimal::from(AMOUNT_LIMIT) {
        return Err(ApiError::field("amount", "El monto excede el máximo permitido"));
    }
    Ok(amount.round_dp(AMOUNT_SCALE))
}

/// GET /api/workspaces/:workspace_id/finance/entries?from=&to=
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> ApiResult<Vec<FinanceEntry>> {
    let range = query.into_range()?;
    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    let entries = state.store.list_finance_entries(workspace_id, range).await?;
    Ok(ApiResponse::success(entries))
}

/// POST /api/workspaces/:workspace_id/finance/entries - Record an income or expense
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateEntryRequest>,
) -> ApiResult<FinanceEntry> {
    let kind = payload
        .kind
        .ok_or_else(|| ApiError::field("kind", "El tipo es requerido"))?;
    let amount = check_amount(payload.amount)?;
    let category = required_text(payload.category, "category", "La categoría es requerida")?;
    let occurred_on = payload
        .occurred_on
        .ok_or_else(|| ApiError::field("occurredOn", "La fecha es requerida"))?;

    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    if let Some(project_id) = payload.project_id {
        let project = state.store.get_project(project_id).await?;
        if !project.is_some_and(|p| p.workspace_id == workspace_id) {
            return Err(ApiError::field("projectId", "El proyecto no pertenece al espacio de trabajo"));
        }
    }

    let entry = state
        .store
        .create_finance_entry(NewFinanceEntry {
            workspace_id,
            project_id: payload.project_id,
            kind,
            amount,
            category,
            description: optional_text(payload.description),
            occurred_on,
            created_by: Some(principal.user_id),
        })
        .await?;

    tracing::info!("Finance entry {} ({}) recorded in workspace {}", entry.id, entry.kind, workspace_id);
    Ok(ApiResponse::created(entry))
}

/// GET /api/workspaces/:workspace_id/finance/dashboard?from=&to=
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> ApiResult<FinanceDashboard> {
    let range = query.into_range()?;
    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    let dashboard = state.finance.get_dashboard(workspace_id, range).await?;
    Ok(ApiResponse::success(dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn amount_rules() {
        assert_eq!(check_amount(Some(Decimal::from_str("12.50").unwrap())).unwrap().to_string(), "12.50");
        assert_eq!(check_amount(Some(Decimal::from_str("3.100").unwrap())).unwrap().to_string(), "3.10");
        assert!(check_amount(Some(Decimal::from_str("0").unwrap())).is_ok());
        assert!(check_amount(Some(Decimal::from_str("-1").unwrap())).is_err());
        assert!(check_amount(Some(Decimal::from_str("1.005").unwrap())).is_err());
        assert!(check_amount(None).is_err());
    }

    #[test]
    fn amount_must_fit_the_column() {
        assert!(check_amount(Some(Decimal::from_str("999999999999.99").unwrap())).is_ok());
        assert!(check_amount(Some(Decimal::from_str("1000000000000").unwrap())).is_err());
        assert!(check_amount(Some(Decimal::MAX)).is_err());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let query = RangeQuery {
            from: NaiveDate::from_ymd_opt(2026, 3, 1),
            to: NaiveDate::from_ymd_opt(2026, 2, 1),
        };
        assert_eq!(query.into_range().unwrap_err().status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
