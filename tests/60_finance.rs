mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn entries_feed_the_dashboard() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let project_id = app.project(&ana, &workspace_id, "Web").await?;
    let entries = format!("/api/workspaces/{}/finance/entries", workspace_id);

    for body in [
        json!({ "kind": "income", "amount": "1500.00", "category": "Ventas", "occurredOn": "2026-01-15", "projectId": project_id }),
        json!({ "kind": "expense", "amount": "200.25", "category": "Hosting", "occurredOn": "2026-01-20", "projectId": project_id }),
        json!({ "kind": "expense", "amount": "99.75", "category": "Oficina", "occurredOn": "2026-02-02" }),
    ] {
        let (status, created) = app.post(&entries, &ana, body).await?;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
    }

    let (status, dashboard) = app
        .get(&format!("/api/workspaces/{}/finance/dashboard", workspace_id), &ana)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["totals"]["income"], "1500.00");
    assert_eq!(dashboard["totals"]["expense"], "300.00");
    assert_eq!(dashboard["totals"]["balance"], "1200.00");
    assert_eq!(dashboard["totals"]["entryCount"], 3);

    let months: Vec<&str> = dashboard["monthly"]
        .as_array()
        .map(|m| m.iter().filter_map(|p| p["month"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(months, vec!["2026-01", "2026-02"]);

    assert_eq!(dashboard["byProject"][0]["projectName"], "Web");
    assert_eq!(dashboard["byProject"][1]["projectId"], serde_json::Value::Null);
    assert_eq!(dashboard["byCategory"][0]["category"], "Ventas");
    Ok(())
}

#[tokio::test]
async fn dashboard_respects_date_range() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let entries = format!("/api/workspaces/{}/finance/entries", workspace_id);

    for (amount, date) in [("10.00", "2026-01-31"), ("20.00", "2026-02-01"), ("40.00", "2026-03-01")] {
        app.post(
            &entries,
            &ana,
            json!({ "kind": "income", "amount": amount, "category": "Ventas", "occurredOn": date }),
        )
        .await?;
    }

    let (status, dashboard) = app
        .get(
            &format!("/api/workspaces/{}/finance/dashboard?from=2026-02-01&to=2026-02-28", workspace_id),
            &ana,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["totals"]["income"], "20.00");
    assert_eq!(dashboard["from"], "2026-02-01");

    let (_, list) = app.get(&format!("{}?from=2026-02-01", entries), &ana).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(2));

    let (status, _) = app
        .get(
            &format!("/api/workspaces/{}/finance/dashboard?from=2026-03-01&to=2026-02-01", workspace_id),
            &ana,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn invalid_entries_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let other_workspace = app.workspace(&ana, "Otro").await?;
    let foreign_project = app.project(&ana, &other_workspace, "Ajeno").await?;
    let entries = format!("/api/workspaces/{}/finance/entries", workspace_id);

    let (status, body) = app
        .post(&entries, &ana, json!({ "kind": "expense", "amount": "-5", "category": "X", "occurredOn": "2026-01-01" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fieldErrors"]["amount"].is_string());

    let (status, _) = app
        .post(&entries, &ana, json!({ "kind": "expense", "amount": "5", "category": " ", "occurredOn": "2026-01-01" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&entries, &ana, json!({ "kind": "gift", "amount": "5", "category": "X", "occurredOn": "2026-01-01" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            &entries,
            &ana,
            json!({ "kind": "income", "amount": "5", "category": "X", "occurredOn": "2026-01-01", "projectId": foreign_project }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fieldErrors"]["projectId"].is_string());

    let (_, list) = app.get(&entries, &ana).await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn finance_is_member_only() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let eve = app.user("Eve", "eve@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;

    let (status, _) = app
        .get(&format!("/api/workspaces/{}/finance/dashboard", workspace_id), &eve)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            &format!("/api/workspaces/{}/finance/entries", workspace_id),
            &eve,
            json!({ "kind": "income", "amount": "1", "category": "X", "occurredOn": "2026-01-01" }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn oversized_amounts_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let entries = format!("/api/workspaces/{}/finance/entries", workspace_id);

    for amount in ["79228162514264337593543950335", "79228162514264337593543950335", "1000000000000"] {
        let (status, body) = app
            .post(&entries, &ana, json!({ "kind": "income", "amount": amount, "category": "Ventas", "occurredOn": "2026-01-01" }))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert!(body["fieldErrors"]["amount"].is_string());
    }

    let (status, _) = app
        .post(
            &entries,
            &ana,
            json!({ "kind": "income", "amount": "999999999999.99", "category": "Ventas", "occurredOn": "2026-01-01" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, dashboard) = app
        .get(&format!("/api/workspaces/{}/finance/dashboard", workspace_id), &ana)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["totals"]["income"], "999999999999.99");
    assert_eq!(dashboard["totals"]["entryCount"], 1);
    Ok(())
}
