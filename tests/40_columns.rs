mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{id_of, TestApp};
use serde_json::json;

#[tokio::test]
async fn new_project_has_default_columns() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let project_id = app.project(&ana, &workspace_id, "Web").await?;

    let labels: Vec<String> = app
        .columns(&ana, &project_id)
        .await?
        .into_iter()
        .map(|(_, label)| label)
        .collect();
    assert_eq!(labels, vec!["Por hacer", "En progreso", "Hecho"]);
    Ok(())
}

#[tokio::test]
async fn create_appends_and_patch_renames() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let project_id = app.project(&ana, &workspace_id, "Web").await?;

    let (status, column) = app
        .post(&format!("/api/projects/{}/columns", project_id), &ana, json!({ "label": "Revisión" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(column["position"], 3);

    let (status, renamed) = app
        .patch(&format!("/api/columns/{}", id_of(&column)), &ana, json!({ "label": " QA " }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["label"], "QA");

    let labels: Vec<String> = app.columns(&ana, &project_id).await?.into_iter().map(|c| c.1).collect();
    assert_eq!(labels.last().map(String::as_str), Some("QA"));
    Ok(())
}

#[tokio::test]
async fn blank_label_is_rejected_without_changes() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let project_id = app.project(&ana, &workspace_id, "Web").await?;
    let (column_id, _) = app.columns(&ana, &project_id).await?.remove(0);

    let (status, body) = app
        .patch(&format!("/api/columns/{}", column_id), &ana, json!({ "label": "  " }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fieldErrors"]["label"].is_string());

    let (_, label) = app.columns(&ana, &project_id).await?.remove(0);
    assert_eq!(label, "Por hacer");
    Ok(())
}

#[tokio::test]
async fn outsider_cannot_touch_columns() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let eve = app.user("Eve", "eve@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let project_id = app.project(&ana, &workspace_id, "Web").await?;
    let (column_id, _) = app.columns(&ana, &project_id).await?.remove(0);

    let (status, _) = app
        .patch(&format!("/api/columns/{}", column_id), &eve, json!({ "label": "Mío" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&format!("/api/columns/{}", column_id), &eve).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .patch(&format!("/api/columns/{}", uuid::Uuid::new_v4()), &ana, json!({ "label": "X" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(app.columns(&ana, &project_id).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn delete_with_move_to_reassigns_tasks_in_order() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let project_id = app.project(&ana, &workspace_id, "Web").await?;
    let columns = app.columns(&ana, &project_id).await?;
    let (todo, doing) = (&columns[0].0, &columns[1].0);

    app.post(&format!("/api/columns/{}/tasks", doing), &ana, json!({ "title": "existente" }))
        .await?;
    for title in ["uno", "dos"] {
        app.post(&format!("/api/columns/{}/tasks", todo), &ana, json!({ "title": title }))
            .await?;
    }

    let (status, body) = app
        .delete(&format!("/api/columns/{}?moveTo={}", todo, doing), &ana)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "movedTasks": 2 }));

    let (_, board) = app.get(&format!("/api/projects/{}/board", project_id), &ana).await?;
    let columns = board["columns"].as_array().cloned().unwrap_or_default();
    assert_eq!(columns.len(), 2);
    let titles: Vec<&str> = columns[0]["tasks"]
        .as_array()
        .map(|tasks| tasks.iter().filter_map(|t| t["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["existente", "uno", "dos"]);
    Ok(())
}

#[tokio::test]
async fn delete_without_move_to_drops_tasks() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let project_id = app.project(&ana, &workspace_id, "Web").await?;
    let (todo, _) = app.columns(&ana, &project_id).await?.remove(0);
    let (_, task) = app
        .post(&format!("/api/columns/{}/tasks", todo), &ana, json!({ "title": "uno" }))
        .await?;

    let (status, body) = app.delete(&format!("/api/columns/{}", todo), &ana).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movedTasks"], 0);

    let (status, _) = app.delete(&format!("/api/tasks/{}", id_of(&task)), &ana).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn move_to_must_be_another_column_of_the_same_project() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let web = app.project(&ana, &workspace_id, "Web").await?;
    let app_project = app.project(&ana, &workspace_id, "App").await?;
    let (todo, _) = app.columns(&ana, &web).await?.remove(0);
    let (foreign, _) = app.columns(&ana, &app_project).await?.remove(0);

    let (status, _) = app
        .delete(&format!("/api/columns/{}?moveTo={}", todo, foreign), &ana)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .delete(&format!("/api/columns/{}?moveTo={}", todo, todo), &ana)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .delete(&format!("/api/columns/{}?moveTo=nope", todo), &ana)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.columns(&ana, &web).await?.len(), 3);
    Ok(())
}
