mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{id_of, TestApp};
use serde_json::json;

#[tokio::test]
async fn project_links_lifecycle() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let project_id = app.project(&ana, &workspace_id, "Web").await?;
    let uri = format!("/api/projects/{}/links", project_id);

    let (status, link) = app
        .post(&uri, &ana, json!({ "title": "Diseño", "url": "https://figma.com/file/1" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(link["projectId"], project_id);

    let (_, list) = app.get(&uri, &ana).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, body) = app.delete(&format!("{}/{}", uri, id_of(&link)), &ana).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.delete(&format!("{}/{}", uri, id_of(&link)), &ana).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn link_requires_title_and_http_url() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let uri = format!("/api/workspaces/{}/links", workspace_id);

    let (status, body) = app.post(&uri, &ana, json!({ "url": "https://example.com" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fieldErrors"]["title"].is_string());

    let (status, body) = app
        .post(&uri, &ana, json!({ "title": "Doc", "url": "javascript:alert(1)" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "La URL no es válida");

    let (_, list) = app.get(&uri, &ana).await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn link_from_another_project_cannot_be_deleted_through_this_one() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let web = app.project(&ana, &workspace_id, "Web").await?;
    let mobile = app.project(&ana, &workspace_id, "Móvil").await?;

    let (_, link) = app
        .post(
            &format!("/api/projects/{}/links", web),
            &ana,
            json!({ "title": "Repo", "url": "https://git.example.com/web" }),
        )
        .await?;

    let (status, _) = app
        .delete(&format!("/api/projects/{}/links/{}", mobile, id_of(&link)), &ana)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get(&format!("/api/projects/{}/links", web), &ana).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn workspace_links_are_member_only() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let eve = app.user("Eve", "eve@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let uri = format!("/api/workspaces/{}/links", workspace_id);

    let (status, link) = app
        .post(&uri, &ana, json!({ "title": "Wiki", "url": "http://wiki.local/" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(link["createdBy"], ana.id().to_string());

    let (status, _) = app.get(&uri, &eve).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("{}/{}", uri, id_of(&link)), &eve).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn notes_are_replaced_and_may_be_emptied() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;
    let eve = app.user("Eve", "eve@example.com").await?;
    let workspace_id = app.workspace(&ana, "Equipo").await?;
    let project_id = app.project(&ana, &workspace_id, "Web").await?;
    let uri = format!("/api/projects/{}/notes", project_id);

    let (status, project) = app.patch(&uri, &ana, json!({ "notes": "# Ideas\n- una" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(project["notes"], "# Ideas\n- una");

    let (status, _) = app.patch(&uri, &ana, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.patch(&uri, &eve, json!({ "notes": "hack" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, project) = app.patch(&uri, &ana, json!({ "notes": "" })).await?;
    assert_eq!(project["notes"], "");
    Ok(())
}

#[tokio::test]
async fn unknown_project_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana", "ana@example.com").await?;

    let (status, body) = app
        .get(&format!("/api/projects/{}", uuid::Uuid::new_v4()), &ana)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Proyecto no encontrado");
    Ok(())
}
