#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use taskboard_api::auth::SessionKeys;
use taskboard_api::config::AppConfig;
use taskboard_api::database::models::{NewUser, User, UserStatus};
use taskboard_api::database::{MemoryStore, Store};
use taskboard_api::{app, AppState};

const TEST_SECRET: &str = "integration-test-secret";

/// In-process application over a fresh in-memory store
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub keys: SessionKeys,
}

/// A seeded user and a bearer token for them
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let keys = SessionKeys::from_secret(TEST_SECRET, 1).expect("test keys");
        let state = AppState::new(store.clone(), keys.clone());
        let router = app(state, &AppConfig::development());
        Self { router, store, keys }
    }

    pub async fn user(&self, name: &str, email: &str) -> Result<TestUser> {
        self.user_with(name, email, UserStatus::Active, None).await
    }

    pub async fn user_with(
        &self,
        name: &str,
        email: &str,
        status: UserStatus,
        department: Option<&str>,
    ) -> Result<TestUser> {
        let department_id = match department {
            Some(d) => Some(self.store.ensure_department(d).await?.id),
            None => None,
        };
        let user = self
            .store
            .create_user(NewUser {
                name: name.into(),
                email: email.into(),
                status,
                department_id,
            })
            .await?;
        let token = self.keys.issue(user.id, &user.email)?;
        Ok(TestUser { user, token })
    }

    /// Sends a request through the router and returns the status with the parsed JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(&user.token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, user: &TestUser, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PATCH, uri, Some(&user.token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, Some(&user.token), None).await
    }

    /// Creates a workspace through the API and returns its id
    pub async fn workspace(&self, owner: &TestUser, name: &str) -> Result<String> {
        let (status, body) = self
            .post("/api/workspaces", owner, serde_json::json!({ "name": name }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "workspace create failed: {} {}", status, body);
        Ok(id_of(&body))
    }

    /// Creates a project through the API and returns its id
    pub async fn project(&self, owner: &TestUser, workspace_id: &str, name: &str) -> Result<String> {
        let (status, body) = self
            .post(
                &format!("/api/workspaces/{}/projects", workspace_id),
                owner,
                serde_json::json!({ "name": name }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "project create failed: {} {}", status, body);
        Ok(id_of(&body))
    }

    /// Board columns as (id, label) in position order
    pub async fn columns(&self, user: &TestUser, project_id: &str) -> Result<Vec<(String, String)>> {
        let (status, body) = self.get(&format!("/api/projects/{}/board", project_id), user).await?;
        anyhow::ensure!(status == StatusCode::OK, "board failed: {} {}", status, body);
        Ok(body["columns"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .map(|c| (id_of(c), c["label"].as_str().unwrap_or_default().to_string()))
            .collect())
    }

    pub async fn add_member(&self, actor: &TestUser, workspace_id: &str, user: &TestUser) -> Result<()> {
        let (status, body) = self
            .post(
                &format!("/api/workspaces/{}/members", workspace_id),
                actor,
                serde_json::json!({ "userId": user.id() }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "add member failed: {} {}", status, body);
        Ok(())
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_string()
}
