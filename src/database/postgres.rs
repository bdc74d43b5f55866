use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::*;
use super::store::{Store, StoreResult};

const USER_COLUMNS: &str = "id, name, email, status, department_id, created_at";
const WORKSPACE_COLUMNS: &str = "id, name, description, created_at, updated_at";
const MEMBER_COLUMNS: &str = "id, workspace_id, user_id, role, created_at";
const WORKSPACE_LINK_COLUMNS: &str = "id, workspace_id, title, url, created_by, created_at";
const PROJECT_COLUMNS: &str = "id, workspace_id, name, description, notes, created_at, updated_at";
const PROJECT_LINK_COLUMNS: &str = "id, project_id, title, url, created_at";
const COLUMN_COLUMNS: &str = "id, project_id, label, position, created_at";
const TASK_COLUMNS: &str =
    "id, project_id, column_id, title, description, position, assignee_id, created_at, updated_at";
const FINANCE_COLUMNS: &str =
    "id, workspace_id, project_id, kind, amount, category, description, occurred_on, created_by, created_at";

/// PostgreSQL implementation of the persistence gateway
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into gateway errors the API can report
fn map_write_error(err: sqlx::Error, what: &str) -> DatabaseError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DatabaseError::Conflict(format!("{} already exists", what));
        }
        if db.is_foreign_key_violation() {
            return DatabaseError::NotFound(format!("{} references a missing record", what));
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn ensure_department(&self, name: &str) -> StoreResult<Department> {
        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (id, name) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(department)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, name, email, status, department_id) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.status.as_str())
            .bind(user.department_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "user"))
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list_available_users(&self, workspace_id: Uuid) -> StoreResult<Vec<AvailableUser>> {
        let users = sqlx::query_as::<_, AvailableUser>(
            r#"
            SELECT u.id, u.name, u.email, d.name AS department
            FROM users u
            LEFT JOIN departments d ON d.id = u.department_id
            WHERE u.status = 'active'
            AND NOT EXISTS (
                SELECT 1 FROM workspace_members m
                WHERE m.workspace_id = $1 AND m.user_id = u.id
            )
            ORDER BY u.name, u.email
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create_workspace(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<(Workspace, WorkspaceMember)> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO workspaces (id, name, description) VALUES ($1, $2, $3) RETURNING {}",
            WORKSPACE_COLUMNS
        );
        let workspace = sqlx::query_as::<_, Workspace>(&sql)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(description)
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO workspace_members (id, workspace_id, user_id, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            MEMBER_COLUMNS
        );
        let owner = sqlx::query_as::<_, WorkspaceMember>(&sql)
            .bind(Uuid::new_v4())
            .bind(workspace.id)
            .bind(owner_id)
            .bind(MemberRole::Owner.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "membership"))?;

        tx.commit().await?;
        Ok((workspace, owner))
    }

    async fn get_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>> {
        let sql = format!("SELECT {} FROM workspaces WHERE id = $1", WORKSPACE_COLUMNS);
        Ok(sqlx::query_as::<_, Workspace>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn update_workspace(&self, id: Uuid, changes: WorkspaceChanges) -> StoreResult<Workspace> {
        let sql = format!(
            "UPDATE workspaces SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                updated_at = now()
             WHERE id = $1
             RETURNING {}",
            WORKSPACE_COLUMNS
        );
        let clear_or_set = changes.description.is_some();
        sqlx::query_as::<_, Workspace>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(clear_or_set)
            .bind(changes.description.flatten())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("workspace {}", id)))
    }

    async fn list_workspaces_for_user(&self, user_id: Uuid) -> StoreResult<Vec<WorkspaceSummary>> {
        let workspaces = sqlx::query_as::<_, WorkspaceSummary>(
            r#"
            SELECT w.id, w.name, w.description, w.created_at, w.updated_at, m.role
            FROM workspaces w
            JOIN workspace_members m ON m.workspace_id = w.id
            WHERE m.user_id = $1
            ORDER BY w.created_at, w.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(workspaces)
    }

    async fn find_membership(&self, workspace_id: Uuid, user_id: Uuid) -> StoreResult<Option<WorkspaceMember>> {
        let sql = format!(
            "SELECT {} FROM workspace_members WHERE workspace_id = $1 AND user_id = $2",
            MEMBER_COLUMNS
        );
        Ok(sqlx::query_as::<_, WorkspaceMember>(&sql)
            .bind(workspace_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_members(&self, workspace_id: Uuid) -> StoreResult<Vec<MemberDetail>> {
        let members = sqlx::query_as::<_, MemberDetail>(
            r#"
            SELECT m.user_id, u.name, u.email, m.role, m.created_at AS joined_at
            FROM workspace_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.workspace_id = $1
            ORDER BY m.created_at, u.name
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn add_member(&self, workspace_id: Uuid, user_id: Uuid, role: MemberRole) -> StoreResult<WorkspaceMember> {
        let sql = format!(
            "INSERT INTO workspace_members (id, workspace_id, user_id, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            MEMBER_COLUMNS
        );
        sqlx::query_as::<_, WorkspaceMember>(&sql)
            .bind(Uuid::new_v4())
            .bind(workspace_id)
            .bind(user_id)
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "membership"))
    }

    async fn remove_member(&self, workspace_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM workspace_members WHERE workspace_id = $1 AND user_id = $2")
            .bind(workspace_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE tasks
                SET assignee_id = NULL, updated_at = now()
                WHERE assignee_id = $2
                  AND project_id IN (SELECT id FROM projects WHERE workspace_id = $1)
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn create_workspace_link(
        &self,
        workspace_id: Uuid,
        title: &str,
        url: &str,
        created_by: Option<Uuid>,
    ) -> StoreResult<WorkspaceLink> {
        let sql = format!(
            "INSERT INTO workspace_links (id, workspace_id, title, url, created_by) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            WORKSPACE_LINK_COLUMNS
        );
        sqlx::query_as::<_, WorkspaceLink>(&sql)
            .bind(Uuid::new_v4())
            .bind(workspace_id)
            .bind(title)
            .bind(url)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "workspace link"))
    }

    async fn list_workspace_links(&self, workspace_id: Uuid) -> StoreResult<Vec<WorkspaceLink>> {
        let sql = format!(
            "SELECT {} FROM workspace_links WHERE workspace_id = $1 ORDER BY created_at",
            WORKSPACE_LINK_COLUMNS
        );
        Ok(sqlx::query_as::<_, WorkspaceLink>(&sql)
            .bind(workspace_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_workspace_link(&self, workspace_id: Uuid, link_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM workspace_links WHERE id = $1 AND workspace_id = $2")
            .bind(link_id)
            .bind(workspace_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_project(&self, workspace_id: Uuid, name: &str, description: Option<&str>) -> StoreResult<Project> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO projects (id, workspace_id, name, description) VALUES ($1, $2, $3, $4) RETURNING {}",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(Uuid::new_v4())
            .bind(workspace_id)
            .bind(name)
            .bind(description)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "project"))?;

        for (position, label) in DEFAULT_COLUMNS.iter().enumerate() {
            sqlx::query("INSERT INTO task_columns (id, project_id, label, position) VALUES ($1, $2, $3, $4)")
                .bind(Uuid::new_v4())
                .bind(project.id)
                .bind(*label)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        Ok(sqlx::query_as::<_, Project>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list_projects(&self, workspace_id: Uuid) -> StoreResult<Vec<Project>> {
        let sql = format!(
            "SELECT {} FROM projects WHERE workspace_id = $1 ORDER BY created_at, name",
            PROJECT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(workspace_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_project_notes(&self, id: Uuid, notes: &str) -> StoreResult<Project> {
        let sql = format!(
            "UPDATE projects SET notes = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(notes)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("project {}", id)))
    }

    async fn create_project_link(&self, project_id: Uuid, title: &str, url: &str) -> StoreResult<ProjectLink> {
        let sql = format!(
            "INSERT INTO project_links (id, project_id, title, url) VALUES ($1, $2, $3, $4) RETURNING {}",
            PROJECT_LINK_COLUMNS
        );
        sqlx::query_as::<_, ProjectLink>(&sql)
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(title)
            .bind(url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "project link"))
    }

    async fn list_project_links(&self, project_id: Uuid) -> StoreResult<Vec<ProjectLink>> {
        let sql = format!(
            "SELECT {} FROM project_links WHERE project_id = $1 ORDER BY created_at",
            PROJECT_LINK_COLUMNS
        );
        Ok(sqlx::query_as::<_, ProjectLink>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_project_link(&self, project_id: Uuid, link_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM project_links WHERE id = $1 AND project_id = $2")
            .bind(link_id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_column(&self, project_id: Uuid, label: &str) -> StoreResult<TaskColumn> {
        let sql = format!(
            "INSERT INTO task_columns (id, project_id, label, position)
             SELECT $1, $2, $3, COALESCE(MAX(position) + 1, 0) FROM task_columns WHERE project_id = $2
             RETURNING {}",
            COLUMN_COLUMNS
        );
        sqlx::query_as::<_, TaskColumn>(&sql)
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(label)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "column"))
    }

    async fn get_column(&self, id: Uuid) -> StoreResult<Option<TaskColumn>> {
        let sql = format!("SELECT {} FROM task_columns WHERE id = $1", COLUMN_COLUMNS);
        Ok(sqlx::query_as::<_, TaskColumn>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list_columns(&self, project_id: Uuid) -> StoreResult<Vec<TaskColumn>> {
        let sql = format!(
            "SELECT {} FROM task_columns WHERE project_id = $1 ORDER BY position, created_at",
            COLUMN_COLUMNS
        );
        Ok(sqlx::query_as::<_, TaskColumn>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_column_label(&self, id: Uuid, label: &str) -> StoreResult<TaskColumn> {
        let sql = format!(
            "UPDATE task_columns SET label = $2 WHERE id = $1 RETURNING {}",
            COLUMN_COLUMNS
        );
        sqlx::query_as::<_, TaskColumn>(&sql)
            .bind(id)
            .bind(label)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("column {}", id)))
    }

    async fn delete_column(&self, id: Uuid, move_to: Option<Uuid>) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM task_columns WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DatabaseError::NotFound(format!("column {}", id)));
        }

        let mut moved = 0;
        if let Some(target) = move_to {
            let next: i32 = sqlx::query_scalar(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE column_id = $1",
            )
            .bind(target)
            .fetch_one(&mut *tx)
            .await?;

            let result = sqlx::query(
                r#"
                UPDATE tasks
                SET column_id = $1, position = ($2 + ranked.rn - 1)::int4, updated_at = now()
                FROM (
                    SELECT id, ROW_NUMBER() OVER (ORDER BY position, created_at) AS rn
                    FROM tasks WHERE column_id = $3
                ) ranked
                WHERE tasks.id = ranked.id
                "#,
            )
            .bind(target)
            .bind(next)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "task"))?;
            moved = result.rows_affected();
        }

        // Remaining tasks (none when moved) go with the column via ON DELETE CASCADE
        sqlx::query("DELETE FROM task_columns WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(moved)
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let sql = format!(
            "INSERT INTO tasks (id, project_id, column_id, title, description, assignee_id, position)
             SELECT $1, c.project_id, c.id, $3, $4, $5,
                    COALESCE((SELECT MAX(t.position) + 1 FROM tasks t WHERE t.column_id = c.id), 0)
             FROM task_columns c WHERE c.id = $2
             RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(Uuid::new_v4())
            .bind(task.column_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.assignee_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "task"))?
            .ok_or_else(|| DatabaseError::NotFound(format!("column {}", task.column_id)))
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        Ok(sqlx::query_as::<_, Task>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY column_id, position, created_at",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM tasks WHERE id = $1 FOR UPDATE", TASK_COLUMNS);
        let mut task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("task {}", id)))?;

        if let Some(column_id) = changes.column_id {
            if column_id != task.column_id {
                let next: i32 = sqlx::query_scalar(
                    "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE column_id = $1",
                )
                .bind(column_id)
                .fetch_one(&mut *tx)
                .await?;
                task.column_id = column_id;
                task.position = next;
            }
        }
        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(assignee_id) = changes.assignee_id {
            task.assignee_id = assignee_id;
        }

        let sql = format!(
            "UPDATE tasks SET title = $2, description = $3, column_id = $4, position = $5, assignee_id = $6,
                    updated_at = now()
             WHERE id = $1
             RETURNING {}",
            TASK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.column_id)
            .bind(task.position)
            .bind(task.assignee_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "task"))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_finance_entry(&self, entry: NewFinanceEntry) -> StoreResult<FinanceEntry> {
        let sql = format!(
            "INSERT INTO finance_entries
                (id, workspace_id, project_id, kind, amount, category, description, occurred_on, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            FINANCE_COLUMNS
        );
        sqlx::query_as::<_, FinanceEntry>(&sql)
            .bind(Uuid::new_v4())
            .bind(entry.workspace_id)
            .bind(entry.project_id)
            .bind(entry.kind.as_str())
            .bind(entry.amount)
            .bind(&entry.category)
            .bind(&entry.description)
            .bind(entry.occurred_on)
            .bind(entry.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "finance entry"))
    }

    async fn list_finance_entries(&self, workspace_id: Uuid, range: DateRange) -> StoreResult<Vec<FinanceEntry>> {
        let sql = format!(
            "SELECT {} FROM finance_entries
             WHERE workspace_id = $1
             AND ($2::date IS NULL OR occurred_on >= $2)
             AND ($3::date IS NULL OR occurred_on <= $3)
             ORDER BY occurred_on, created_at",
            FINANCE_COLUMNS
        );
        Ok(sqlx::query_as::<_, FinanceEntry>(&sql)
            .bind(workspace_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(&self.pool)
            .await?)
    }
}
