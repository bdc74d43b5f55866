//! Persistence gateway.
//!
//! Every handler talks to storage through [`Store`]. `PgStore` backs it with
//! PostgreSQL; `MemoryStore` keeps the same tables in process for tests and
//! demos. Operations that touch several rows are atomic in both.

use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::*;

pub type StoreResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Round trip to the backing store
    async fn ping(&self) -> StoreResult<()>;

    // Users and departments

    /// Returns the department with this name, creating it if needed
    async fn ensure_department(&self, name: &str) -> StoreResult<Department>;

    /// Fails with `Conflict` when the email is taken
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Active users with no membership in the workspace, ordered by name
    async fn list_available_users(&self, workspace_id: Uuid) -> StoreResult<Vec<AvailableUser>>;

    // Workspaces

    /// Creates the workspace and the creator's `owner` membership together
    async fn create_workspace(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<(Workspace, WorkspaceMember)>;

    async fn get_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>>;

    async fn update_workspace(&self, id: Uuid, changes: WorkspaceChanges) -> StoreResult<Workspace>;

    async fn list_workspaces_for_user(&self, user_id: Uuid) -> StoreResult<Vec<WorkspaceSummary>>;

    // Memberships

    async fn find_membership(&self, workspace_id: Uuid, user_id: Uuid) -> StoreResult<Option<WorkspaceMember>>;

    async fn list_members(&self, workspace_id: Uuid) -> StoreResult<Vec<MemberDetail>>;

    /// Fails with `Conflict` when the user is already a member
    async fn add_member(&self, workspace_id: Uuid, user_id: Uuid, role: MemberRole) -> StoreResult<WorkspaceMember>;

    /// Returns false when there was no such membership. The user's task
    /// assignments inside the workspace are cleared with it.
    async fn remove_member(&self, workspace_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    // Workspace links

    async fn create_workspace_link(
        &self,
        workspace_id: Uuid,
        title: &str,
        url: &str,
        created_by: Option<Uuid>,
    ) -> StoreResult<WorkspaceLink>;

    async fn list_workspace_links(&self, workspace_id: Uuid) -> StoreResult<Vec<WorkspaceLink>>;

    async fn delete_workspace_link(&self, workspace_id: Uuid, link_id: Uuid) -> StoreResult<bool>;

    // Projects

    /// Creates the project with the default columns
    async fn create_project(&self, workspace_id: Uuid, name: &str, description: Option<&str>) -> StoreResult<Project>;

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    async fn list_projects(&self, workspace_id: Uuid) -> StoreResult<Vec<Project>>;

    async fn update_project_notes(&self, id: Uuid, notes: &str) -> StoreResult<Project>;

    // Project links

    async fn create_project_link(&self, project_id: Uuid, title: &str, url: &str) -> StoreResult<ProjectLink>;

    async fn list_project_links(&self, project_id: Uuid) -> StoreResult<Vec<ProjectLink>>;

    async fn delete_project_link(&self, project_id: Uuid, link_id: Uuid) -> StoreResult<bool>;

    // Columns

    /// Appends a column after the project's last one
    async fn create_column(&self, project_id: Uuid, label: &str) -> StoreResult<TaskColumn>;

    async fn get_column(&self, id: Uuid) -> StoreResult<Option<TaskColumn>>;

    /// Columns of a project in position order
    async fn list_columns(&self, project_id: Uuid) -> StoreResult<Vec<TaskColumn>>;

    async fn update_column_label(&self, id: Uuid, label: &str) -> StoreResult<TaskColumn>;

    /// Deletes a column. With `move_to`, its tasks are first appended to that
    /// column in their current order; otherwise they are deleted with it.
    /// Returns the number of tasks moved.
    async fn delete_column(&self, id: Uuid, move_to: Option<Uuid>) -> StoreResult<u64>;

    // Tasks

    /// Appends a task to the end of its column
    async fn create_task(&self, task: NewTask) -> StoreResult<Task>;

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Tasks of a project ordered by position within each column
    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>>;

    /// A changed `column_id` moves the task to the end of that column
    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> StoreResult<Task>;

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    // Finance

    async fn create_finance_entry(&self, entry: NewFinanceEntry) -> StoreResult<FinanceEntry>;

    /// Entries in the range, oldest first
    async fn list_finance_entries(&self, workspace_id: Uuid, range: DateRange) -> StoreResult<Vec<FinanceEntry>>;
}
