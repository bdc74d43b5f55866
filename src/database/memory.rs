use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::*;
use super::store::{Store, StoreResult};

/// All rows, in insertion order
#[derive(Default)]
struct Tables {
    departments: Vec<Department>,
    users: Vec<User>,
    workspaces: Vec<Workspace>,
    members: Vec<WorkspaceMember>,
    workspace_links: Vec<WorkspaceLink>,
    projects: Vec<Project>,
    project_links: Vec<ProjectLink>,
    columns: Vec<TaskColumn>,
    tasks: Vec<Task>,
    finance_entries: Vec<FinanceEntry>,
}

impl Tables {
    fn next_task_position(&self, column_id: Uuid) -> i32 {
        self.tasks
            .iter()
            .filter(|t| t.column_id == column_id)
            .map(|t| t.position + 1)
            .max()
            .unwrap_or(0)
    }

    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }
}

/// In-process store used by the test suite and `serve --memory`.
///
/// One lock guards every table, so each trait call is atomic and enforces the
/// same uniqueness and reference rules as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        let _tables = self.tables.read().await;
        Ok(())
    }

    async fn ensure_department(&self, name: &str) -> StoreResult<Department> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.departments.iter().find(|d| d.name == name) {
            return Ok(existing.clone());
        }
        let department = Department {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.departments.push(department.clone());
        Ok(department)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict("user already exists".to_string()));
        }
        if let Some(department_id) = user.department_id {
            if !tables.departments.iter().any(|d| d.id == department_id) {
                return Err(DatabaseError::NotFound("user references a missing record".to_string()));
            }
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            status: user.status,
            department_id: user.department_id,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_available_users(&self, workspace_id: Uuid) -> StoreResult<Vec<AvailableUser>> {
        let tables = self.tables.read().await;
        let mut users: Vec<AvailableUser> = tables
            .users
            .iter()
            .filter(|u| u.status == UserStatus::Active)
            .filter(|u| {
                !tables
                    .members
                    .iter()
                    .any(|m| m.workspace_id == workspace_id && m.user_id == u.id)
            })
            .map(|u| AvailableUser {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                department: u
                    .department_id
                    .and_then(|id| tables.departments.iter().find(|d| d.id == id))
                    .map(|d| d.name.clone()),
            })
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.email.cmp(&b.email)));
        Ok(users)
    }

    async fn create_workspace(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<(Workspace, WorkspaceMember)> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(owner_id) {
            return Err(DatabaseError::NotFound("membership references a missing record".to_string()));
        }
        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        let owner = WorkspaceMember {
            id: Uuid::new_v4(),
            workspace_id: workspace.id,
            user_id: owner_id,
            role: MemberRole::Owner,
            created_at: now,
        };
        tables.workspaces.push(workspace.clone());
        tables.members.push(owner.clone());
        Ok((workspace, owner))
    }

    async fn get_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>> {
        let tables = self.tables.read().await;
        Ok(tables.workspaces.iter().find(|w| w.id == id).cloned())
    }

    async fn update_workspace(&self, id: Uuid, changes: WorkspaceChanges) -> StoreResult<Workspace> {
        let mut tables = self.tables.write().await;
        let workspace = tables
            .workspaces
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("workspace {}", id)))?;
        if let Some(name) = changes.name {
            workspace.name = name;
        }
        if let Some(description) = changes.description {
            workspace.description = description;
        }
        workspace.updated_at = Utc::now();
        Ok(workspace.clone())
    }

    async fn list_workspaces_for_user(&self, user_id: Uuid) -> StoreResult<Vec<WorkspaceSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workspaces
            .iter()
            .filter_map(|w| {
                tables
                    .members
                    .iter()
                    .find(|m| m.workspace_id == w.id && m.user_id == user_id)
                    .map(|m| WorkspaceSummary { workspace: w.clone(), role: m.role })
            })
            .collect())
    }

    async fn find_membership(&self, workspace_id: Uuid, user_id: Uuid) -> StoreResult<Option<WorkspaceMember>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_members(&self, workspace_id: Uuid) -> StoreResult<Vec<MemberDetail>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .filter(|m| m.workspace_id == workspace_id)
            .filter_map(|m| {
                tables.users.iter().find(|u| u.id == m.user_id).map(|u| MemberDetail {
                    user_id: u.id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                    role: m.role,
                    joined_at: m.created_at,
                })
            })
            .collect())
    }

    async fn add_member(&self, workspace_id: Uuid, user_id: Uuid, role: MemberRole) -> StoreResult<WorkspaceMember> {
        let mut tables = self.tables.write().await;
        if !tables.workspaces.iter().any(|w| w.id == workspace_id) || !tables.user_exists(user_id) {
            return Err(DatabaseError::NotFound("membership references a missing record".to_string()));
        }
        if tables
            .members
            .iter()
            .any(|m| m.workspace_id == workspace_id && m.user_id == user_id)
        {
            return Err(DatabaseError::Conflict("membership already exists".to_string()));
        }
        let member = WorkspaceMember {
            id: Uuid::new_v4(),
            workspace_id,
            user_id,
            role,
            created_at: Utc::now(),
        };
        tables.members.push(member.clone());
        Ok(member)
    }

    async fn remove_member(&self, workspace_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.members.len();
        tables
            .members
            .retain(|m| !(m.workspace_id == workspace_id && m.user_id == user_id));
        if tables.members.len() == before {
            return Ok(false);
        }

        let projects: Vec<Uuid> = tables
            .projects
            .iter()
            .filter(|p| p.workspace_id == workspace_id)
            .map(|p| p.id)
            .collect();
        let now = Utc::now();
        for task in tables
            .tasks
            .iter_mut()
            .filter(|t| t.assignee_id == Some(user_id) && projects.contains(&t.project_id))
        {
            task.assignee_id = None;
            task.updated_at = now;
        }
        Ok(true)
    }

    async fn create_workspace_link(
        &self,
        workspace_id: Uuid,
        title: &str,
        url: &str,
        created_by: Option<Uuid>,
    ) -> StoreResult<WorkspaceLink> {
        let mut tables = self.tables.write().await;
        if !tables.workspaces.iter().any(|w| w.id == workspace_id) {
            return Err(DatabaseError::NotFound("workspace link references a missing record".to_string()));
        }
        let link = WorkspaceLink {
            id: Uuid::new_v4(),
            workspace_id,
            title: title.to_string(),
            url: url.to_string(),
            created_by,
            created_at: Utc::now(),
        };
        tables.workspace_links.push(link.clone());
        Ok(link)
    }

    async fn list_workspace_links(&self, workspace_id: Uuid) -> StoreResult<Vec<WorkspaceLink>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workspace_links
            .iter()
            .filter(|l| l.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn delete_workspace_link(&self, workspace_id: Uuid, link_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.workspace_links.len();
        tables
            .workspace_links
            .retain(|l| !(l.id == link_id && l.workspace_id == workspace_id));
        Ok(tables.workspace_links.len() < before)
    }

    async fn create_project(&self, workspace_id: Uuid, name: &str, description: Option<&str>) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        if !tables.workspaces.iter().any(|w| w.id == workspace_id) {
            return Err(DatabaseError::NotFound("project references a missing record".to_string()));
        }
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            workspace_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        };
        for (position, label) in DEFAULT_COLUMNS.iter().enumerate() {
            tables.columns.push(TaskColumn {
                id: Uuid::new_v4(),
                project_id: project.id,
                label: label.to_string(),
                position: position as i32,
                created_at: now,
            });
        }
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, workspace_id: Uuid) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| p.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn update_project_notes(&self, id: Uuid, notes: &str) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("project {}", id)))?;
        project.notes = notes.to_string();
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn create_project_link(&self, project_id: Uuid, title: &str, url: &str) -> StoreResult<ProjectLink> {
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == project_id) {
            return Err(DatabaseError::NotFound("project link references a missing record".to_string()));
        }
        let link = ProjectLink {
            id: Uuid::new_v4(),
            project_id,
            title: title.to_string(),
            url: url.to_string(),
            created_at: Utc::now(),
        };
        tables.project_links.push(link.clone());
        Ok(link)
    }

    async fn list_project_links(&self, project_id: Uuid) -> StoreResult<Vec<ProjectLink>> {
        let tables = self.tables.read().await;
        Ok(tables
            .project_links
            .iter()
            .filter(|l| l.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn delete_project_link(&self, project_id: Uuid, link_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.project_links.len();
        tables
            .project_links
            .retain(|l| !(l.id == link_id && l.project_id == project_id));
        Ok(tables.project_links.len() < before)
    }

    async fn create_column(&self, project_id: Uuid, label: &str) -> StoreResult<TaskColumn> {
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == project_id) {
            return Err(DatabaseError::NotFound("column references a missing record".to_string()));
        }
        let position = tables
            .columns
            .iter()
            .filter(|c| c.project_id == project_id)
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0);
        let column = TaskColumn {
            id: Uuid::new_v4(),
            project_id,
            label: label.to_string(),
            position,
            created_at: Utc::now(),
        };
        tables.columns.push(column.clone());
        Ok(column)
    }

    async fn get_column(&self, id: Uuid) -> StoreResult<Option<TaskColumn>> {
        let tables = self.tables.read().await;
        Ok(tables.columns.iter().find(|c| c.id == id).cloned())
    }

    async fn list_columns(&self, project_id: Uuid) -> StoreResult<Vec<TaskColumn>> {
        let tables = self.tables.read().await;
        let mut columns: Vec<TaskColumn> = tables
            .columns
            .iter()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect();
        columns.sort_by_key(|c| c.position);
        Ok(columns)
    }

    async fn update_column_label(&self, id: Uuid, label: &str) -> StoreResult<TaskColumn> {
        let mut tables = self.tables.write().await;
        let column = tables
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("column {}", id)))?;
        column.label = label.to_string();
        Ok(column.clone())
    }

    async fn delete_column(&self, id: Uuid, move_to: Option<Uuid>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        if !tables.columns.iter().any(|c| c.id == id) {
            return Err(DatabaseError::NotFound(format!("column {}", id)));
        }

        let mut moved = 0;
        if let Some(target) = move_to {
            if !tables.columns.iter().any(|c| c.id == target) {
                return Err(DatabaseError::NotFound("task references a missing record".to_string()));
            }
            let mut next = tables.next_task_position(target);

            // Stable sort keeps insertion order for equal positions
            let mut indices: Vec<usize> = (0..tables.tasks.len())
                .filter(|&i| tables.tasks[i].column_id == id)
                .collect();
            indices.sort_by_key(|&i| tables.tasks[i].position);

            let now = Utc::now();
            for i in indices {
                let task = &mut tables.tasks[i];
                task.column_id = target;
                task.position = next;
                task.updated_at = now;
                next += 1;
                moved += 1;
            }
        } else {
            tables.tasks.retain(|t| t.column_id != id);
        }

        tables.columns.retain(|c| c.id != id);
        Ok(moved)
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let project_id = tables
            .columns
            .iter()
            .find(|c| c.id == task.column_id)
            .map(|c| c.project_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("column {}", task.column_id)))?;
        if let Some(assignee_id) = task.assignee_id {
            if !tables.user_exists(assignee_id) {
                return Err(DatabaseError::NotFound("task references a missing record".to_string()));
            }
        }
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            project_id,
            column_id: task.column_id,
            title: task.title,
            description: task.description,
            position: tables.next_task_position(task.column_id),
            assignee_id: task.assignee_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.position);
        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let index = tables
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("task {}", id)))?;

        if let Some(Some(assignee_id)) = changes.assignee_id {
            if !tables.user_exists(assignee_id) {
                return Err(DatabaseError::NotFound("task references a missing record".to_string()));
            }
        }
        if let Some(column_id) = changes.column_id {
            if column_id != tables.tasks[index].column_id {
                if !tables.columns.iter().any(|c| c.id == column_id) {
                    return Err(DatabaseError::NotFound("task references a missing record".to_string()));
                }
                let next = tables.next_task_position(column_id);
                let task = &mut tables.tasks[index];
                task.column_id = column_id;
                task.position = next;
            }
        }

        let task = &mut tables.tasks[index];
        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(assignee_id) = changes.assignee_id {
            task.assignee_id = assignee_id;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);
        Ok(tables.tasks.len() < before)
    }

    async fn create_finance_entry(&self, entry: NewFinanceEntry) -> StoreResult<FinanceEntry> {
        let mut tables = self.tables.write().await;
        if !tables.workspaces.iter().any(|w| w.id == entry.workspace_id) {
            return Err(DatabaseError::NotFound("finance entry references a missing record".to_string()));
        }
        let entry = FinanceEntry {
            id: Uuid::new_v4(),
            workspace_id: entry.workspace_id,
            project_id: entry.project_id,
            kind: entry.kind,
            amount: entry.amount,
            category: entry.category,
            description: entry.description,
            occurred_on: entry.occurred_on,
            created_by: entry.created_by,
            created_at: Utc::now(),
        };
        tables.finance_entries.push(entry.clone());
        Ok(entry)
    }

    async fn list_finance_entries(&self, workspace_id: Uuid, range: DateRange) -> StoreResult<Vec<FinanceEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<FinanceEntry> = tables
            .finance_entries
            .iter()
            .filter(|e| e.workspace_id == workspace_id && range.contains(e.occurred_on))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.occurred_on);
        Ok(entries)
    }
}
