pub mod board;
pub mod finance;
pub mod project;
pub mod user;
pub mod workspace;

pub use board::{Board, BoardColumn, NewTask, Task, TaskChanges, TaskColumn};
pub use finance::{DateRange, EntryKind, FinanceEntry, NewFinanceEntry};
pub use project::{Project, ProjectLink, DEFAULT_COLUMNS};
pub use user::{AvailableUser, Department, NewUser, User, UserStatus};
pub use workspace::{
    MemberDetail, MemberRole, Workspace, WorkspaceChanges, WorkspaceLink, WorkspaceMember, WorkspaceSummary,
};
