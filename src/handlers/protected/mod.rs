// handlers/protected/mod.rs - Session-required handlers (/api/*)
//
// Every handler here receives the caller's `Principal` from the session
// middleware and checks workspace membership before touching storage.

pub mod columns;   // Board columns: create, rename, delete with task reassignment
pub mod finance;   // Income/expense entries and the dashboard
pub mod links;     // Workspace and project link lists
pub mod members;   // Workspace membership
pub mod projects;  // Projects, board view and notes
pub mod tasks;     // Tasks within columns
pub mod workspaces;
