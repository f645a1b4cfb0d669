// tabkeeper state managers
// Managers own in-memory state: ordering, groups, selection, tab metadata, saved sessions.

pub mod group_manager;
pub mod ordering_manager;
pub mod selection_manager;
pub mod session_manager;
pub mod tab_manager;
