/// Task access-control policy
///
/// The single decision point for who may see or modify a task. Every
/// per-task endpoint (get, update, delete) routes through
/// [`task_access`] instead of branching on roles locally, so the rules
/// cannot drift between handlers.
///
/// Rules:
///
/// - Admins may read and write every task.
/// - The owner (creator) may read and write their task.
/// - The assignee may read and write the task assigned to them.
/// - Everyone else gets nothing.

use crate::auth::context::AuthContext;
use crate::models::task::Task;

/// Access decision for one (actor, task) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskAccess {
    pub can_read: bool,
    pub can_write: bool,
}

impl TaskAccess {
    /// Full access
    pub const ALLOW: TaskAccess = TaskAccess {
        can_read: true,
        can_write: true,
    };

    /// No access
    pub const DENY: TaskAccess = TaskAccess {
        can_read: false,
        can_write: false,
    };
}

/// Evaluates what an actor may do with a task
pub fn task_access(actor: &AuthContext, task: &Task) -> TaskAccess {
    if actor.is_admin() {
        return TaskAccess::ALLOW;
    }

    let is_owner = task.created_by == actor.user_id;
    let is_assignee = task.assigned_to == Some(actor.user_id);

    if is_owner || is_assignee {
        TaskAccess::ALLOW
    } else {
        TaskAccess::DENY
    }
}
