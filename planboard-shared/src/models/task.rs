/// Task model and query logic
///
/// Tasks are the core entity of Planboard: a unit of work with status,
/// priority, an optional due date, and a mandatory `created_for` date —
/// the calendar day the task is planned for and the partition key for
/// dashboard views.
///
/// Status is a flat enum with no transition graph: any status may move to
/// any other via update. Richer workflow semantics are deliberately not
/// modeled here.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(100) NOT NULL,
///     description VARCHAR(1000) NOT NULL,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     created_for TIMESTAMPTZ NOT NULL,
///     created_by UUID NOT NULL REFERENCES users(id),
///     assigned_to UUID,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `assigned_to` carries no foreign key: assignee integrity is
/// best-effort, and a dangling reference resolves to a null assignee in
/// [`TaskView`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Awaiting review
    Review,

    /// Finished
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task model as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title (3-100 chars, validated at the boundary)
    pub title: String,

    /// Longer description (5-1000 chars)
    pub description: String,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// The calendar day this task is planned for (partition key, never null)
    pub created_for: DateTime<Utc>,

    /// Owner: the user who created the task (immutable)
    pub created_by: Uuid,

    /// Optional assignee (may dangle; no foreign key)
    pub assigned_to: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Minimal user projection embedded in task views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Task with owner/assignee references resolved to name and email
///
/// This is the shape every task-returning endpoint responds with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_for: DateTime<Utc>,
    pub created_by: UserSummary,

    /// None when unassigned or when the assignee reference dangles
    pub assigned_to: Option<UserSummary>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row shape for the joined task/user select
#[derive(Debug, sqlx::FromRow)]
struct TaskViewRow {
    id: Uuid,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    created_for: DateTime<Utc>,
    created_by: Uuid,
    created_by_name: String,
    created_by_email: String,
    assigned_to: Option<Uuid>,
    assigned_to_name: Option<String>,
    assigned_to_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskViewRow> for TaskView {
    fn from(row: TaskViewRow) -> Self {
        let assigned_to = match (row.assigned_to, row.assigned_to_name, row.assigned_to_email) {
            (Some(id), Some(name), Some(email)) => Some(UserSummary { id, name, email }),
            // Dangling assignee reference: render as unassigned
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            due_date: row.due_date,
            created_for: row.created_for,
            created_by: UserSummary {
                id: row.created_by,
                name: row.created_by_name,
                email: row.created_by_email,
            },
            assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Columns and joins shared by every view-producing select
const VIEW_SELECT: &str = r#"
SELECT t.id, t.title, t.description, t.status, t.priority, t.due_date, t.created_for,
       t.created_by, c.name AS created_by_name, c.email AS created_by_email,
       t.assigned_to, a.name AS assigned_to_name, a.email AS assigned_to_email,
       t.created_at, t.updated_at
FROM tasks t
JOIN users c ON c.id = t.created_by
LEFT JOIN users a ON a.id = t.assigned_to
"#;

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_for: DateTime<Utc>,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
}

/// Partial update applied to an existing task
///
/// Absent fields leave the stored value untouched. `assigned_to` is
/// tri-state: `None` keeps the current assignee, `Some(None)` clears it,
/// `Some(Some(id))` replaces it. `created_for` can be changed but never
/// cleared.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_for: Option<DateTime<Utc>>,
    pub assigned_to: Option<Option<Uuid>>,
}

impl TaskChanges {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.created_for.is_none()
            && self.assigned_to.is_none()
    }
}

/// Visibility scope for list queries
///
/// Admins get `All`; everyone else gets `VisibleTo(their id)`, which
/// restricts results to tasks they own or are assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// No visibility restriction (admin)
    All,

    /// Owner-or-assignee restriction for the given user
    VisibleTo(Uuid),
}

/// Sortable columns for list queries
///
/// A closed set so user input can never reach the ORDER BY clause
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    DueDate,
    CreatedFor,
    Title,
    Status,
    Priority,
}

impl Default for SortField {
    fn default() -> Self {
        SortField::CreatedAt
    }
}

impl SortField {
    /// The column name this field sorts by
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::DueDate => "due_date",
            SortField::CreatedFor => "created_for",
            SortField::Title => "title",
            SortField::Status => "status",
            SortField::Priority => "priority",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl Default for SortDir {
    fn default() -> Self {
        SortDir::Desc
    }
}

impl SortDir {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Filter, scope, and page parameters for task lists
#[derive(Debug, Clone)]
pub struct TaskFilter {
    /// Visibility scope (decided by the caller from the actor's role)
    pub scope: ListScope,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    /// Case-insensitive substring match over title OR description,
    /// ANDed with the visibility scope
    pub search: Option<String>,

    /// Explicit owner filter (admin scope only)
    pub created_by: Option<Uuid>,

    /// Explicit assignee filter (admin scope only)
    pub assigned_to: Option<Uuid>,

    /// 1-indexed page
    pub page: i64,

    /// Page size
    pub limit: i64,

    pub sort_by: SortField,
    pub sort_dir: SortDir,
}

impl TaskFilter {
    /// A bare filter with default paging (page 1, 10 per page,
    /// newest-created first)
    pub fn for_scope(scope: ListScope) -> Self {
        Self {
            scope,
            status: None,
            priority: None,
            search: None,
            created_by: None,
            assigned_to: None,
            page: 1,
            limit: 10,
            sort_by: SortField::default(),
            sort_dir: SortDir::default(),
        }
    }

    fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s))
    }

    /// Builds the WHERE clause for this filter
    ///
    /// Returns the SQL fragment (empty or starting with " WHERE") and the
    /// number of placeholders used. Placeholder numbering must match the
    /// bind order in [`Task::list`].
    fn where_clause(&self) -> (String, usize) {
        let mut conds: Vec<String> = Vec::new();
        let mut n = 0usize;

        if let ListScope::VisibleTo(_) = self.scope {
            n += 1;
            conds.push(format!("(t.created_by = ${n} OR t.assigned_to = ${n})"));
        }
        if self.status.is_some() {
            n += 1;
            conds.push(format!("t.status = ${n}"));
        }
        if self.priority.is_some() {
            n += 1;
            conds.push(format!("t.priority = ${n}"));
        }
        if self.created_by.is_some() {
            n += 1;
            conds.push(format!("t.created_by = ${n}"));
        }
        if self.assigned_to.is_some() {
            n += 1;
            conds.push(format!("t.assigned_to = ${n}"));
        }
        if self.search_pattern().is_some() {
            n += 1;
            conds.push(format!("(t.title ILIKE ${n} OR t.description ILIKE ${n})"));
        }

        if conds.is_empty() {
            (String::new(), n)
        } else {
            (format!(" WHERE {}", conds.join(" AND ")), n)
        }
    }
}

/// Page metadata returned alongside task lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-indexed page number
    pub page: i64,

    /// Page size
    pub limit: i64,

    /// Total matching tasks across all pages
    pub total: i64,

    /// ceil(total / limit)
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// A page of resolved tasks
#[derive(Debug, Clone)]
pub struct TaskPage {
    pub tasks: Vec<TaskView>,
    pub pagination: Pagination,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, priority, due_date,
                               created_for, created_by, assigned_to)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, status, priority, due_date,
                      created_for, created_by, assigned_to, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.created_for)
        .bind(data.created_by)
        .bind(data.assigned_to)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID (raw row, no user resolution)
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, due_date,
                   created_for, created_by, assigned_to, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID with owner/assignee resolved
    pub async fn find_view_by_id(pool: &PgPool, id: Uuid) -> Result<Option<TaskView>, sqlx::Error> {
        let sql = format!("{VIEW_SELECT} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TaskViewRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskView::from))
    }

    /// Lists tasks matching a filter, with pagination metadata
    ///
    /// Runs a count query and a page query over the same WHERE clause.
    /// The search condition is ANDed with the visibility scope, so a
    /// non-admin search never widens beyond owner-or-assignee tasks.
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<TaskPage, sqlx::Error> {
        let (where_sql, n) = filter.where_clause();
        let pattern = filter.search_pattern();
        let offset = (filter.page - 1) * filter.limit;

        let count_sql = format!("SELECT COUNT(*) FROM tasks t{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        if let ListScope::VisibleTo(uid) = filter.scope {
            count_q = count_q.bind(uid);
        }
        if let Some(status) = filter.status {
            count_q = count_q.bind(status);
        }
        if let Some(priority) = filter.priority {
            count_q = count_q.bind(priority);
        }
        if let Some(created_by) = filter.created_by {
            count_q = count_q.bind(created_by);
        }
        if let Some(assigned_to) = filter.assigned_to {
            count_q = count_q.bind(assigned_to);
        }
        if let Some(ref pattern) = pattern {
            count_q = count_q.bind(pattern.clone());
        }
        let total = count_q.fetch_one(pool).await?;

        let select_sql = format!(
            "{VIEW_SELECT}{where_sql} ORDER BY t.{} {} LIMIT ${} OFFSET ${}",
            filter.sort_by.column(),
            filter.sort_dir.sql(),
            n + 1,
            n + 2,
        );
        let mut select_q = sqlx::query_as::<_, TaskViewRow>(&select_sql);
        if let ListScope::VisibleTo(uid) = filter.scope {
            select_q = select_q.bind(uid);
        }
        if let Some(status) = filter.status {
            select_q = select_q.bind(status);
        }
        if let Some(priority) = filter.priority {
            select_q = select_q.bind(priority);
        }
        if let Some(created_by) = filter.created_by {
            select_q = select_q.bind(created_by);
        }
        if let Some(assigned_to) = filter.assigned_to {
            select_q = select_q.bind(assigned_to);
        }
        if let Some(pattern) = pattern {
            select_q = select_q.bind(pattern);
        }
        let rows = select_q
            .bind(filter.limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(TaskPage {
            tasks: rows.into_iter().map(TaskView::from).collect(),
            pagination: Pagination::new(filter.page, filter.limit, total),
        })
    }

    /// Lists tasks planned for a single UTC day window
    ///
    /// The window is half-open: `start <= created_for < end`. Results are
    /// always ordered by creation time descending.
    pub async fn list_for_day(
        pool: &PgPool,
        scope: ListScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TaskView>, sqlx::Error> {
        let rows = match scope {
            ListScope::All => {
                let sql = format!(
                    "{VIEW_SELECT} WHERE t.created_for >= $1 AND t.created_for < $2 \
                     ORDER BY t.created_at DESC"
                );
                sqlx::query_as::<_, TaskViewRow>(&sql)
                    .bind(start)
                    .bind(end)
                    .fetch_all(pool)
                    .await?
            }
            ListScope::VisibleTo(uid) => {
                let sql = format!(
                    "{VIEW_SELECT} WHERE t.created_for >= $1 AND t.created_for < $2 \
                     AND (t.created_by = $3 OR t.assigned_to = $3) \
                     ORDER BY t.created_at DESC"
                );
                sqlx::query_as::<_, TaskViewRow>(&sql)
                    .bind(start)
                    .bind(end)
                    .bind(uid)
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(TaskView::from).collect())
    }

    /// Applies a partial update
    ///
    /// Builds a dynamic SET clause from the present fields; `updated_at`
    /// is always touched. Returns the updated row, or None if the task
    /// no longer exists (e.g. a concurrent delete won the race).
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        if changes.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if changes.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${bind_count}"));
        }
        if changes.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${bind_count}"));
        }
        if changes.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${bind_count}"));
        }
        if changes.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${bind_count}"));
        }
        if changes.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${bind_count}"));
        }
        if changes.created_for.is_some() {
            bind_count += 1;
            query.push_str(&format!(", created_for = ${bind_count}"));
        }
        if changes.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${bind_count}"));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, status, priority, due_date, \
             created_for, created_by, assigned_to, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = changes.title {
            q = q.bind(title);
        }
        if let Some(description) = changes.description {
            q = q.bind(description);
        }
        if let Some(status) = changes.status {
            q = q.bind(status);
        }
        if let Some(priority) = changes.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = changes.due_date {
            q = q.bind(due_date);
        }
        if let Some(created_for) = changes.created_for {
            q = q.bind(created_for);
        }
        if let Some(assigned_to) = changes.assigned_to {
            q = q.bind(assigned_to);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Hard-deletes a task
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
