/// Task endpoints
///
/// Task CRUD, filtered/paginated lists, and the planner day views keyed
/// by an 8-digit `YYYYMMDD` date token.
///
/// # Endpoints
///
/// - `GET    /api/tasks` - Visible tasks, filtered and paginated
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks/admin/all` - Every task (admin only)
/// - `GET    /api/tasks/dashboard/:date` - Tasks planned for one day
/// - `POST   /api/tasks/create/:date` - Create a task on a specific day
/// - `GET    /api/tasks/:id` - Single task
/// - `PUT    /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete
///
/// Per-task access (get/update/delete) goes through the shared policy:
/// admins, owners, and assignees pass; everyone else gets 403.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::SecondsFormat;
use planboard_shared::{
    auth::{context::AuthContext, policy},
    dates,
    models::task::{
        CreateTask, ListScope, Pagination, SortDir, SortField, Task, TaskChanges, TaskFilter,
        TaskPriority, TaskStatus, TaskView,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create request
///
/// Date fields arrive as strings: full ISO-8601 datetimes or bare
/// `YYYY-MM-DD` dates. Empty strings count as absent.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 3, max = 100, message = "Title must be 3-100 characters"))]
    pub title: String,

    #[validate(length(min = 5, max = 1000, message = "Description must be 5-1000 characters"))]
    pub description: String,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    /// Optional deadline
    pub due_date: Option<String>,

    /// The planner day; required on `POST /api/tasks`, ignored on the
    /// date-keyed create route where the URL token wins
    pub created_for: Option<String>,

    /// Assignee id; empty string means unassigned
    pub assigned_to: Option<String>,
}

/// Partial update request
///
/// Absent fields leave the stored value untouched. `assignedTo` accepts
/// an empty string to clear the assignee. `createdFor` can be changed
/// but an empty string is ignored rather than clearing it.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 3, max = 100, message = "Title must be 3-100 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 5, max = 1000, message = "Description must be 5-1000 characters"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<String>,
    pub created_for: Option<String>,
    pub assigned_to: Option<String>,
}

/// List query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_dir: Option<SortDir>,

    /// Owner filter; honored only for the admin list
    pub created_by: Option<Uuid>,

    /// Assignee filter; honored only for the admin list
    pub assigned_to: Option<Uuid>,
}

impl TaskListQuery {
    /// Builds a database filter for the given visibility scope
    ///
    /// Page numbers below 1 are coerced to 1 and the page size is
    /// clamped to 1-100. The explicit owner/assignee filters only apply
    /// under the unrestricted scope; regular callers cannot use them to
    /// widen visibility.
    fn into_filter(self, scope: ListScope) -> TaskFilter {
        let mut filter = TaskFilter::for_scope(scope);
        filter.page = self.page.unwrap_or(1).max(1);
        filter.limit = self.limit.unwrap_or(10).clamp(1, 100);
        filter.status = self.status;
        filter.priority = self.priority;
        filter.search = self.search;
        filter.sort_by = self.sort_by.unwrap_or_default();
        filter.sort_dir = self.sort_dir.unwrap_or_default();

        if scope == ListScope::All {
            filter.created_by = self.created_by;
            filter.assigned_to = self.assigned_to;
        }

        filter
    }
}

/// A page of tasks plus pagination metadata
#[derive(Debug, Serialize)]
pub struct TaskListData {
    pub tasks: Vec<TaskView>,
    pub pagination: Pagination,
}

/// Planner day view payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub tasks: Vec<TaskView>,

    /// The day token as requested, e.g. "20250615"
    pub date: String,

    /// Start of the requested day as an ISO-8601 UTC instant
    pub formatted_date: String,
}

/// Response payload for the date-keyed create route
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTaskData {
    pub task: TaskView,

    /// The day token as requested
    pub date: String,

    /// Start of the requested day as an ISO-8601 UTC instant
    pub formatted_date: String,
}

/// The visibility scope for a caller: admins see everything
fn scope_for(auth: &AuthContext) -> ListScope {
    if auth.is_admin() {
        ListScope::All
    } else {
        ListScope::VisibleTo(auth.user_id)
    }
}

/// Parses a task id path segment
fn parse_task_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::BadRequest("Invalid task id".to_string()))
}

/// Parses an assignee field: absent or empty means unassigned
fn parse_assignee(value: Option<&str>) -> ApiResult<Option<Uuid>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| ApiError::BadRequest("Invalid assignedTo id".to_string())),
    }
}

/// List tasks visible to the caller
///
/// Regular users see tasks they own or are assigned to; admins see
/// everything. Search is ANDed with that visibility, never widening it.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<ApiResponse<TaskListData>>> {
    let filter = query.into_filter(scope_for(&auth));
    let page = Task::list(&state.db, &filter).await?;

    Ok(ApiResponse::ok(
        "Tasks retrieved",
        TaskListData {
            tasks: page.tasks,
            pagination: page.pagination,
        },
    ))
}

/// List every task regardless of ownership (admin only)
///
/// The role check happens in middleware; this handler always runs with
/// the unrestricted scope and honors the owner/assignee filters.
pub async fn admin_list_tasks(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<ApiResponse<TaskListData>>> {
    let filter = query.into_filter(ListScope::All);
    let page = Task::list(&state.db, &filter).await?;

    Ok(ApiResponse::ok(
        "Tasks retrieved",
        TaskListData {
            tasks: page.tasks,
            pagination: page.pagination,
        },
    ))
}

/// Create a task
///
/// `createdFor` is mandatory here: a task always belongs to a planner
/// day. The caller becomes the owner.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TaskView>>)> {
    req.validate()?;

    let created_for = dates::parse_optional_datetime(req.created_for.as_deref())?
        .ok_or_else(|| ApiError::BadRequest("createdFor is required".to_string()))?;
    let due_date = dates::parse_optional_datetime(req.due_date.as_deref())?;
    let assigned_to = parse_assignee(req.assigned_to.as_deref())?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
            due_date,
            created_for,
            created_by: auth.user_id,
            assigned_to,
        },
    )
    .await?;

    let view = Task::find_view_by_id(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Created task disappeared".to_string()))?;

    tracing::debug!(task_id = %task.id, user_id = %auth.user_id, "Task created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Task created successfully", view),
    ))
}

/// Create a task on a specific planner day
///
/// The URL day token is authoritative: any `createdFor` in the payload
/// is ignored and the task lands at midnight UTC of the given day.
pub async fn create_task_for_date(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<String>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<DayTaskData>>)> {
    let day = dates::parse_day_token(&date)?;
    let (start, _) = dates::day_window(day);

    req.validate()?;

    let due_date = dates::parse_optional_datetime(req.due_date.as_deref())?;
    let assigned_to = parse_assignee(req.assigned_to.as_deref())?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
            due_date,
            created_for: start,
            created_by: auth.user_id,
            assigned_to,
        },
    )
    .await?;

    let view = Task::find_view_by_id(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Created task disappeared".to_string()))?;

    tracing::debug!(task_id = %task.id, day = %day, "Task created for day");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(
            "Task created successfully",
            DayTaskData {
                task: view,
                date,
                formatted_date: start.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        ),
    ))
}

/// Tasks planned for one day
///
/// The window is the half-open UTC day [00:00, next day 00:00), matched
/// against `createdFor`. Visibility rules are the same as the main list.
pub async fn dashboard_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<String>,
) -> ApiResult<Json<ApiResponse<DashboardData>>> {
    let day = dates::parse_day_token(&date)?;
    let (start, end) = dates::day_window(day);

    let tasks = Task::list_for_day(&state.db, scope_for(&auth), start, end).await?;

    Ok(ApiResponse::ok(
        "Tasks retrieved",
        DashboardData {
            tasks,
            date,
            formatted_date: start.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    ))
}

/// Get a single task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<TaskView>>> {
    let task_id = parse_task_id(&id)?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let access = policy::task_access(&auth, &task);
    if !access.can_read {
        return Err(ApiError::Forbidden(
            "You do not have access to this task".to_string(),
        ));
    }

    let view = Task::find_view_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(ApiResponse::ok("Task retrieved", view))
}

/// Partially update a task
///
/// `assignedTo: ""` clears the assignee; omitting it keeps the current
/// one. `createdFor` can move the task to another day but is never
/// cleared. Ownership (`createdBy`) is immutable.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<ApiResponse<TaskView>>> {
    let task_id = parse_task_id(&id)?;
    req.validate()?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let access = policy::task_access(&auth, &task);
    if !access.can_write {
        return Err(ApiError::Forbidden(
            "You do not have access to this task".to_string(),
        ));
    }

    // Tri-state assignee: absent keeps, "" clears, an id replaces
    let assigned_to = match req.assigned_to.as_deref().map(str::trim) {
        None => None,
        Some("") => Some(None),
        Some(s) => Some(Some(Uuid::parse_str(s).map_err(|_| {
            ApiError::BadRequest("Invalid assignedTo id".to_string())
        })?)),
    };

    let changes = TaskChanges {
        title: req.title,
        description: req.description,
        status: req.status,
        priority: req.priority,
        due_date: dates::parse_optional_datetime(req.due_date.as_deref())?,
        created_for: dates::parse_optional_datetime(req.created_for.as_deref())?,
        assigned_to,
    };

    let updated = Task::update(&state.db, task_id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let view = Task::find_view_by_id(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::debug!(task_id = %task_id, user_id = %auth.user_id, "Task updated");

    Ok(ApiResponse::ok("Task updated successfully", view))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let task_id = parse_task_id(&id)?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let access = policy::task_access(&auth, &task);
    if !access.can_write {
        return Err(ApiError::Forbidden(
            "You do not have access to this task".to_string(),
        ));
    }

    let deleted = Task::delete(&state.db, task_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::debug!(task_id = %task_id, user_id = %auth.user_id, "Task deleted");

    Ok(ApiResponse::message("Task deleted successfully"))
}
