/// Integration tests for the Planboard API
///
/// These tests verify the full system end-to-end over a real database:
/// - Registration, login, and session enforcement
/// - Task lifecycle with owner/assignee/admin access control
/// - Planner day views and the YYYYMMDD token rules
/// - Filtering, search visibility, and pagination
///
/// Tests skip (with a note on stderr) when DATABASE_URL is not set.

mod common;

use axum::http::StatusCode;
use common::{create_task, register_user, request, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (status, body) = request(&ctx.app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], "connected");
}

#[tokio::test]
async fn test_register_strips_password_hash() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, user) = register_user(&ctx.app, "user").await;

    assert_eq!(user["role"], "user");
    assert!(user.get("passwordHash").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, user) = register_user(&ctx.app, "user").await;
    let email = user["email"].as_str().unwrap();

    // Same email with different case must still conflict
    let (status, body) = request(
        &ctx.app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Imposter",
            "email": email.to_uppercase(),
            "password": "Password1",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (status, body) = request(
        &ctx.app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Weak",
            "email": "weak@example.com",
            "password": "alllowercase",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_array());
}

#[tokio::test]
async fn test_login_round_trip() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, user) = register_user(&ctx.app, "user").await;
    let email = user["email"].as_str().unwrap();

    let (status, body) = request(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "Password1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["user"].get("passwordHash").is_none());

    // Wrong password and unknown email produce the same message
    let (status, wrong) = request(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "WrongPass1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = request(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "nobody@example.com", "password": "WrongPass1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["message"], unknown["message"]);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (status, _) = request(&ctx.app, "GET", "/api/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&ctx.app, "GET", "/api/auth/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_returns_current_user() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, user) = register_user(&ctx.app, "user").await;

    let (status, body) = request(&ctx.app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user["id"]);
    assert_eq!(body["data"]["email"], user["email"]);
}

#[tokio::test]
async fn test_update_password_flow() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, user) = register_user(&ctx.app, "user").await;
    let email = user["email"].as_str().unwrap();

    // Wrong current password
    let (status, _) = request(
        &ctx.app,
        "PUT",
        "/api/auth/update-password",
        Some(&token),
        Some(json!({
            "currentPassword": "NotThePassword1",
            "newPassword": "NewPassword2",
            "confirmPassword": "NewPassword2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Mismatched confirmation
    let (status, _) = request(
        &ctx.app,
        "PUT",
        "/api/auth/update-password",
        Some(&token),
        Some(json!({
            "currentPassword": "Password1",
            "newPassword": "NewPassword2",
            "confirmPassword": "SomethingElse3",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Successful change
    let (status, _) = request(
        &ctx.app,
        "PUT",
        "/api/auth/update-password",
        Some(&token),
        Some(json!({
            "currentPassword": "Password1",
            "newPassword": "NewPassword2",
            "confirmPassword": "NewPassword2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works, new one does
    let (status, _) = request(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "Password1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "NewPassword2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_password_accepts_unchanged_password() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, user) = register_user(&ctx.app, "user").await;
    let email = user["email"].as_str().unwrap();

    // Re-submitting the current password as the new one is a valid
    // request: it re-verifies, re-hashes, and persists
    let (status, body) = request(
        &ctx.app,
        "PUT",
        "/api/auth/update-password",
        Some(&token),
        Some(json!({
            "currentPassword": "Password1",
            "newPassword": "Password1",
            "confirmPassword": "Password1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {}", body);

    let (status, _) = request(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "Password1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_task_requires_created_for() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, _) = register_user(&ctx.app, "user").await;

    for created_for in [json!(null), json!("")] {
        let (status, body) = request(
            &ctx.app,
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({
                "title": "Missing day",
                "description": "No planner day given",
                "createdFor": created_for,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("createdFor"));
    }
}

#[tokio::test]
async fn test_create_task_defaults_and_date_promotion() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, user) = register_user(&ctx.app, "user").await;
    let task = create_task(&ctx.app, &token, "Plan sprint", "2025-06-15").await;

    assert_eq!(task["status"], "todo");
    assert_eq!(task["priority"], "medium");
    // Bare date promoted to midnight UTC
    assert!(task["createdFor"]
        .as_str()
        .unwrap()
        .starts_with("2025-06-15T00:00:00"));
    assert_eq!(task["createdBy"]["id"], user["id"]);
    assert!(task["assignedTo"].is_null());
}

#[tokio::test]
async fn test_create_task_validation_errors() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, _) = register_user(&ctx.app, "user").await;

    let (status, body) = request(
        &ctx.app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({
            "title": "ab",
            "description": "1234",
            "createdFor": "2025-06-15",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["error"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
}

#[tokio::test]
async fn test_task_access_control() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (owner_token, _) = register_user(&ctx.app, "user").await;
    let (stranger_token, _) = register_user(&ctx.app, "user").await;
    let (admin_token, _) = register_user(&ctx.app, "admin").await;
    let (assignee_token, assignee) = register_user(&ctx.app, "user").await;

    let task = create_task(&ctx.app, &owner_token, "Private task", "2025-06-15").await;
    let task_uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    // Stranger: 403 on read and write
    let (status, _) = request(&ctx.app, "GET", &task_uri, Some(&stranger_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = request(&ctx.app, "DELETE", &task_uri, Some(&stranger_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Owner and admin can read
    let (status, _) = request(&ctx.app, "GET", &task_uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(&ctx.app, "GET", &task_uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Assign the stranger-free task to the fourth user; they gain access
    let (status, _) = request(
        &ctx.app,
        "PUT",
        &task_uri,
        Some(&owner_token),
        Some(json!({"assignedTo": assignee["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&ctx.app, "GET", &task_uri, Some(&assignee_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assignedTo"]["id"], assignee["id"]);
}

#[tokio::test]
async fn test_update_semantics() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, user) = register_user(&ctx.app, "user").await;
    let task = create_task(&ctx.app, &token, "Evolving task", "2025-06-15").await;
    let task_uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());
    let original_created_for = task["createdFor"].clone();

    // Partial update leaves untouched fields alone, including createdFor
    let (status, body) = request(
        &ctx.app,
        "PUT",
        &task_uri,
        Some(&token),
        Some(json!({"status": "in_progress", "priority": "high"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["priority"], "high");
    assert_eq!(body["data"]["title"], "Evolving task");
    assert_eq!(body["data"]["createdFor"], original_created_for);

    // Set then clear the assignee via empty string
    let (status, body) = request(
        &ctx.app,
        "PUT",
        &task_uri,
        Some(&token),
        Some(json!({"assignedTo": user["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assignedTo"]["id"], user["id"]);

    let (status, body) = request(
        &ctx.app,
        "PUT",
        &task_uri,
        Some(&token),
        Some(json!({"assignedTo": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["assignedTo"].is_null());

    // createdFor can move to another day
    let (status, body) = request(
        &ctx.app,
        "PUT",
        &task_uri,
        Some(&token),
        Some(json!({"createdFor": "2025-06-20"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["createdFor"]
        .as_str()
        .unwrap()
        .starts_with("2025-06-20"));
}

#[tokio::test]
async fn test_task_id_parsing() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, _) = register_user(&ctx.app, "user").await;

    let (status, _) = request(&ctx.app, "GET", "/api/tasks/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &ctx.app,
        "GET",
        "/api/tasks/00000000-0000-0000-0000-000000000000",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_day_window() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, _) = register_user(&ctx.app, "user").await;

    // Create on a specific day via the date-keyed route; the token wins
    // over any payload date
    let (status, created) = request(
        &ctx.app,
        "POST",
        "/api/tasks/create/20250615",
        Some(&token),
        Some(json!({
            "title": "Day-pinned task",
            "description": "Created through the day route",
            "createdFor": "2030-01-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["date"], "20250615");
    assert_eq!(created["data"]["formattedDate"], "2025-06-15T00:00:00.000Z");
    assert!(created["data"]["task"]["createdFor"]
        .as_str()
        .unwrap()
        .starts_with("2025-06-15T00:00:00"));
    let task_id = created["data"]["task"]["id"].clone();

    // Visible on that day's dashboard
    let (status, body) = request(
        &ctx.app,
        "GET",
        "/api/tasks/dashboard/20250615",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["date"], "20250615");
    assert_eq!(body["data"]["formattedDate"], "2025-06-15T00:00:00.000Z");
    let tasks = body["data"]["tasks"].as_array().unwrap();
    assert!(tasks.iter().any(|t| t["id"] == task_id));

    // Absent on the next day
    let (status, body) = request(
        &ctx.app,
        "GET",
        "/api/tasks/dashboard/20250616",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body["data"]["tasks"].as_array().unwrap();
    assert!(!tasks.iter().any(|t| t["id"] == task_id));
}

#[tokio::test]
async fn test_dashboard_rejects_bad_tokens() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, _) = register_user(&ctx.app, "user").await;

    for bad in ["2025061", "202506155", "2025-6-1", "20250230"] {
        let (status, _) = request(
            &ctx.app,
            "GET",
            &format!("/api/tasks/dashboard/{}", bad),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "token {:?}", bad);
    }
}

#[tokio::test]
async fn test_list_pagination() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, _) = register_user(&ctx.app, "user").await;

    for i in 0..12 {
        create_task(&ctx.app, &token, &format!("Paged task {}", i), "2025-06-15").await;
    }

    let (status, body) = request(
        &ctx.app,
        "GET",
        "/api/tasks?page=2&limit=5",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["page"], 2);
    assert_eq!(pagination["limit"], 5);
    assert_eq!(pagination["total"], 12);
    assert_eq!(pagination["pages"], 3);
    assert_eq!(body["data"]["tasks"].as_array().unwrap().len(), 5);

    // Page 3 has the remainder
    let (_, body) = request(
        &ctx.app,
        "GET",
        "/api/tasks?page=3&limit=5",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["tasks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_filters_and_search_visibility() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, _) = register_user(&ctx.app, "user").await;
    let (other_token, _) = register_user(&ctx.app, "user").await;

    create_task(&ctx.app, &token, "Find the zebra", "2025-06-15").await;
    create_task(&ctx.app, &other_token, "Another zebra sighting", "2025-06-15").await;

    // Search is ANDed with visibility: only the caller's task matches
    let (status, body) = request(
        &ctx.app,
        "GET",
        "/api/tasks?search=zebra",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body["data"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Find the zebra");

    // Status filter
    let (_, body) = request(
        &ctx.app,
        "GET",
        "/api/tasks?status=done",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["tasks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_admin_list_requires_admin_role() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (user_token, _) = register_user(&ctx.app, "user").await;
    let (admin_token, _) = register_user(&ctx.app, "admin").await;

    let (status, _) = request(
        &ctx.app,
        "GET",
        "/api/tasks/admin/all",
        Some(&user_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &ctx.app,
        "GET",
        "/api/tasks/admin/all",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["tasks"].is_array());
}

#[tokio::test]
async fn test_delete_task() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, _) = register_user(&ctx.app, "user").await;
    let task = create_task(&ctx.app, &token, "Short-lived task", "2025-06-15").await;
    let task_uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let (status, body) = request(&ctx.app, "DELETE", &task_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = request(&ctx.app, "GET", &task_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
