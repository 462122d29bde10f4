/// Authentication endpoints
///
/// Registration, login, profile lookup, and password changes. Sessions
/// are stateless bearer tokens; there is no refresh or logout endpoint,
/// an expired token simply means logging in again.
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new account
/// - `POST /api/auth/login` - Login and get a session token
/// - `GET /api/auth/profile` - Current account (authenticated)
/// - `PUT /api/auth/update-password` - Change password (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use planboard_shared::{
    auth::{context::AuthContext, jwt, password},
    models::user::{CreateUser, PublicUser, Role, User},
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (complexity checked below)
    #[validate(custom(function = "password_complexity"))]
    pub password: String,

    /// Optional role; defaults to a regular user
    pub role: Option<Role>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// Current password, re-verified before any change
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    /// New password (complexity checked below)
    #[validate(custom(function = "password_complexity"))]
    pub new_password: String,

    /// Must repeat the new password exactly
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Session payload: the account plus its bearer token
#[derive(Debug, Serialize)]
pub struct SessionData {
    pub user: PublicUser,
    pub token: String,
}

/// Validator hook for the shared complexity rules
fn password_complexity(password: &str) -> Result<(), ValidationError> {
    password::validate_password_complexity(password).map_err(|msg| {
        let mut err = ValidationError::new("password_complexity");
        err.message = Some(msg.into());
        err
    })
}

/// Register a new account
///
/// Emails are normalized to lowercase before the uniqueness check, so
/// `User@Example.com` and `user@example.com` are the same account.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SessionData>>)> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();

    // Friendly pre-check; the unique constraint still backstops races
    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name.trim().to_string(),
            email,
            password_hash,
            role: req.role.unwrap_or_default(),
        },
    )
    .await?;

    let claims = jwt::Claims::new(user.id, user.email.clone(), user.role);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "New account registered");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(
            "User registered successfully",
            SessionData {
                user: user.into(),
                token,
            },
        ),
    ))
}

/// Login with email and password
///
/// Unknown email and wrong password produce the same 401 message, so
/// the response never reveals which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<SessionData>>> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = jwt::Claims::new(user.id, user.email.clone(), user.role);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(ApiResponse::ok(
        "Login successful",
        SessionData {
            user: user.into(),
            token,
        },
    ))
}

/// Current account profile
///
/// The session token carries identity, but the profile is always read
/// fresh from the database; a deleted account gets 404 even with a
/// still-valid token.
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ApiResponse<PublicUser>>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok("Profile retrieved", user.into()))
}

/// Change the current account's password
///
/// Requires the current password; existing session tokens stay valid
/// until they expire.
pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    req.validate()?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let valid = password::verify_password(&req.current_password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = password::hash_password(&req.new_password)?;
    let updated = User::update_password_hash(&state.db, user.id, &new_hash).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(ApiResponse::message("Password updated successfully"))
}
