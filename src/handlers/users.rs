use axum::{extract::State, http::HeaderMap};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiResult, Validator, normalize_categories, ok};
use crate::{
    AppState,
    auth::{
        AuthUser,
        gate::bearer_token,
        password::{hash_secret_blocking, verify_secret_blocking},
    },
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    models::{
        AuthResponse, LoginRequest, NewUser, RegisterUserRequest, Role, UpdateUserRequest, User,
        UserCategoryRequest, UserProfile,
    },
};

const MIN_PASSWORD_LEN: usize = 6;

/// UserFilter
///
/// Query parameters for the admin user listing (GET /user).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserFilter {
    /// Case-insensitive substring of the first or last name.
    pub name: Option<String>,
}

fn issue_for(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let token = state.tokens.issue(user.id, &user.username, user.role)?;
    Ok(AuthResponse {
        user: user.into(),
        token: Some(token),
    })
}

/// register
///
/// [Public Route] Creates an account and returns it together with a token, so
/// the client is logged in right away. The password is hashed off the async
/// executor. A taken username or email answers 409. Asking for the `admin`
/// role requires an administrator's bearer token.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Registered", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Only administrators can create administrators"),
        (status = 409, description = "Username or email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<RegisterUserRequest>,
) -> ApiResult<AuthResponse> {
    Validator::new()
        .required("username", &payload.username)
        .alphanumeric("username", &payload.username)
        .required("first_name", &payload.first_name)
        .required("last_name", &payload.last_name)
        .required("email", &payload.email)
        .email("email", &payload.email)
        .required("city", &payload.city)
        .min_len("password", &payload.password, MIN_PASSWORD_LEN)
        .finish()?;

    if payload.role == Some(Role::Admin) {
        let caller_is_admin = bearer_token(&headers)
            .and_then(|token| state.tokens.verify(token).ok())
            .is_some_and(|claims| claims.role == Role::Admin);
        if !caller_is_admin {
            return Err(AppError::Forbidden(
                "Only administrators can create administrator accounts",
            ));
        }
    }

    if state.repo.find_user_by_username(&payload.username).await?.is_some() {
        return Err(AppError::Conflict("Username already used".to_string()));
    }
    if state.repo.find_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email already used".to_string()));
    }

    let password_hash = hash_secret_blocking(payload.password).await?;
    let user = state
        .repo
        .create_user(NewUser {
            username: payload.username,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            city: payload.city,
            password_hash,
            role: payload.role.unwrap_or_default(),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    ok("Account has been registered", issue_for(&state, user)?)
}

/// login
///
/// [Public Route] Exchanges username and password for a token. Unknown users
/// and wrong passwords get the same 401 answer.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    Validator::new()
        .required("username", &payload.username)
        .min_len("password", &payload.password, MIN_PASSWORD_LEN)
        .finish()?;

    const INVALID: &str = "Invalid username or password";

    let Some(user) = state.repo.find_user_by_username(&payload.username).await? else {
        tracing::debug!(username = %payload.username, "login for unknown username");
        return Err(AppError::Unauthorized(INVALID));
    };

    if !verify_secret_blocking(payload.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "login with wrong password");
        return Err(AppError::Unauthorized(INVALID));
    }

    ok("Successfully logged in", issue_for(&state, user)?)
}

/// logout
///
/// [Public Route] Tokens are stateless and not revoked; the client discards its copy.
#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout() -> ApiResult<()> {
    ok("Successfully logged out", ())
}

/// me
///
/// [Authenticated Route] The caller's own profile.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me(user: AuthUser, State(state): State<AppState>) -> ApiResult<UserProfile> {
    let profile = state
        .repo
        .get_user(user.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    ok("Profile", profile.into())
}

/// set_categories
///
/// [Authenticated Route] Replaces the caller's preferred destination categories.
/// Names are stored upper-cased, so later matching is case-insensitive.
#[utoipa::path(
    post,
    path = "/user/category",
    request_body = UserCategoryRequest,
    responses((status = 200, description = "Categories saved", body = UserProfile))
)]
pub async fn set_categories(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserCategoryRequest>,
) -> ApiResult<UserProfile> {
    let categories = normalize_categories(&payload.category);
    Validator::new()
        .check(!categories.is_empty(), "category must contain at least one value")
        .finish()?;

    let updated = state
        .repo
        .set_user_categories(user.id, categories)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    ok("Categories saved", updated.into())
}

/// list_users
///
/// [Admin Route] Lists users, optionally filtered by name.
#[utoipa::path(
    get,
    path = "/user",
    params(UserFilter),
    responses((status = 200, description = "Users", body = [UserProfile]))
)]
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<UserFilter>,
) -> ApiResult<Vec<UserProfile>> {
    let users = state.repo.list_users(filter.name).await?;
    ok("List of users", users.into_iter().map(UserProfile::from).collect())
}

/// get_user
///
/// [Authenticated Route] Profile of any user by id.
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = UserProfile),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<UserProfile> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    ok("User detail", user.into())
}

/// update_user
///
/// [Authenticated Route] Profile edit, allowed on one's own account or by an
/// administrator. Only administrators may change a role. An owner editing
/// their own profile gets a fresh token; an administrator editing someone
/// else gets the profile only.
#[utoipa::path(
    put,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = AuthResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Username or email already used")
    )
)]
pub async fn update_user(
    caller: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> ApiResult<AuthResponse> {
    if caller.id != id && !caller.is_admin() {
        return Err(AppError::Forbidden("You can only edit your own profile"));
    }

    let mut validator = Validator::new();
    validator
        .required("username", &payload.username)
        .alphanumeric("username", &payload.username)
        .required("first_name", &payload.first_name)
        .required("last_name", &payload.last_name)
        .required("email", &payload.email)
        .email("email", &payload.email)
        .required("city", &payload.city);
    if let Some(password) = &payload.password {
        validator.min_len("password", password, MIN_PASSWORD_LEN);
    }
    validator.finish()?;

    let current = state
        .repo
        .get_user(id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let role = match payload.role {
        Some(role) if role != current.role && !caller.is_admin() => {
            return Err(AppError::Forbidden("Only administrators can change roles"));
        }
        Some(role) => role,
        None => current.role,
    };

    if let Some(other) = state.repo.find_user_by_username(&payload.username).await? {
        if other.id != id {
            return Err(AppError::Conflict("Username already used".to_string()));
        }
    }
    if let Some(other) = state.repo.find_user_by_email(&payload.email).await? {
        if other.id != id {
            return Err(AppError::Conflict("Email already used".to_string()));
        }
    }

    let password_hash = match payload.password {
        Some(password) => hash_secret_blocking(password).await?,
        None => current.password_hash.clone(),
    };

    let updated = state
        .repo
        .update_user(User {
            username: payload.username,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            city: payload.city,
            phone_number: Some(payload.phone_number).filter(|p| !p.trim().is_empty()),
            gender: Some(payload.gender).filter(|g| !g.trim().is_empty()),
            password_hash,
            role,
            ..current
        })
        .await?;

    if caller.id != id {
        tracing::info!(admin_id = %caller.id, user_id = %id, "administrator edited a user");
        return ok(
            "User updated",
            AuthResponse {
                user: updated.into(),
                token: None,
            },
        );
    }
    ok("User updated", issue_for(&state, updated)?)
}

/// delete_user
///
/// [Admin Route] Removes a user together with their routes and view records.
#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<()> {
    if !state.repo.delete_user(id).await? {
        return Err(AppError::NotFound("User"));
    }
    tracing::info!(user_id = %id, "user deleted");
    ok("User deleted", ())
}
