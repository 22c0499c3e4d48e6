//! User handlers.

use actix_web::{HttpResponse, web};

use roster_core::RepoError;
use roster_core::domain::{User, UserId};
use roster_shared::ApiResponse;
use roster_shared::dto::{CreateUserRequest, ResetPasswordRequest, UserIdsQuery};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn parse_id(raw: &str) -> AppResult<UserId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid user id: {}", raw)))
}

/// Ok when the lookup missed, Conflict when it hit.
fn ensure_free(lookup: Result<User, RepoError>, what: &str) -> AppResult<()> {
    match lookup {
        Ok(_) => Err(AppError::Conflict(format!("{} already taken", what))),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/users
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username must not be empty".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".to_string()));
    }

    let users = state.users();
    ensure_free(users.find_by_email(&req.email).await, "Email")?;
    ensure_free(users.find_by_username(&req.username).await, "Username")?;

    // bcrypt is CPU bound
    let passwords = state.passwords.clone();
    let user = web::block(move || {
        User::new(req.email, req.username, &req.password, passwords.as_ref())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let saved = users.save(user).await?;
    tracing::info!(user_id = %saved.id(), "User created");

    let profile = users.hydrate(vec![saved]).pop();
    Ok(HttpResponse::Created().json(ApiResponse::ok(profile)))
}

/// GET /api/users?ids=<id>,<id>
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<UserIdsQuery>,
) -> AppResult<HttpResponse> {
    let ids = query
        .split()
        .map(parse_id)
        .collect::<AppResult<Vec<_>>>()?;

    let users = state.users().find_by_ids(&ids).await?;
    let profiles = state.users().hydrate(users);

    Ok(HttpResponse::Ok().json(ApiResponse::ok(profiles)))
}

/// GET /api/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let user = state.users().find_by_id(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(state.users().hydrate(vec![user]).pop())))
}

/// GET /api/users/by-username/{username}
pub async fn get_user_by_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state.users().find_by_username(&path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(state.users().hydrate(vec![user]).pop())))
}

/// PUT /api/users/{id}/password
pub async fn reset_password(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let req = body.into_inner();
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".to_string()));
    }

    let mut user = state.users().find_by_id(id).await?;

    let passwords = state.passwords.clone();
    let user = web::block(move || {
        user.set_password(&req.password, passwords.as_ref())
            .map(|_| user)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    state.users().save(user).await?;
    tracing::info!(user_id = %id, "Password reset");

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.users().delete(id).await?;

    Ok(HttpResponse::NoContent().finish())
}
