use crate::{
    api::run_blocking,
    auth::{auth::AdminUser, jwt::generate_access_token, password::verify_admin_password},
    config::Config,
    error::AppError,
    models::{LoginReqDto, LoginResponse},
    store::RecordStore,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, info, instrument};

/// Admin login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<RecordStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(AppError::Validation("Username and password are required".into()));
    }

    debug!("Verifying credentials");
    if user.username != config.admin_username
        || !verify_admin_password(&user.password, &config.admin_password_hash)
    {
        info!("Invalid credentials");
        return Ok(HttpResponse::Unauthorized().json(json!({
            "message": "Invalid credentials"
        })));
    }

    let access_token =
        generate_access_token(&config.admin_username, &config.jwt_secret, config.access_token_ttl)?;

    run_blocking(move || store.set_admin_session(true)).await?;

    info!("Login successful");
    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        expires_in: config.access_token_ttl,
    }))
}

/// Admin logout; idempotent for a valid token.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session flag cleared"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    admin: AdminUser,
    store: web::Data<RecordStore>,
) -> Result<impl Responder, AppError> {
    run_blocking(move || store.set_admin_session(false)).await?;
    info!(admin = %admin.username, token_id = %admin.token_id, "Admin logged out");
    Ok(HttpResponse::NoContent().finish())
}
