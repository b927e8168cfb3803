use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::errors::AppError;
use crate::models::user::{NewToken, TokenKind};
use crate::state::AppState;
use crate::utils::jwt::{token_digest, TokenIssuer, ACCESS_TOKEN_MINUTES};
use crate::utils::password::verify_password;
use crate::utils::validation::validate_payload;

const TOKEN_TYPE: &str = "Bearer";

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    username: String,
    #[validate(length(min = 1))]
    password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    refresh_token: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    access_token: String,
    refresh_token: String,
    token_type: &'static str,
    expires_in: i64,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    access_token: String,
    token_type: &'static str,
    expires_in: i64,
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the caller of a guarded endpoint to a user id.
pub async fn authenticate(req: &HttpRequest, state: &AppState) -> Result<i32, AppError> {
    let token = bearer_token(req)
        .ok_or_else(|| AppError::Unauthorized("Missing or invalid Authorization header".to_string()))?;

    let claims = state.issuer.validate_token(token, TokenKind::Access)?;

    let owner = state
        .tokens
        .validate_token(&token_digest(token), TokenKind::Access, Utc::now())
        .await?;
    if owner != Some(claims.user_id) || !state.users.user_exists(claims.user_id).await? {
        return Err(AppError::Unauthorized("Invalid token".to_string()));
    }
    Ok(claims.user_id)
}

fn expires_in() -> i64 {
    ACCESS_TOKEN_MINUTES * 60
}

pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    validate_payload(&payload.0)
        .map_err(|_| AppError::Unauthorized("Invalid username or password".to_string()))?;

    let user = state
        .users
        .find_user_by_login(&payload.username)
        .await?
        .filter(|user| verify_password(&payload.password, &user.password_hash))
        .ok_or_else(|| {
            warn!("Failed login for '{}'", payload.username);
            AppError::Unauthorized("Invalid username or password".to_string())
        })?;

    let access_lifetime = TokenIssuer::lifetime(TokenKind::Access);
    let refresh_lifetime = TokenIssuer::lifetime(TokenKind::Refresh);
    let access_token = state.issuer.generate_token(user.id, TokenKind::Access, access_lifetime)?;
    let refresh_token = state.issuer.generate_token(user.id, TokenKind::Refresh, refresh_lifetime)?;

    let now = Utc::now();
    state
        .tokens
        .create_token(NewToken {
            user_id: user.id,
            access_digest: token_digest(&access_token),
            refresh_digest: token_digest(&refresh_token),
            access_expires_at: now + access_lifetime,
            refresh_expires_at: now + refresh_lifetime,
        })
        .await?;

    info!("User {} logged in", user.id);
    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
        token_type: TOKEN_TYPE,
        expires_in: expires_in(),
    }))
}

pub async fn refresh(
    state: web::Data<AppState>,
    payload: web::Json<RefreshRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let rejected = || AppError::Unauthorized("Invalid or expired refresh token".to_string());

    let claims = state
        .issuer
        .validate_token(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|_| rejected())?;

    let refresh_digest = token_digest(&payload.refresh_token);
    let owner = state
        .tokens
        .validate_token(&refresh_digest, TokenKind::Refresh, Utc::now())
        .await?;
    if owner != Some(claims.user_id) {
        return Err(rejected().into());
    }

    let access_lifetime = TokenIssuer::lifetime(TokenKind::Access);
    let access_token = state
        .issuer
        .generate_token(claims.user_id, TokenKind::Access, access_lifetime)?;

    // The refresh token keeps its original expiry.
    let now = Utc::now();
    let refresh_expires_at = chrono::DateTime::from_timestamp(claims.exp as i64, 0)
        .unwrap_or(now + TokenIssuer::lifetime(TokenKind::Refresh));
    state
        .tokens
        .create_token(NewToken {
            user_id: claims.user_id,
            access_digest: token_digest(&access_token),
            refresh_digest,
            access_expires_at: now + access_lifetime,
            refresh_expires_at,
        })
        .await?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        access_token,
        token_type: TOKEN_TYPE,
        expires_in: expires_in(),
    }))
}

pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    // Any non-empty header is looked up; the scheme prefix is optional here.
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|auth| auth.to_str().ok())
        .unwrap_or_default();
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": "Access token missing" })));
    }

    if state.tokens.deactivate_access_token(&token_digest(token)).await? {
        Ok(HttpResponse::Ok().json(json!({ "message": "Successfully logged out" })))
    } else {
        Err(AppError::Unauthorized("Invalid access token".to_string()).into())
    }
}
