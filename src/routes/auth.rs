use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration as ChronoDuration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{password, validation, AuthenticatedUser},
    error::{AppError, AppResult},
    models::{NewRefreshToken, NewUser, RefreshToken, User},
    routes::users::{UserResponse, NAME_MAX},
    schema::{refresh_tokens, users},
    state::AppState,
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let email = normalize_email(&payload.email);
    validation::validate_email(&email).map_err(AppError::bad_request)?;
    validation::validate_password(&payload.password).map_err(AppError::bad_request)?;
    let first_name = validation::bounded_text("first_name", &payload.first_name, NAME_MAX)
        .map_err(AppError::bad_request)?;
    let last_name = validation::bounded_text("last_name", &payload.last_name, NAME_MAX)
        .map_err(AppError::bad_request)?;

    let password_hash = password::hash_password(&payload.password)?;
    let new_user = NewUser {
        id: Uuid::new_v4(),
        email,
        password_hash,
        first_name,
        last_name,
    };

    let mut conn = state.db()?;
    let tokens = conn.transaction::<TokenResponse, AppError, _>(|conn| {
        match diesel::insert_into(users::table)
            .values(&new_user)
            .execute(conn)
        {
            Ok(_) => {}
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                warn!(email = %new_user.email, "registration rejected: email taken");
                return Err(AppError::bad_request("email is already registered"));
            }
            Err(err) => return Err(AppError::from(err)),
        }

        issue_token_pair(conn, &state, new_user.id, &new_user.email)
    })?;

    info!(user_id = %new_user.id, "user registered");
    Ok((StatusCode::CREATED, Json(tokens)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let mut conn = state.db()?;
    let email = normalize_email(&payload.email);

    let user: User = users::table
        .filter(users::email.eq(&email))
        .select(User::as_select())
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::unauthorized)?;

    let valid = password::verify_password(&payload.password, &user.password_hash)
        .map_err(|_| AppError::unauthorized())?;

    if !valid || !user.is_active {
        warn!(user_id = %user.id, "login rejected");
        return Err(AppError::unauthorized());
    }

    let tokens = issue_token_pair(&mut conn, &state, user.id, &user.email)?;
    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let hashed = hash_refresh_token(&payload.refresh_token);
    let mut conn = state.db()?;

    let tokens = conn.transaction::<TokenResponse, AppError, _>(|conn| {
        let now = Utc::now().naive_utc();

        let token: RefreshToken = refresh_tokens::table
            .filter(refresh_tokens::token_hash.eq(&hashed))
            .filter(refresh_tokens::revoked_at.is_null())
            .filter(refresh_tokens::expires_at.gt(now))
            .first(conn)
            .optional()?
            .ok_or_else(AppError::unauthorized)?;

        diesel::update(refresh_tokens::table.find(token.id))
            .set((
                refresh_tokens::revoked_at.eq(now),
                refresh_tokens::updated_at.eq(now),
            ))
            .execute(conn)?;

        let user: User = users::table
            .find(token.user_id)
            .select(User::as_select())
            .first(conn)
            .optional()?
            .filter(|user| user.is_active)
            .ok_or_else(AppError::unauthorized)?;

        issue_token_pair(conn, &state, user.id, &user.email)
    })?;

    Ok(Json(tokens))
}

/// Revokes the presented refresh token. Without one, every live token of the
/// caller is revoked.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Option<Json<LogoutRequest>>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let live_tokens = refresh_tokens::table
        .filter(refresh_tokens::user_id.eq(user.user_id))
        .filter(refresh_tokens::revoked_at.is_null());

    let revoked = match payload.and_then(|Json(body)| body.refresh_token) {
        Some(value) => diesel::update(
            live_tokens.filter(refresh_tokens::token_hash.eq(hash_refresh_token(&value))),
        )
        .set((
            refresh_tokens::revoked_at.eq(now),
            refresh_tokens::updated_at.eq(now),
        ))
        .execute(&mut conn)?,
        None => diesel::update(live_tokens)
            .set((
                refresh_tokens::revoked_at.eq(now),
                refresh_tokens::updated_at.eq(now),
            ))
            .execute(&mut conn)?,
    };

    info!(user_id = %user.user_id, revoked, "logged out");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<UserResponse>> {
    let mut conn = state.db()?;
    let profile: User = users::table
        .find(user.user_id)
        .select(User::as_select())
        .first(&mut conn)?;
    Ok(Json(UserResponse::from(profile)))
}

fn issue_token_pair(
    conn: &mut PgConnection,
    state: &AppState,
    user_id: Uuid,
    email: &str,
) -> AppResult<TokenResponse> {
    let access_token = state.jwt.generate_token(user_id, email)?;

    let now = Utc::now();
    let refresh_value = generate_refresh_token();
    let new_refresh = NewRefreshToken {
        id: Uuid::new_v4(),
        user_id,
        token_hash: hash_refresh_token(&refresh_value),
        issued_at: now.naive_utc(),
        expires_at: (now + ChronoDuration::days(state.config.refresh_token_expiry_days))
            .naive_utc(),
    };

    diesel::insert_into(refresh_tokens::table)
        .values(&new_refresh)
        .execute(conn)?;

    Ok(TokenResponse {
        access_token,
        refresh_token: refresh_value,
        token_type: "bearer".to_string(),
        expires_in: state.jwt.expires_in_seconds(),
    })
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_are_random_hex() {
        let first = generate_refresh_token();
        let second = generate_refresh_token();
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn refresh_token_hash_is_stable_sha256() {
        let hashed = hash_refresh_token("abc");
        assert_eq!(
            hashed,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hashed, hash_refresh_token("abc"));
    }

    #[test]
    fn emails_are_compared_lowercase() {
        assert_eq!(normalize_email("  Breeder@Kennel.PL "), "breeder@kennel.pl");
    }
}
