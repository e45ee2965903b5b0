use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    dto::auth::{
        Claims, LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UserResponse,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_USER},
    response::{ApiResponse, Meta},
    state::AppState,
    store::{NewUser, UserPatch},
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    let RegisterRequest {
        username,
        email,
        password,
        name,
    } = payload;

    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "username, email and password are required".to_string(),
        ));
    }
    if state.store.user_by_username(&username).is_some() {
        return Err(AppError::BadRequest("Username is already taken".to_string()));
    }
    if state.store.user_by_email(&email).is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;
    let user = state.store.create_user(NewUser {
        username,
        email,
        password_hash,
        name,
        is_admin: false,
    });

    tracing::info!(user_id = user.id, "user registered");
    Ok(ApiResponse::success("User created", user.into(), None))
}

pub fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;

    let user = match state.store.user_by_username(&username) {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid username or password".into())),
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: if user.is_admin { ROLE_ADMIN } else { ROLE_USER }.to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    tracing::info!(user_id = user.id, "user logged in");

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
    };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub fn current_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    let found = state.store.user(user.user_id).ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", found.into(), None))
}

pub fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    let patch = UserPatch {
        name: payload.name,
        address: payload.address,
        phone: payload.phone,
    };
    let updated = state
        .store
        .update_user(user.user_id, patch)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Profile updated", updated.into(), None))
}
