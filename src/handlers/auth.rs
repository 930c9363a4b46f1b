use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use chrono::Utc;
use validator::Validate;
use log::{info, warn};
use crate::models::user::{User, UserResponse};
use crate::errors::AppError;
use crate::utils::jwt::{AuthUser, TokenService};
use crate::utils::password::PasswordHasher;
use crate::utils::validation::{require_non_blank, validate_payload};

const BAD_CREDENTIALS: &str = "Invalid username or password";

#[derive(Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(required(message = "Username is required"))]
    #[validate(length(min = 1, max = 80, message = "Username must be between 1 and 80 characters"))]
    username: Option<String>,

    #[validate(required(message = "Password is required"))]
    #[validate(length(min = 1, max = 128, message = "Password must be between 1 and 128 characters"))]
    password: Option<String>,
}

impl AuthRequest {
    /// Validates the payload and hands back owned, trimmed credentials.
    fn into_credentials(self) -> Result<(String, String), AppError> {
        validate_payload(&self)?;
        let username = self.username.unwrap_or_default();
        let password = self.password.unwrap_or_default();
        require_non_blank("Username", &username)?;
        Ok((username.trim().to_string(), password))
    }
}

#[derive(Serialize)]
pub struct RegisterResponse {
    message: String,
    user: UserResponse,
}

#[derive(Serialize)]
pub struct AuthResponse {
    user: UserResponse,
    token: String,
}

// POST /v1/api/register
pub async fn register(
    req: web::Json<AuthRequest>,
    pool: web::Data<SqlitePool>,
    hasher: web::Data<PasswordHasher>,
) -> Result<HttpResponse, AppError> {
    let (username, password) = req.into_inner().into_credentials()?;

    let password_hash = hasher.hash(password).await?;

    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password_hash, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (username) DO NOTHING
        RETURNING id, username, password_hash, created_at",
    )
    .bind(&username)
    .bind(&password_hash)
    .bind(Utc::now())
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user) = user else {
        warn!("Registration rejected, username {} already exists", username);
        return Err(AppError::Conflict("Username already exists".to_string()));
    };
    tx.commit().await?;

    info!("Registered user {} ({})", user.username, user.id);

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user: UserResponse::from(&user),
    }))
}

// POST /v1/api/login
pub async fn login(
    req: web::Json<AuthRequest>,
    pool: web::Data<SqlitePool>,
    tokens: web::Data<TokenService>,
    hasher: web::Data<PasswordHasher>,
) -> Result<HttpResponse, AppError> {
    let (username, password) = req.into_inner().into_credentials()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
    )
    .bind(&username)
    .fetch_optional(&**pool)
    .await?;

    // Unknown user and wrong password are reported identically.
    let Some(user) = user else {
        warn!("Login failed for {}", username);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    if !hasher.verify(password, user.password_hash.clone()).await? {
        warn!("Login failed for {}", username);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let token = tokens.generate_token(user.id)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: UserResponse::from(&user),
        token,
    }))
}

// POST /v1/api/logout
// Tokens are stateless and never expire; the client discards its copy.
pub async fn logout(user: AuthUser) -> Result<HttpResponse, AppError> {
    info!("User {} logged out", user.0);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Logged out successfully" })))
}
