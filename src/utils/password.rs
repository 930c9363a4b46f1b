use actix_web::rt::task::spawn_blocking;
use bcrypt::{hash, verify};

use crate::errors::AppError;

/// bcrypt hashing, run off the async workers.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        PasswordHasher { cost }
    }

    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        let cost = self.cost;
        spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|_| AppError::InternalServerError("Hashing failed".to_string()))?
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    pub async fn verify(&self, password: String, password_hash: String) -> Result<bool, AppError> {
        spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|_| AppError::InternalServerError("Password verification error".to_string()))?
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }
}
