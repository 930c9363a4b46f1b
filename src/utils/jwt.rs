use std::future::{ready, Ready};

use jsonwebtoken::{encode, decode, Algorithm, Header, Validation, EncodingKey, DecodingKey};
use serde::{Deserialize, Serialize};
use log::warn;

use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use actix_web::dev::Payload;
use actix_web::http::header::Header as TypedHeader;
use actix_web::{web, FromRequest, HttpRequest};

use crate::errors::AppError;

/// Token claims. Tokens carry no `exp`; they stay valid until the secret rotates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
    }
}

/// Issues and verifies HS256 identity tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        TokenService {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Generates a token whose subject is the user's id.
    pub fn generate_token(&self, user_id: i64) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: chrono::Utc::now().timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AppError::InternalServerError("Token generation failed".to_string()))
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;
        claims.user_id()?;
        Ok(claims)
    }
}

/// Id of the caller, as proven by the `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

impl AuthUser {
    fn authenticate(req: &HttpRequest) -> Result<Self, AppError> {
        let tokens = req
            .app_data::<web::Data<TokenService>>()
            .ok_or_else(|| AppError::InternalServerError("Token service unavailable".to_string()))?;

        let header = <Authorization<Bearer> as TypedHeader>::parse(req)
            .map_err(|_| AppError::Unauthorized("Missing token".to_string()))?;

        let claims = tokens.validate_token(header.into_scheme().token()).map_err(|err| {
            warn!("Rejected bearer token on {}", req.path());
            err
        })?;
        Ok(AuthUser(claims.user_id()?))
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(AuthUser::authenticate(req))
    }
}
