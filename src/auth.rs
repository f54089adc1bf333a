use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::enums::UserRole;
use crate::entities::user;
use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    pub workstation_id: Option<i32>,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated identity attached to a request, extracted by
/// `AuthenticatedUser` and consulted by handlers to gate role-restricted
/// mutations (`INVENTORY_UNAUTHORIZED`, `USER_UNAUTHORIZED`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub workstation_id: Option<i32>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// True when this user may act at `workstation_id` — admins act anywhere,
    /// operators only at the station they're scoped to.
    pub fn may_act_at(&self, workstation_id: i32) -> bool {
        self.is_admin() || self.workstation_id == Some(workstation_id)
    }
}

#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    jwt_expiration_secs: i64,
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub workstation_id: Option<i32>,
}

impl AuthService {
    pub fn new(jwt_secret: String, jwt_expiration_secs: i64, db: Arc<DatabaseConnection>) -> Self {
        Self { jwt_secret, jwt_expiration_secs, db }
    }

    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    fn verify_password(stored_hash: &str, candidate: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| AppError::Internal(format!("stored password hash is corrupt: {e}")))?;
        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::Internal(format!("password verification failed: {e}"))),
        }
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::UserUnauthorized("invalid credentials".to_string()))?;

        if !Self::verify_password(&model.password_hash, password)? {
            return Err(AppError::UserUnauthorized("invalid credentials".to_string()));
        }

        let now = Utc::now();
        let exp = now + ChronoDuration::seconds(self.jwt_expiration_secs);

        let claims = Claims {
            sub: model.id.to_string(),
            username: model.username.clone(),
            role: model.role,
            workstation_id: model.workstation_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token creation failed: {e}")))?;

        Ok(TokenResponse {
            token,
            token_type: "Bearer",
            expires_at: exp,
            user: PublicUser {
                id: model.id,
                username: model.username,
                role: model.role,
                workstation_id: model.workstation_id,
            },
        })
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &DecodingKey::from_secret(self.jwt_secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::UserUnauthorized(format!("invalid token: {e}")))
    }
}

/// Axum extractor gating non-public routes. Reads `Authorization: Bearer`,
/// validates against the `AuthService` held in app state, and surfaces the
/// identity to handlers. Stands in for the `X-Authenticated-*` headers a
/// gateway would otherwise inject in front of this service.
#[axum::async_trait]
impl FromRequestParts<crate::AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &crate::AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::UserUnauthorized("missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::UserUnauthorized("authorization header must be a bearer token".to_string()))?;

        let claims = state.auth.decode_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::UserUnauthorized("invalid token subject".to_string()))?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
            role: claims.role,
            workstation_id: claims.workstation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = AuthService::hash_password("correct horse battery staple").unwrap();
        assert!(AuthService::verify_password(&hash, "correct horse battery staple").unwrap());
        assert!(!AuthService::verify_password(&hash, "wrong password").unwrap());
    }

    #[test]
    fn may_act_at_respects_scope() {
        let operator = AuthUser {
            user_id: Uuid::new_v4(),
            username: "op".into(),
            role: UserRole::WarehouseOperator,
            workstation_id: Some(7),
        };
        assert!(operator.may_act_at(7));
        assert!(!operator.may_act_at(8));

        let admin = AuthUser {
            user_id: Uuid::new_v4(),
            username: "admin".into(),
            role: UserRole::Admin,
            workstation_id: None,
        };
        assert!(admin.may_act_at(1));
    }
}
