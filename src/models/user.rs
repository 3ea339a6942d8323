//! User model, authentication forms and session claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Librarian account from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Registration form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterForm {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
}

/// Login form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// HTML forms send empty inputs as `""`
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// JWT claims carried by the session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Claims for `user`, valid for `hours` from now
    pub fn for_user(user: &User, hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            exp: now + (hours as i64 * 3600),
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}
