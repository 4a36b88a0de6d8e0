use std::future::{ready, Ready};

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::user_account::{AccountRole, UserAccount};
use crate::Context;

pub const SESSION_COOKIE: &str = "journal_session";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub full_name: String,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Authentication required.")]
    Unauthenticated,
}

impl ResponseError for SessionError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// The authenticated caller, decoded from the session token. Operations take
/// this explicitly rather than reading ambient session state.
#[derive(Clone, Debug)]
pub struct Identity {
    pub account_id: Uuid,
    pub role: AccountRole,
    pub full_name: String,
}

impl FromRequest for Identity {
    type Error = SessionError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(identity_from_request(req))
    }
}

fn identity_from_request(req: &HttpRequest) -> Result<Identity, SessionError> {
    let ctx = req
        .app_data::<web::Data<Context>>()
        .ok_or(SessionError::Unauthenticated)?;
    let token = token_from_request(req).ok_or(SessionError::Unauthenticated)?;
    let claims = verify_token(&ctx.token_secret, &token).map_err(|e| {
        log::debug!("Rejecting session token: {:?}", e);
        SessionError::Unauthenticated
    })?;

    let account_id = claims.sub.parse().map_err(|_| SessionError::Unauthenticated)?;
    let role = claims.role.parse().map_err(|_| SessionError::Unauthenticated)?;
    Ok(Identity {
        account_id,
        role,
        full_name: claims.full_name,
    })
}

/// Prefers the session cookie and falls back to a bearer token, so both
/// browser and programmatic clients are served.
fn token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_owned());
    }
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

pub fn issue_token(
    secret: &str,
    ttl: Duration,
    account: &UserAccount,
) -> jsonwebtoken::errors::Result<String> {
    let claims = Claims {
        sub: account.account_id.to_string(),
        role: account.role.to_string(),
        full_name: account.full_name.clone(),
        exp: (Utc::now() + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_base64_secret(secret)?,
    )
}

pub fn verify_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_base64_secret(secret)?,
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
impl Identity {
    pub(crate) fn teacher() -> Self {
        Self {
            account_id: Uuid::new_v4(),
            role: AccountRole::Teacher,
            full_name: "Test Teacher".to_owned(),
        }
    }

    pub(crate) fn student() -> Self {
        Self {
            account_id: Uuid::new_v4(),
            role: AccountRole::Student,
            full_name: "Test Student".to_owned(),
        }
    }

    pub(crate) fn admin() -> Self {
        Self {
            account_id: Uuid::new_v4(),
            role: AccountRole::Admin,
            full_name: "Test Admin".to_owned(),
        }
    }
}
