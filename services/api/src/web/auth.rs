//! services/api/src/web/auth.rs
//!
//! Telegram Mini App authentication: validates the signed `initData`
//! payload and upserts the user profile.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use timetrack_core::domain::User;

type HmacSha256 = Hmac<Sha256>;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub init_data: Option<String>,
}

/// The Telegram user payload embedded in `initData` under the `user` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

//=========================================================================================
// Init-data Validation
//=========================================================================================

/// Checks the HMAC-SHA256 signature over the init-data payload.
///
/// The data-check string is every `key=value` pair except `hash`, sorted by
/// key and joined with newlines. The signing key is
/// `HMAC-SHA256(key = "WebAppData", message = bot_token)`.
pub fn verify_init_data(init_data: &str, bot_token: &str) -> Result<(), ApiError> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut supplied_hash: Option<String> = None;
    for (key, value) in url::form_urlencoded::parse(init_data.as_bytes()) {
        if key == "hash" {
            supplied_hash = Some(value.into_owned());
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    let supplied_hash =
        supplied_hash.ok_or_else(|| ApiError::Auth("Invalid initData".to_string()))?;
    let expected = hex::decode(supplied_hash.as_bytes())
        .map_err(|_| ApiError::Auth("Invalid initData".to_string()))?;

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    let data_check_string = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut secret = HmacSha256::new_from_slice(b"WebAppData")
        .expect("HMAC accepts keys of any length");
    secret.update(bot_token.as_bytes());
    let secret_key = secret.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret_key)
        .expect("HMAC accepts keys of any length");
    mac.update(data_check_string.as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| ApiError::Auth("Invalid initData".to_string()))
}

/// Extracts the `user` JSON object from the init-data pairs.
fn parse_init_data_user(init_data: &str) -> Result<TelegramUser, ApiError> {
    let user_param = url::form_urlencoded::parse(init_data.as_bytes())
        .find(|(key, _)| key == "user")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| ApiError::Validation("User data not found".to_string()))?;
    serde_json::from_str(&user_param)
        .map_err(|_| ApiError::Validation("User data not found".to_string()))
}

//=========================================================================================
// Handler
//=========================================================================================

/// POST /auth - validate Telegram init data and upsert the user profile.
#[utoipa::path(
    post,
    path = "/auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Authenticated; returns the user profile"),
        (status = 400, description = "Missing initData or user payload"),
        (status = 401, description = "Signature mismatch"),
        (status = 500, description = "BOT_TOKEN is not configured")
    )
)]
pub async fn authenticate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // 1. Require the init data payload.
    let init_data = req
        .init_data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing initData".to_string()))?;

    // 2. The bot token is the verification secret; without it we cannot
    //    authenticate anyone.
    let bot_token = state
        .config
        .bot_token
        .as_deref()
        .ok_or_else(|| ApiError::ServerConfig("BOT_TOKEN is not set".to_string()))?;

    // 3. Verify the signature before trusting any field.
    verify_init_data(&init_data, bot_token)?;

    // 4. Upsert the profile keyed by the Telegram id.
    let telegram_user = parse_init_data_user(&init_data)?;
    let now = Utc::now();
    let user = state
        .store
        .upsert_user(User {
            id: Uuid::new_v4(),
            telegram_id: telegram_user.id,
            username: telegram_user.username,
            first_name: telegram_user.first_name,
            last_name: telegram_user.last_name,
            language_code: telegram_user.language_code,
            is_premium: telegram_user.is_premium,
            created_at: now,
            updated_at: now,
        })
        .await?;

    Ok(Json(json!({ "user": user })))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a correctly signed init-data string for a bot token.
    pub(crate) fn signed_init_data(bot_token: &str, user_json: &str) -> String {
        let pairs = vec![
            ("auth_date".to_string(), "1700000000".to_string()),
            ("query_id".to_string(), "AAE".to_string()),
            ("user".to_string(), user_json.to_string()),
        ];
        let data_check_string = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n");

        let mut secret = HmacSha256::new_from_slice(b"WebAppData").unwrap();
        secret.update(bot_token.as_bytes());
        let secret_key = secret.finalize().into_bytes();
        let mut mac = HmacSha256::new_from_slice(&secret_key).unwrap();
        mac.update(data_check_string.as_bytes());
        let hash = hex::encode(mac.finalize().into_bytes());

        let mut encoded: Vec<String> = pairs
            .into_iter()
            .map(|(k, v)| {
                format!(
                    "{k}={}",
                    url::form_urlencoded::byte_serialize(v.as_bytes()).collect::<String>()
                )
            })
            .collect();
        encoded.push(format!("hash={hash}"));
        encoded.join("&")
    }

    #[test]
    fn accepts_a_correctly_signed_payload() {
        let init_data = signed_init_data("12345:token", r#"{"id":7,"first_name":"Ada"}"#);
        assert!(verify_init_data(&init_data, "12345:token").is_ok());
    }

    #[test]
    fn rejects_a_tampered_payload() {
        let init_data = signed_init_data("12345:token", r#"{"id":7,"first_name":"Ada"}"#);
        let tampered = init_data.replace("auth_date=1700000000", "auth_date=1700000001");
        assert!(verify_init_data(&tampered, "12345:token").is_err());
    }

    #[test]
    fn rejects_a_payload_signed_with_another_token() {
        let init_data = signed_init_data("12345:token", r#"{"id":7,"first_name":"Ada"}"#);
        assert!(verify_init_data(&init_data, "99999:other").is_err());
    }

    #[test]
    fn rejects_missing_hash() {
        assert!(verify_init_data("auth_date=1700000000", "12345:token").is_err());
    }

    #[test]
    fn parses_the_embedded_user_payload() {
        let init_data = signed_init_data(
            "12345:token",
            r#"{"id":7,"first_name":"Ada","username":"ada","is_premium":true}"#,
        );
        let user = parse_init_data_user(&init_data).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username.as_deref(), Some("ada"));
        assert!(user.is_premium);
    }
}
