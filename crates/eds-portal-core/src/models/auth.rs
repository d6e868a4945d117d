use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Refresh token; kept for completeness, refresh is not performed.
    #[serde(default)]
    pub refresh: Option<String>,
    pub username: String,
    #[serde(default)]
    pub is_staff: bool,
}

/// Profile cached under the `user` key while a session is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    pub username: String,
    pub is_staff: bool,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub signed_in_at: DateTime<Utc>,
}

impl From<&LoginResponse> for UserProfile {
    fn from(response: &LoginResponse) -> Self {
        Self {
            username: response.username.clone(),
            is_staff: response.is_staff,
            signed_in_at: Utc::now(),
        }
    }
}
