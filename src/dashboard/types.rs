use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Generic `{status, message}` envelope returned by the dashboard's POST/action
// endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub redirect: Option<String>,
}

impl ApiStatus {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}
