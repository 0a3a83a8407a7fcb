use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload stored in the `token` cookie; also the `/profile` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,         // user ID
    pub username: String, // username at login time
    pub iat: usize,       // issued at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>, // only present when a TTL is configured
}
