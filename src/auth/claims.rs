use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload carried by a session token. Identity claims ride in the
/// token itself so protected requests need no database lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // user ID
    pub username: String,
    pub email: String,
    pub iat: usize,      // issued at (unix timestamp)
    pub exp: usize,      // expires at (unix timestamp)
    pub iss: String,     // issuer
    pub aud: String,     // audience
}
