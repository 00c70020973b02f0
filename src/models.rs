use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Role name, looked up case-insensitively
    pub role: String,
    pub exp: usize,
    pub jti: String,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<String>,
}
