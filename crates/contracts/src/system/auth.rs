use serde::{Deserialize, Serialize};

/// Login request forwarded to the loan-origination backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with the dashboard session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub session_token: String,
    pub employee: EmployeeInfo,
}

/// Employee details as returned by the upstream CRM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeInfo {
    pub id: Option<i64>,
    pub f_name: String,
    pub l_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Request body for logout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub session_token: String,
}
