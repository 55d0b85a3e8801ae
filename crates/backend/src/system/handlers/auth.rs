use axum::{extract::Json, http::StatusCode};
use contracts::system::auth::{EmployeeInfo, LoginRequest, LoginResponse, LogoutRequest};

use crate::system::auth::extractor::CurrentSession;
use crate::system::session;
use crate::upstream::client;

/// Login handler. Credentials are verified against the loan-origination
/// backend; on success the upstream token is kept server side and the
/// client only ever sees an opaque session token.
pub async fn login(Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>, StatusCode> {
    let outcome = client::get_client()
        .login(&request.email, &request.password)
        .await
        .map_err(|e| {
            tracing::warn!("Login rejected for {}: {}", request.email, e);
            StatusCode::UNAUTHORIZED
        })?;

    let employee = apply_display_name_override(outcome.employee);

    tracing::info!(
        "Login succeeded for {} ({} {})",
        request.email,
        employee.f_name,
        employee.l_name
    );

    let session_token = session::create(outcome.token, employee.clone());

    Ok(Json(LoginResponse {
        session_token,
        employee,
    }))
}

/// Logout handler
pub async fn logout(Json(request): Json<LogoutRequest>) -> Result<StatusCode, StatusCode> {
    session::revoke(&request.session_token);
    Ok(StatusCode::OK)
}

/// Get current employee handler (protected by middleware)
pub async fn current_employee(
    CurrentSession(session): CurrentSession,
) -> Result<Json<EmployeeInfo>, StatusCode> {
    Ok(Json(session.employee))
}

/// A handful of employees carry stale names upstream; the corrected
/// display names are pinned here.
fn apply_display_name_override(mut employee: EmployeeInfo) -> EmployeeInfo {
    if employee.id == Some(16) {
        employee.f_name = "Deep".to_string();
        employee.l_name = "Durugkar".to_string();
    }
    employee
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_override_applies_to_id_16() {
        let employee = EmployeeInfo {
            id: Some(16),
            f_name: "Old".to_string(),
            l_name: "Name".to_string(),
            roles: vec![],
        };
        let employee = apply_display_name_override(employee);
        assert_eq!(employee.f_name, "Deep");
        assert_eq!(employee.l_name, "Durugkar");
    }

    #[test]
    fn test_display_name_override_leaves_others_alone() {
        let employee = EmployeeInfo {
            id: Some(7),
            f_name: "Asha".to_string(),
            l_name: "Verma".to_string(),
            roles: vec![],
        };
        let employee = apply_display_name_override(employee);
        assert_eq!(employee.f_name, "Asha");
        assert_eq!(employee.l_name, "Verma");
    }
}
