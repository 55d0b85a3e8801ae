use once_cell::sync::OnceCell;
use serde_json::Value;
use thiserror::Error;

use contracts::shared::date_range::DateRange;
use contracts::system::auth::EmployeeInfo;

use crate::shared::config::UpstreamConfig;

use super::envelope;

/// Errors talking to the loan-origination backend
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("upstream returned invalid JSON: {0}")]
    BadJson(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("not authorised by upstream")]
    NotAuthorised,

    #[error("no bearer token available (no session and no configured API key)")]
    NoToken,
}

/// Result of a successful upstream login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub employee: EmployeeInfo,
}

/// HTTP client for the loan-origination insights API.
/// One instance per process, created from config at startup.
pub struct LoanApiClient {
    client: reqwest::Client,
    metrics_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

static CLIENT: OnceCell<LoanApiClient> = OnceCell::new();

/// Initialize the global client from config. Called once from main.
pub fn initialize_client(config: &UpstreamConfig) -> anyhow::Result<()> {
    let client = LoanApiClient::new(config)?;
    CLIENT
        .set(client)
        .map_err(|_| anyhow::anyhow!("upstream client already initialized"))?;
    Ok(())
}

pub fn get_client() -> &'static LoanApiClient {
    CLIENT.get().expect("upstream client not initialized")
}

impl LoanApiClient {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        // Collection metrics get a tighter deadline so a slow metrics
        // endpoint cannot stall the disbursal summary page
        let metrics_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.metrics_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            metrics_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Resolve the bearer token: employee session token first, configured
    /// service API key as fallback.
    fn bearer(&self, session_token: Option<&str>) -> Result<String, UpstreamError> {
        if let Some(token) = session_token {
            return Ok(token.to_string());
        }
        if let Some(key) = &self.api_key {
            tracing::debug!("No session token, using configured API key");
            return Ok(key.clone());
        }
        tracing::warn!("No authentication token available for upstream request");
        Err(UpstreamError::NoToken)
    }

    /// POST /api/crm/employee/login
    ///
    /// The upstream can answer 200 with an error message in the body, so a
    /// success status alone is not enough: the payload must carry both
    /// `token` and `employee`, and `message` must not read like a failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, UpstreamError> {
        let url = format!("{}/api/crm/employee/login", self.base_url);
        tracing::info!("Upstream login for {}", email);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|_| UpstreamError::BadJson(preview(&body)))?;

        if !(status.is_success()) {
            let message = envelope::error_text(&payload)
                .unwrap_or_else(|| format!("login failed with status {}", status));
            tracing::warn!("Upstream login error ({}): {}", status, message);
            return Err(UpstreamError::Upstream(message));
        }

        if let Some(message) = payload.get("message").and_then(Value::as_str) {
            if envelope::is_error_message(message) {
                tracing::warn!("Upstream login error in success response: {}", message);
                return Err(UpstreamError::Upstream(message.to_string()));
            }
        }

        let token = payload.get("token").and_then(Value::as_str);
        let employee = payload.get("employee");
        match (token, employee) {
            (Some(token), Some(employee)) => Ok(LoginOutcome {
                token: token.to_string(),
                employee: parse_employee(employee),
            }),
            _ => {
                let message = envelope::error_text(&payload)
                    .unwrap_or_else(|| "Invalid credentials. Please try again.".to_string());
                Err(UpstreamError::Upstream(message))
            }
        }
    }

    /// GET /insights/v2/disbursal?startDate&endDate
    pub async fn fetch_disbursals(
        &self,
        session_token: Option<&str>,
        range: &DateRange,
    ) -> Result<Vec<Value>, UpstreamError> {
        let url = format!("{}/insights/v2/disbursal", self.base_url);
        let payload = self
            .get_json(&self.client, &url, session_token, range)
            .await?;
        let records = envelope::extract_records(payload)?;
        tracing::info!("Fetched {} disbursal records", records.len());
        Ok(records)
    }

    /// GET /insights/v2/collection_metrics?startDate&endDate
    pub async fn fetch_collection_metrics(
        &self,
        session_token: Option<&str>,
        range: &DateRange,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}/insights/v2/collection_metrics", self.base_url);
        self.get_json(&self.metrics_client, &url, session_token, range)
            .await
    }

    /// GET /insights/v2/collection?startDate&endDate
    ///
    /// Raw collection records for the drill-down tables.
    pub async fn fetch_collection_records(
        &self,
        session_token: Option<&str>,
        range: &DateRange,
    ) -> Result<Vec<Value>, UpstreamError> {
        let url = format!("{}/insights/v2/collection", self.base_url);
        let payload = self
            .get_json(&self.client, &url, session_token, range)
            .await?;
        let records = envelope::extract_records(payload)?;
        tracing::info!("Fetched {} collection records", records.len());
        Ok(records)
    }

    /// GET /insights/v2/aum?startDate&endDate, the loan book snapshot.
    pub async fn fetch_aum_snapshot(
        &self,
        session_token: Option<&str>,
        range: &DateRange,
    ) -> Result<Vec<Value>, UpstreamError> {
        let url = format!("{}/insights/v2/aum", self.base_url);
        let payload = self
            .get_json(&self.client, &url, session_token, range)
            .await?;
        let records = envelope::extract_records(payload)?;
        tracing::info!("Fetched {} AUM records", records.len());
        Ok(records)
    }

    async fn get_json(
        &self,
        client: &reqwest::Client,
        url: &str,
        session_token: Option<&str>,
        range: &DateRange,
    ) -> Result<Value, UpstreamError> {
        let token = self.bearer(session_token)?;
        let params = range.as_upstream_params();

        tracing::debug!("GET {} params {:?}", url, params);

        let response = client
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Upstream {} returned {}: {}", url, status, preview(&body));
            return Err(UpstreamError::Status {
                status,
                body: preview(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Invalid JSON from {}: {} ({})", url, preview(&body), e);
            UpstreamError::BadJson(preview(&body))
        })
    }
}

fn parse_employee(value: &Value) -> EmployeeInfo {
    EmployeeInfo {
        id: value.get("id").and_then(Value::as_i64),
        f_name: value
            .get("f_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        l_name: value
            .get("l_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        roles: value
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn preview(body: &str) -> String {
    let preview: String = body.chars().take(500).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_employee() {
        let employee = parse_employee(&json!({
            "id": 7,
            "f_name": "Asha",
            "l_name": "Verma",
            "roles": ["credit", "admin"]
        }));
        assert_eq!(employee.id, Some(7));
        assert_eq!(employee.f_name, "Asha");
        assert_eq!(employee.roles, vec!["credit", "admin"]);
    }

    #[test]
    fn test_parse_employee_tolerates_missing_fields() {
        let employee = parse_employee(&json!({}));
        assert_eq!(employee.id, None);
        assert_eq!(employee.f_name, "");
        assert!(employee.roles.is_empty());
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(600);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 503);
    }
}
