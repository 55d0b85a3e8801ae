use serde_json::Value;

/// One disbursal record, flattened out of the upstream's raw JSON.
/// Missing or malformed numeric fields become zero; the dashboard sums
/// whatever the upstream managed to send.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisbursalRecord {
    /// Sanctioned loan amount (`loan_amount`)
    pub loan_amount: f64,
    /// Net amount paid out (`Disbursal_Amt`)
    pub disbursal_amount: f64,
    pub processing_fee: f64,
    pub interest_amount: f64,
    pub repayment_amount: f64,
    /// Tenure in days; zero when absent
    pub tenure_days: f64,
    pub state: String,
    pub city: String,
    /// Lead source (`source`, sometimes `Source`)
    pub source: String,
    /// Reloan vs first (fresh) loan (`is_reloan_case`)
    pub is_reloan: bool,
}

impl DisbursalRecord {
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object()?;

        Some(Self {
            loan_amount: num_field(value, &["loan_amount"]),
            disbursal_amount: num_field(value, &["Disbursal_Amt", "disbursal_amt"]),
            processing_fee: num_field(value, &["processing_fee"]),
            interest_amount: num_field(value, &["interest_amount"]),
            repayment_amount: num_field(value, &["repayment_amount"]),
            tenure_days: num_field(value, &["tenure"]),
            state: str_field(value, &["state"]),
            city: str_field(value, &["city"]),
            source: str_field(value, &["source", "Source"]),
            is_reloan: bool_field(value, &["is_reloan_case"]),
        })
    }
}

/// Read a boolean field, trying keys in order.
pub fn bool_field(value: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .filter_map(|key| value.get(key))
        .map(truthy)
        .next()
        .unwrap_or(false)
}

/// Read a numeric field, trying keys in order. The upstream sends numbers
/// both as JSON numbers and as numeric strings; null and garbage are zero.
pub fn num_field(value: &Value, keys: &[&str]) -> f64 {
    for key in keys {
        if let Some(v) = value.get(key) {
            if let Some(n) = parse_number(v) {
                return n;
            }
        }
    }
    0.0
}

/// Read a string field, trying keys in order, trimming whitespace.
pub fn str_field(value: &Value, keys: &[&str]) -> String {
    for key in keys {
        if let Some(s) = value.get(key).and_then(Value::as_str) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    String::new()
}

/// Numeric coercion for a single JSON value: number, numeric string or bool.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Upstream booleans arrive as bools, 0/1 numbers or "true"/"1" strings.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            s == "true" || s == "1" || s == "yes"
        }
        _ => false,
    }
}
