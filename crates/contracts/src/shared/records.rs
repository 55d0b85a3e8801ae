use serde::{Deserialize, Serialize};

/// Raw upstream records for the drill-down table modals.
/// Records are passed through as-is; the upstream schema is unstable,
/// so the front-end table renders whatever keys are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsResponse {
    pub records: Vec<serde_json::Value>,
    pub count: usize,
}
