use serde::Serialize;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of a boolean check.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub granted: bool,
}

/// Outcome of a mutating operation.
#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub changed: bool,
}
