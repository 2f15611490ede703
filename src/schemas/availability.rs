use serde::{Deserialize, Serialize};

/// One cell of the weekly grid. Both values are optional on input because
/// incomplete cells are skipped rather than rejected.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub(crate) struct AvailabilityItem {
    #[serde(default)]
    pub(crate) dia: Option<String>,
    #[serde(default)]
    pub(crate) hora: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AvailabilityResponse {
    pub(crate) hours: Vec<String>,
    pub(crate) days: Vec<&'static str>,
    pub(crate) saved: Vec<AvailabilityItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AvailabilityUpdated {
    pub(crate) status: &'static str,
    pub(crate) message: &'static str,
    pub(crate) saved: usize,
}
