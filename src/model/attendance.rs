use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One recorded arrival, persisted under the `clockIns` key.
///
/// `employee_name` and `reference_time_snapshot` are copies taken at clock-in
/// time and are never re-derived from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClockInEvent {
    pub employee_id: String,
    #[schema(example = "Ana Li")]
    pub employee_name: String,
    #[schema(example = "2024-01-10")]
    pub date: String,
    #[schema(example = "09:05:12")]
    pub time: String,
    #[schema(example = "2024-01-10T08:05:12.000Z")]
    pub timestamp: String,
    #[serde(rename = "referenceTime")]
    #[schema(example = "09:00")]
    pub reference_time_snapshot: String,
}
