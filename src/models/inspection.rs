//! Inspection document model
//!
//! A tolerant passthrough of the externally-defined inspection JSON.
//! Every field is optional or defaulted so sparse documents still parse,
//! and unknown fields are ignored. There are no invariants beyond
//! well-formedness of the input.

use serde::{Deserialize, Serialize};

/// Top-level upload payload
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InspectionDocument {
    #[serde(default)]
    pub inspection: Inspection,
}

/// Inspection metadata plus the section tree
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Inspection {
    pub client_info: ClientInfo,
    pub address: Address,
    pub inspector: Inspector,
    pub schedule: Schedule,
    pub agents: Vec<AgentEntry>,
    pub booking_form_data: BookingFormData,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    pub name: String,
    pub user_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub full_address: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Inspector {
    pub name: String,
    pub email: String,
}

/// Schedule block; `date` is epoch milliseconds
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Schedule {
    pub date: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentEntry {
    pub agent: Agent,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Agent {
    pub name: String,
    pub company: Company,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Company {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingFormData {
    pub property_info: PropertyInfo,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyInfo {
    pub square_footage: u64,
}

/// One report section (e.g., "Structural Systems")
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Section {
    pub name: String,
    pub media: Vec<MediaItem>,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaItem {
    pub url: Option<String>,
}

/// Inspection status for a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum InspectionStatus {
    /// Inspected
    I,
    /// Not inspected
    NI,
    /// Not present
    NP,
    /// Unrecognized status value; renders with no box checked
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub name: String,
    pub title: String,
    pub inspection_status: Option<InspectionStatus>,
    pub is_deficient: bool,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Comment {
    pub label: String,
    pub value: Option<serde_json::Value>,
    pub photos: Vec<Photo>,
}

impl Comment {
    /// Comment value rendered as display text.
    ///
    /// Values are usually strings but the schema does not promise it;
    /// non-string values fall back to their JSON rendering.
    pub fn value_text(&self) -> Option<String> {
        match &self.value {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Photo {
    pub url: Option<String>,
    pub caption: Option<String>,
}
