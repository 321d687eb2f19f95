//! Job listing types. Listings are supplied by upstream layers (live API or
//! static dataset); the match engine only reads title, company, and
//! description and passes everything else through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A job listing as received from the upstream job source.
///
/// `title`, `company`, and `description` are the minimum shape scoring
/// depends on; identifiers, location, and any extra provider fields ride
/// along via the flattened map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
