use serde::{Deserialize, Serialize};

/// The daily problem as scraped from the listing page.
///
/// Serializes to the flat webhook payload
/// `{"questionName", "questionUrl", "questionDifficulty"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    #[serde(rename = "questionName")]
    pub name: String,
    #[serde(rename = "questionUrl")]
    pub url: String,
    #[serde(rename = "questionDifficulty")]
    pub difficulty: String,
}
