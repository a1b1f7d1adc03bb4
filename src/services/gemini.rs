//! Gemini API client
//!
//! AI analysis of inspection documents with minimal API usage: one call
//! for the executive summary and one for deficiency categorization. Both
//! calls degrade to `None` on failure; the analysis endpoint never fails
//! because the model did.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::InspectionDocument;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const USER_AGENT: &str = concat!("trec-report/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Deficiencies sent for categorization are capped to bound token usage
const MAX_CATEGORIZED_DEFICIENCIES: usize = 30;

/// Gemini client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Deficiencies categorized by priority
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DeficiencyCategories {
    #[serde(default)]
    pub safety: Vec<String>,
    #[serde(default)]
    pub urgent: Vec<String>,
    #[serde(default)]
    pub routine: Vec<String>,
}

/// Combined AI analysis returned by the analyze endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisInsights {
    pub has_ai_analysis: bool,
    pub executive_summary: String,
    pub deficiency_categories: DeficiencyCategories,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_summary: Option<String>,
}

/// One deficient line item flattened for prompting
#[derive(Debug, Clone)]
struct Deficiency {
    section: String,
    item: String,
    title: String,
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, GeminiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    /// Generate a brief executive summary of the whole inspection.
    ///
    /// Single API call. Errors degrade to `None`.
    pub async fn executive_summary(&self, doc: &InspectionDocument) -> Option<String> {
        let prompt = build_summary_prompt(doc);
        match self.generate(prompt).await {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Gemini executive summary failed");
                None
            }
        }
    }

    /// Categorize all deficient items into safety / urgent / routine.
    ///
    /// Single API call; skipped entirely when the document carries no
    /// deficiencies. Errors degrade to `None`.
    pub async fn categorize_deficiencies(
        &self,
        doc: &InspectionDocument,
    ) -> Option<DeficiencyCategories> {
        let deficiencies = collect_deficiencies(doc);
        if deficiencies.is_empty() {
            return Some(DeficiencyCategories::default());
        }

        let prompt = build_categorization_prompt(&deficiencies);
        let text = match self.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Gemini deficiency categorization failed");
                return None;
            }
        };

        match extract_json_object(&text).and_then(|json| serde_json::from_str(json).ok()) {
            Some(categories) => Some(categories),
            None => {
                tracing::warn!("Gemini categorization response carried no parseable JSON");
                None
            }
        }
    }

    async fn generate(&self, prompt: String) -> Result<String, GeminiError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, GEMINI_MODEL, self.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::ApiError(
                status.as_u16(),
                body.chars().take(200).collect(),
            ));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::ParseError(e.to_string()))?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Merge the two analysis results. No API call, just formatting.
pub fn compose_insights(
    executive_summary: Option<String>,
    categories: Option<DeficiencyCategories>,
) -> AnalysisInsights {
    let has_ai_analysis = executive_summary.is_some() || categories.is_some();

    let priority_summary = categories.as_ref().map(|c| {
        format!(
            "• {} Safety Concern{}\n• {} Urgent Issue{}\n• {} Routine Maintenance Item{}",
            c.safety.len(),
            plural_s(c.safety.len()),
            c.urgent.len(),
            plural_s(c.urgent.len()),
            c.routine.len(),
            plural_s(c.routine.len()),
        )
    });

    AnalysisInsights {
        has_ai_analysis,
        executive_summary: executive_summary.unwrap_or_default(),
        deficiency_categories: categories.unwrap_or_default(),
        priority_summary,
    }
}

fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn collect_deficiencies(doc: &InspectionDocument) -> Vec<Deficiency> {
    let mut deficiencies = Vec::new();
    for section in &doc.inspection.sections {
        for item in &section.line_items {
            if item.is_deficient {
                deficiencies.push(Deficiency {
                    section: section.name.clone(),
                    item: item.name.clone(),
                    title: item.title.clone(),
                });
            }
        }
    }
    deficiencies
}

fn build_summary_prompt(doc: &InspectionDocument) -> String {
    let full_address = if doc.inspection.address.full_address.is_empty() {
        "Unknown Address".to_string()
    } else {
        doc.inspection.address.full_address.clone()
    };

    let mut total_items = 0;
    let mut deficient_items = 0;
    // BTreeMap keeps section ordering stable across runs
    let mut by_section: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for section in &doc.inspection.sections {
        for item in &section.line_items {
            total_items += 1;
            if item.is_deficient {
                deficient_items += 1;
                by_section
                    .entry(section.name.clone())
                    .or_default()
                    .push(item.name.clone());
            }
        }
    }

    let deficiency_lines = if by_section.is_empty() {
        "No deficiencies found.".to_string()
    } else {
        by_section
            .iter()
            .take(10)
            .map(|(section, items)| {
                let names: Vec<&str> = items.iter().take(5).map(String::as_str).collect();
                format!("• {} ({} items): {}", section, items.len(), names.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Analyze this property inspection and provide a brief executive summary \
         (2-3 paragraphs, max 150 words):\n\n\
         Property: {full_address}\n\
         Total Items Inspected: {total_items}\n\
         Items with Deficiencies: {deficient_items}\n\n\
         Deficient Items by Section:\n{deficiency_lines}\n\n\
         Provide:\n\
         1. Overall property condition assessment based on the number and types of deficiencies\n\
         2. Top 3 priority areas/sections with issues\n\
         3. General recommendation (move-in ready, minor repairs needed, major concerns, etc.)\n\n\
         Keep it professional, concise, and actionable for homebuyers. Base your analysis \
         on the inspection structure, not specific comments."
    )
}

fn build_categorization_prompt(deficiencies: &[Deficiency]) -> String {
    let listed: Vec<String> = deficiencies
        .iter()
        .take(MAX_CATEGORIZED_DEFICIENCIES)
        .enumerate()
        .map(|(i, d)| {
            let item_name = if d.title.is_empty() { &d.item } else { &d.title };
            format!("{}. {} - {}", i + 1, d.section, item_name)
        })
        .collect();

    format!(
        "Categorize these {count} property inspection deficiencies into:\n\
         1. SAFETY (immediate safety hazards - electrical, structural, fire hazards, etc.)\n\
         2. URGENT (needs attention within 30 days - water damage, HVAC issues, major repairs)\n\
         3. ROUTINE (can wait 30+ days - cosmetic issues, minor maintenance)\n\n\
         Deficiencies (by section and item name only):\n{list}\n\n\
         Respond ONLY with JSON format:\n\
         {{\"safety\": [\"Section - Item\"], \"urgent\": [\"Section - Item\"], \"routine\": [\"Section - Item\"]}}\n\n\
         Use format \"Section - Item\" for each entry. Base categorization on the item names \
         and section context, not on specific comment details.",
        count = deficiencies.len(),
        list = listed.join("\n"),
    )
}

/// Extract the outermost JSON object from model text (models wrap JSON in
/// prose or code fences despite instructions).
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_deficiencies() -> InspectionDocument {
        serde_json::from_str(
            r#"{"inspection": {
                "address": {"fullAddress": "123 Main St"},
                "sections": [
                    {"name": "Electrical", "lineItems": [
                        {"name": "panel", "title": "Service Panel", "isDeficient": true},
                        {"name": "outlets", "title": "Outlets", "isDeficient": false}
                    ]},
                    {"name": "Plumbing", "lineItems": [
                        {"name": "drains", "title": "", "isDeficient": true}
                    ]}
                ]
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_collect_deficiencies() {
        let deficiencies = collect_deficiencies(&doc_with_deficiencies());
        assert_eq!(deficiencies.len(), 2);
        assert_eq!(deficiencies[0].section, "Electrical");
        assert_eq!(deficiencies[0].title, "Service Panel");
    }

    #[test]
    fn test_summary_prompt_contents() {
        let prompt = build_summary_prompt(&doc_with_deficiencies());
        assert!(prompt.contains("Property: 123 Main St"));
        assert!(prompt.contains("Total Items Inspected: 3"));
        assert!(prompt.contains("Items with Deficiencies: 2"));
        assert!(prompt.contains("• Electrical (1 items): panel"));
    }

    #[test]
    fn test_summary_prompt_unknown_address() {
        let prompt = build_summary_prompt(&InspectionDocument::default());
        assert!(prompt.contains("Property: Unknown Address"));
        assert!(prompt.contains("No deficiencies found."));
    }

    #[test]
    fn test_categorization_prompt_prefers_title() {
        let deficiencies = collect_deficiencies(&doc_with_deficiencies());
        let prompt = build_categorization_prompt(&deficiencies);
        assert!(prompt.contains("1. Electrical - Service Panel"));
        // Empty title falls back to the item name
        assert!(prompt.contains("2. Plumbing - drains"));
        assert!(prompt.contains("Respond ONLY with JSON"));
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(
            extract_json_object("Here you go:\n```json\n{\"safety\": []}\n```"),
            Some("{\"safety\": []}")
        );
        assert_eq!(extract_json_object("{\"a\": 1}"), Some("{\"a\": 1}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_categories_parse_with_missing_keys() {
        let categories: DeficiencyCategories =
            serde_json::from_str(r#"{"safety": ["Electrical - Service Panel"]}"#).unwrap();
        assert_eq!(categories.safety.len(), 1);
        assert!(categories.urgent.is_empty());
        assert!(categories.routine.is_empty());
    }

    #[test]
    fn test_compose_insights_pluralization() {
        let categories = DeficiencyCategories {
            safety: vec!["a".into()],
            urgent: vec!["b".into(), "c".into()],
            routine: vec![],
        };
        let insights = compose_insights(Some("Summary.".into()), Some(categories));
        assert!(insights.has_ai_analysis);
        let priority = insights.priority_summary.unwrap();
        assert!(priority.contains("1 Safety Concern\n"));
        assert!(priority.contains("2 Urgent Issues\n"));
        assert!(priority.contains("0 Routine Maintenance Items"));
    }

    #[test]
    fn test_compose_insights_empty() {
        let insights = compose_insights(None, None);
        assert!(!insights.has_ai_analysis);
        assert_eq!(insights.executive_summary, "");
        assert!(insights.priority_summary.is_none());
    }
}
