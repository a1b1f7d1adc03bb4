//! Template placeholder substitution
//!
//! The shipped `report.tex` template carries named placeholders for the
//! report header fields plus a content marker where the generated body is
//! spliced in.

use crate::models::InspectionDocument;
use crate::render::latex::{escape_latex, format_timestamp};

/// Marker line in the template replaced by the generated report body
pub const CONTENT_MARKER: &str = "% --- REPORT CONTENT MARKER ---";

/// Fill the header placeholders from the inspection document.
///
/// Fields the upload schema does not carry (TREC license, sponsor,
/// weather conditions) keep fixed defaults so the form renders complete.
pub fn populate_header(template: &str, doc: &InspectionDocument) -> String {
    let inspection = &doc.inspection;

    let replacements = [
        ("% REPORT_BUYER_NAME %", escape_latex(&inspection.client_info.name)),
        ("% REPORT_INSPECTION_DATE %", format_timestamp(inspection.schedule.date)),
        ("% REPORT_PROPERTY_ADDRESS %", escape_latex(&inspection.address.full_address)),
        ("% REPORT_INSPECTOR_NAME %", escape_latex(&inspection.inspector.name)),
        ("% REPORT_TREC_LICENSE %", String::new()),
        ("% REPORT_SPONSOR_NAME %", String::new()),
        ("% REPORT_SPONSOR_LICENSE %", String::new()),
        ("% REPORT_OCCUPANCY %", "Occupied".to_string()),
        ("% REPORT_ATTENDANCE %", "Buyer".to_string()),
        ("% REPORT_TEMPERATURE %", "70 to 80".to_string()),
        ("% REPORT_BUILDING_TYPE %", "Single Family".to_string()),
        ("% REPORT_WEATHER %", "Clear".to_string()),
        ("% REPORT_ORIENTATION %", "North".to_string()),
        ("% REPORT_INACCESSIBLE %", String::new()),
        ("% REPORT_ADDITIONAL_INFO %", String::new()),
    ];

    let mut content = template.to_string();
    for (placeholder, value) in replacements {
        content = content.replace(placeholder, &value);
    }
    content
}

/// Splice the generated body at the content marker.
///
/// Returns `None` when the template carries no marker, which would
/// otherwise produce a report with no body.
pub fn splice_content(template: &str, body: &str) -> Option<String> {
    if !template.contains(CONTENT_MARKER) {
        return None;
    }
    Some(template.replace(CONTENT_MARKER, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InspectionDocument;

    fn sample_doc() -> InspectionDocument {
        serde_json::from_str(
            r#"{
                "inspection": {
                    "clientInfo": {"name": "Jane & Co"},
                    "address": {"fullAddress": "123 Main St"},
                    "inspector": {"name": "Sam Inspector"},
                    "schedule": {}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_populate_header_replaces_and_escapes() {
        let template = "Buyer: % REPORT_BUYER_NAME %\nAddress: % REPORT_PROPERTY_ADDRESS %";
        let filled = populate_header(template, &sample_doc());
        assert!(filled.contains(r"Buyer: Jane \& Co"));
        assert!(filled.contains("Address: 123 Main St"));
        assert!(!filled.contains("% REPORT_BUYER_NAME %"));
    }

    #[test]
    fn test_populate_header_defaults() {
        let template = "% REPORT_OCCUPANCY %|% REPORT_WEATHER %|% REPORT_TREC_LICENSE %";
        let filled = populate_header(template, &sample_doc());
        assert_eq!(filled, "Occupied|Clear|");
    }

    #[test]
    fn test_splice_content() {
        let template = format!("\\begin{{document}}\n{}\n\\end{{document}}", CONTENT_MARKER);
        let spliced = splice_content(&template, "BODY").unwrap();
        assert!(spliced.contains("BODY"));
        assert!(!spliced.contains(CONTENT_MARKER));

        assert!(splice_content("\\begin{document}\\end{document}", "BODY").is_none());
    }
}
