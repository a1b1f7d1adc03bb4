//! Fixed report pages: title page and TREC form page

use crate::models::InspectionDocument;
use crate::render::latex::{escape_latex, format_timestamp};

macro_rules! lines {
    ($page:ident, $($line:expr),+ $(,)?) => {
        $($page.push(String::from($line));)+
    };
}

/// Generate the title page (page 1).
///
/// The two illustration images referenced here (`obstruction.png`,
/// `scope.png`) are static assets the pipeline copies from the template
/// directory into the scratch directory before compiling.
pub fn title_page(doc: &InspectionDocument) -> String {
    let inspection = &doc.inspection;

    let client_name = escape_latex(&inspection.client_info.name);
    let full_address = escape_latex(&inspection.address.full_address);
    let inspector_name = escape_latex(&inspection.inspector.name);
    let inspector_email = escape_latex(&inspection.inspector.email);
    let inspection_date = format_timestamp(inspection.schedule.date);

    let (agent_name, agent_company) = match inspection.agents.first() {
        Some(entry) => (
            escape_latex(&entry.agent.name),
            escape_latex(&entry.agent.company.name),
        ),
        None => (String::new(), String::new()),
    };
    let square_footage = inspection.booking_form_data.property_info.square_footage;

    let mut page: Vec<String> = Vec::new();

    lines!(
        page,
        r"\thispagestyle{empty}",
        "",
        r"\begin{center}",
        r"\vspace*{2cm}",
        r"\textbf{\Huge PROPERTY INSPECTION REPORT}",
        r"\vspace{1cm}",
        "",
        r"\hrule",
        r"\vspace{0.5cm}",
        "",
        r"\textbf{\Large Prepared For:}",
        "",
    );
    page.push(format!(r"\textbf{{\large {}}}", client_name));
    lines!(
        page,
        r"\vspace{0.5cm}",
        "",
        r"\textbf{\Large Concerning:}",
        "",
    );
    page.push(format!(r"\textbf{{\large {}}}", full_address));
    lines!(
        page,
        r"\vspace{0.5cm}",
        "",
        r"\hrule",
        r"\vspace{1cm}",
        "",
        r"\textbf{\Large By:}",
        "",
    );
    page.push(format!(r"\textbf{{\large {}}}", inspector_name));

    if !inspector_email.is_empty() {
        lines!(page, r"\vspace{0.3cm}", "");
        page.push(format!(r"\textbf{{Email:}} {}", inspector_email));
    }

    lines!(
        page,
        r"\vspace{1cm}",
        "",
        r"\textbf{\Large Date of Inspection:}",
        "",
    );
    page.push(format!(r"\textbf{{\large {}}}", inspection_date));

    if !agent_name.is_empty() {
        lines!(page, r"\vspace{1cm}", "");
        page.push(format!(r"\textbf{{Real Estate Agent:}} {}", agent_name));
        if !agent_company.is_empty() {
            lines!(page, "");
            page.push(format!(r"\textbf{{Company:}} {}", agent_company));
        }
    }

    if square_footage > 0 {
        lines!(page, r"\vspace{0.5cm}", "");
        page.push(format!(
            r"\textbf{{Approximate Square Footage:}} {} sq ft",
            group_thousands(square_footage)
        ));
    }

    lines!(
        page,
        r"\vspace{1.5cm}",
        "",
        r"\begin{minipage}{0.48\textwidth}",
        r"\centering",
        r"\includegraphics[width=\textwidth, height=2.5in, keepaspectratio]{obstruction.png}",
        r"\textit{\small Obstructed area example}",
        r"\end{minipage}",
        r"\hfill",
        r"\begin{minipage}{0.48\textwidth}",
        r"\centering",
        r"\includegraphics[width=\textwidth, height=2.5in, keepaspectratio]{scope.png}",
        r"\textit{\small \\ Scope and Limitations}",
        r"\end{minipage}",
        r"\end{center}",
        r"\clearpage",
        "",
    );

    page.join("\n")
}

/// Generate the TREC form page (page 2): the identification table plus the
/// purpose-of-inspection and responsibility boilerplate mandated by the
/// form layout.
pub fn trec_form_page(doc: &InspectionDocument) -> String {
    let inspection = &doc.inspection;

    let client_name = escape_latex(&inspection.client_info.name);
    let full_address = escape_latex(&inspection.address.full_address);
    let inspector_name = escape_latex(&inspection.inspector.name);
    let inspection_date = format_timestamp(inspection.schedule.date);

    let mut page: Vec<String> = Vec::new();

    lines!(
        page,
        r"\thispagestyle{empty}",
        "",
        r"\noindent",
        r"\begin{tabular}{|p{0.45\textwidth}|p{0.45\textwidth}|}",
        r"\hline",
        r"\textbf{Buyer Name} & \textbf{Date of Inspection} \\",
    );
    page.push(format!(r"{} & {} \\", client_name, inspection_date));
    lines!(
        page,
        r"\hline",
        r"\multicolumn{2}{|p{0.93\textwidth}|}{\textbf{Address of Inspected Property}} \\",
    );
    page.push(format!(
        r"\multicolumn{{2}}{{|p{{0.93\textwidth}}|}}{{{}}} \\",
        full_address
    ));
    lines!(
        page,
        r"\hline",
        r"\textbf{Name of Inspector} & \textbf{TREC License \#} \\",
    );
    page.push(format!(r"{} &  \\", inspector_name));
    lines!(
        page,
        r"\hline",
        r"\textbf{Name of Sponsor (if applicable)} & \textbf{TREC License \#} \\",
        r" &  \\",
        r"\hline",
        r"\end{tabular}",
        "",
        r"\vspace{1em}",
        "",
        r"\begin{center}",
        r"\textbf{\Large PROPERTY INSPECTION REPORT FORM}",
        r"\end{center}",
        "",
        r"\vspace{1em}",
        "",
        r"\subsection*{PURPOSE OF INSPECTION}",
        "A real estate inspection is a visual survey of a structure and a basic performance \
         evaluation of the systems and components of a building. It provides information \
         regarding the general condition of a residence at the time the inspection was conducted.",
        "",
        "It is important that you carefully read ALL of this information. Ask the inspector \
         to clarify any items or comments that are unclear.",
        "",
        r"\subsection*{RESPONSIBILITY OF THE INSPECTOR}",
        "This inspection is governed by the Texas Real Estate Commission (TREC) Standards of \
         Practice (SOPs), which dictates the minimum requirements for a real estate inspection.",
        "",
        r"\noindent\textbf{The inspector IS required to:}",
        r"\begin{itemize}",
        r"\setlength{\itemsep}{0pt}",
        r"\setlength{\parskip}{0pt}",
        r"\item use this Property Inspection Report form for the inspection;",
        r"\item inspect only those components and conditions that are present, visible, and accessible at the time of the inspection;",
        r"\item indicate whether each item was inspected, not inspected, or not present;",
        r"\item indicate an item as Deficient (D) if a condition exists that adversely and materially affects the performance of a system or component OR constitutes a hazard to life, limb or property as specified by the SOPs; and",
        r"\item explain the inspector's findings in the corresponding section in the body of the report form.",
        r"\end{itemize}",
        "",
        r"\noindent\textbf{The inspector IS NOT required to:}",
        r"\begin{itemize}",
        r"\setlength{\itemsep}{0pt}",
        r"\setlength{\parskip}{0pt}",
        r"\item identify all potential hazards;",
        r"\item turn on decommissioned equipment, systems, utilities, or apply an open flame or light a pilot to operate any appliance;",
        r"\item climb over obstacles, move furnishings or stored items;",
        r"\item prioritize or emphasize the importance of one deficiency over another;",
        r"\item provide follow-up services to verify that proper repairs have been made; or",
        r"\item inspect system or component listed under the optional section of the SOPs (22 TAC 535.233).",
        r"\end{itemize}",
        "",
        r"\subsection*{RESPONSIBILITY OF THE CLIENT}",
        "While items identified as Deficient (D) in an inspection report DO NOT obligate any \
         party to make repairs or take other actions, in the event that any further evaluations \
         are needed, it is the responsibility of the client to obtain further evaluations and/or \
         cost estimates from qualified service professionals regarding any items reported as \
         Deficient (D). It is recommended that any further evaluations and/or cost estimates \
         take place prior to the expiration of any contractual time limitations, such as option \
         periods.",
        "",
        r"\noindent\textbf{Please Note:} Evaluations performed by service professionals in response to items reported as Deficient (D) on the report may lead to the discovery of additional deficiencies that were not present, visible, or accessible at the time of the inspection. Any repairs made after the date of the inspection may render information contained in this report obsolete or invalid.",
        "",
        r"\clearpage",
        "",
    );

    page.join("\n")
}

/// Format an integer with thousands separators (2150 → "2,150")
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InspectionDocument;

    fn doc_from(json: &str) -> InspectionDocument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(2150), "2,150");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_title_page_optional_blocks() {
        let bare = title_page(&doc_from(r#"{"inspection": {}}"#));
        assert!(!bare.contains("Real Estate Agent"));
        assert!(!bare.contains("Square Footage"));
        assert!(!bare.contains("Email"));

        let full = title_page(&doc_from(
            r#"{"inspection": {
                "inspector": {"name": "Sam", "email": "sam@example.com"},
                "agents": [{"agent": {"name": "Alex", "company": {"name": "Realty Co"}}}],
                "bookingFormData": {"propertyInfo": {"squareFootage": 2150}}
            }}"#,
        ));
        assert!(full.contains(r"\textbf{Real Estate Agent:} Alex"));
        assert!(full.contains(r"\textbf{Company:} Realty Co"));
        assert!(full.contains("2,150 sq ft"));
        assert!(full.contains("sam@example.com"));
    }

    #[test]
    fn test_trec_form_page_table() {
        let page = trec_form_page(&doc_from(
            r#"{"inspection": {
                "clientInfo": {"name": "Jane Buyer"},
                "address": {"fullAddress": "123 Main St"}
            }}"#,
        ));
        assert!(page.contains("Jane Buyer"));
        assert!(page.contains("123 Main St"));
        assert!(page.contains("PURPOSE OF INSPECTION"));
        assert!(page.contains("RESPONSIBILITY OF THE CLIENT"));
        assert!(page.ends_with("\\clearpage\n"));
    }
}
