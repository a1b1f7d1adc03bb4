//! Report body generation
//!
//! Builds the full LaTeX body: title page, TREC form page, header/footer
//! setup, then one section per inspection section with lettered line items
//! and their comment tables.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::models::{Comment, InspectionDocument, LineItem};
use crate::render::latex::{checkbox_cells, escape_latex, item_letter, to_roman};
use crate::render::pages;

const COMMENT_COLUMN: &str = r"p{0.65\textwidth}";

/// Generate the complete report body to splice at the template marker.
///
/// `images` maps photo URLs to their downloaded files in the scratch
/// directory; photos with no cache entry are skipped.
pub fn generate_body(doc: &InspectionDocument, images: &HashMap<String, PathBuf>) -> String {
    let mut body: Vec<String> = Vec::new();

    // Page 1: title, page 2: TREC form, then the running header/footer
    // starts with the numbered sections.
    body.push(pages::title_page(doc));
    body.push(pages::trec_form_page(doc));
    body.push(header_setup());

    for (i, section) in doc.inspection.sections.iter().enumerate() {
        let section_name = escape_latex(&section.name.to_uppercase());
        let section_num = to_roman(i + 1);

        body.push(format!(
            "\\section*{{\\centering {}. {}}}\n",
            section_num, section_name
        ));

        for (j, item) in section.line_items.iter().enumerate() {
            body.push(line_item_block(j, item, images));
            body.push(r"\vspace{1em}".to_string());
        }

        body.push(r"\clearpage".to_string());
    }

    body.join("\n")
}

/// Running header/footer for the numbered report pages: report
/// identification field, the I/NI/NP/D legend, and the TREC promulgation
/// footer with page numbering.
fn header_setup() -> String {
    [
        r"\pagestyle{fancy}",
        r"\fancyhf{}",
        "",
        r"\fancyhead[L]{%",
        r"    Report Identification: \TextField[name=reportid, width=3in, height=12pt, bordercolor={}, backgroundcolor={}, borderstyle=U, borderwidth=1]{} \\",
        r"    \textbf{I=Inspected \quad NI=Not Inspected \quad NP=Not Present \quad D=Deficient}",
        r"}",
        r"\renewcommand{\headrulewidth}{0pt}",
        "",
        r"\fancyfoot[L]{REI 7-6 (\mmddyyyydate\today)}",
        r"\fancyfoot[C]{}",
        r"\fancyfoot[R]{%",
        r"    Promulgated by the Texas Real Estate Commission \textbullet{}",
        r"    \href{tel:512-936-3000}{(512) 936-3000} \textbullet{}",
        r"    \href{https://www.trec.texas.gov}{www.trec.texas.gov}",
        r"}",
        r"\renewcommand{\footrule}{%",
        r"    \vspace{5pt}",
        r"    \begin{center}",
        r"        Page \thepage\ of \pageref{LastPage}",
        r"    \end{center}",
        r"    \vspace{2pt}",
        r"    \hrulefill",
        r"    \vspace{2pt}",
        r"}",
        "",
    ]
    .join("\n")
}

/// One lettered line item with its comment table.
///
/// Four comment scenarios:
/// 1. no comments, status set   → one-row checkbox table with "No comment"
/// 2. comments, status null     → bare comment values, no table
/// 3. no comments, status null  → bare "No comment"
/// 4. comments, status set      → full table with photos and values
fn line_item_block(index: usize, item: &LineItem, images: &HashMap<String, PathBuf>) -> String {
    let mut block: Vec<String> = Vec::new();

    let letter = item_letter(index);
    let title = escape_latex(&item.title);
    block.push(format!("\\subsection*{{{}. {}}}\n", letter, title));

    let checkboxes = checkbox_cells(item.inspection_status, item.is_deficient);
    let has_status = item.inspection_status.is_some();

    if item.comments.is_empty() && has_status {
        block.push(format!(
            "\\begin{{longtable}}{{c c c c {}}}",
            COMMENT_COLUMN
        ));
        block.push(table_header());
        block.push(format!("{} & No comment \\\\", checkboxes));
        block.push("\\end{longtable}\n".to_string());
    } else if !item.comments.is_empty() && !has_status {
        for comment in &item.comments {
            if let Some(value) = comment.value_text() {
                block.push(format!("{}\\\\\n", escape_latex(&value)));
            }
        }
        block.push("\\vspace{1em}\n".to_string());
    } else if item.comments.is_empty() {
        block.push("No comment\\\\\n".to_string());
        block.push("\\vspace{1em}\n".to_string());
    } else {
        block.push(format!(
            "\\begin{{longtable}}{{c c c c {}}}",
            COMMENT_COLUMN
        ));
        // Header repeats when the table spans pages
        block.push(table_header());

        for (k, comment) in item.comments.iter().enumerate() {
            let label = escape_latex(&format!("{}. {}", k + 1, comment.label));
            block.push(format!("{} & \\textbf{{{}}} \\\\", checkboxes, label));

            if let Some(row) = photo_row(comment, images) {
                block.push(row);
            }

            if let Some(value) = comment.value_text() {
                block.push(format!(
                    "\\multicolumn{{4}}{{c}}{{}} & {} \\\\[0.5em]",
                    escape_latex(&value)
                ));
            }
        }

        block.push("\\end{longtable}\n".to_string());
    }

    block.join("\n")
}

fn table_header() -> String {
    r"\textbf{I} & \textbf{NI} & \textbf{NP} & \textbf{D} & \textbf{Comments} \\ \hline \endhead"
        .to_string()
}

/// Render a comment's photos as a centered row in the comment column.
///
/// Returns `None` when no photo for this comment was downloaded.
fn photo_row(comment: &Comment, images: &HashMap<String, PathBuf>) -> Option<String> {
    let mut resolved: Vec<(String, Option<String>)> = Vec::new();

    for photo in &comment.photos {
        let Some(url) = photo.url.as_deref() else {
            continue;
        };
        match images.get(url) {
            Some(path) => {
                let filename = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default();
                resolved.push((format!("images/{}", filename), photo.caption.clone()));
            }
            None => {
                tracing::warn!(url, "Photo not in image cache, skipping");
            }
        }
    }

    if resolved.is_empty() {
        return None;
    }

    let (width, max_height) = photo_dimensions(resolved.len());

    let parts: Vec<String> = resolved
        .iter()
        .map(|(path, caption)| {
            let mut part = format!(
                "\\begin{{minipage}}[t]{{{w}}}\n\\centering\n\\includegraphics[width={w}, height={h}, keepaspectratio]{{{p}}}",
                w = width,
                h = max_height,
                p = path
            );
            if let Some(caption) = caption.as_deref().filter(|c| !c.is_empty()) {
                part.push_str(&format!(
                    "\n\\vspace{{0.1cm}} \\\\\n{{\\small\\itshape {}}}",
                    escape_latex(caption)
                ));
            }
            part.push_str("\n\\end{minipage}");
            part
        })
        .collect();

    Some(format!(
        "& & & & \\parbox{{\\linewidth}}{{\\centering {}}} \\\\[0.3em]",
        parts.join(" \\hspace{0.2cm} ")
    ))
}

/// Image width tiers so photo rows fit the comment column.
fn photo_dimensions(count: usize) -> (&'static str, &'static str) {
    match count {
        1 => ("3.0in", "2.5in"),
        2 => ("1.8in", "2.0in"),
        3 => ("1.3in", "1.8in"),
        _ => ("1.0in", "1.5in"),
    }
}
