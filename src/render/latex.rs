//! LaTeX text helpers: escaping, numbering, checkbox cells, dates

use crate::models::InspectionStatus;
use chrono::{Local, TimeZone};

/// Escape LaTeX special characters in user-supplied text.
///
/// Single pass so replacement output is never re-escaped.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '_' => out.push_str(r"\_"),
            '%' => out.push_str(r"\%"),
            '&' => out.push_str(r"\&"),
            '#' => out.push_str(r"\#"),
            '$' => out.push_str(r"\$"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '^' => out.push_str(r"\^{}"),
            '~' => out.push_str(r"\~{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Convert a positive integer to a Roman numeral (section numbering).
pub fn to_roman(mut n: usize) -> String {
    const VALUES: [(usize, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (value, symbol) in VALUES {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// Letter label for a line item: 0 → "A", 1 → "B", ...
///
/// Wraps past "Z" into "AA", "AB", ... so oversized sections stay labeled.
pub fn item_letter(index: usize) -> String {
    let mut out = String::new();
    let mut n = index;
    loop {
        out.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out
}

/// The four I / NI / NP / D checkbox cells for a line item row.
///
/// A deficient item checks D regardless of its inspection status.
pub fn checkbox_cells(status: Option<InspectionStatus>, is_deficient: bool) -> String {
    const EMPTY: &str = r"$\square$";
    const CHECKED: &str = r"$\boxtimes$";

    let mut boxes = [EMPTY; 4];
    if is_deficient {
        boxes[3] = CHECKED;
    } else {
        match status {
            Some(InspectionStatus::I) => boxes[0] = CHECKED,
            Some(InspectionStatus::NI) => boxes[1] = CHECKED,
            Some(InspectionStatus::NP) => boxes[2] = CHECKED,
            Some(InspectionStatus::Other) | None => {}
        }
    }

    boxes.join(" & ")
}

/// Format an epoch-milliseconds timestamp as `MM/DD/YYYY HH:MMAM` local time.
///
/// Missing or out-of-range timestamps render as an empty string.
pub fn format_timestamp(timestamp_ms: Option<i64>) -> String {
    let Some(ms) = timestamp_ms else {
        return String::new();
    };
    match Local.timestamp_millis_opt(ms) {
        chrono::LocalResult::Single(dt) => dt.format("%m/%d/%Y %I:%M%p").to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_latex_specials() {
        assert_eq!(escape_latex("50% & up"), r"50\% \& up");
        assert_eq!(escape_latex("a_b #1 $5 {x} ^ ~"), r"a\_b \#1 \$5 \{x\} \^{} \~{}");
        assert_eq!(escape_latex(r"C:\temp"), r"C:\textbackslash{}temp");
        // The expansion of an escaped backslash must not itself get escaped
        assert!(!escape_latex("\\").contains(r"\{"));
    }

    #[test]
    fn test_escape_latex_plain_text_unchanged() {
        assert_eq!(escape_latex("Foundations look sound."), "Foundations look sound.");
        assert_eq!(escape_latex(""), "");
    }

    #[test]
    fn test_to_roman() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(9), "IX");
        assert_eq!(to_roman(14), "XIV");
        assert_eq!(to_roman(1994), "MCMXCIV");
    }

    #[test]
    fn test_item_letters() {
        assert_eq!(item_letter(0), "A");
        assert_eq!(item_letter(25), "Z");
        assert_eq!(item_letter(26), "AA");
        assert_eq!(item_letter(27), "AB");
    }

    #[test]
    fn test_checkbox_cells() {
        assert_eq!(
            checkbox_cells(Some(InspectionStatus::I), false),
            r"$\boxtimes$ & $\square$ & $\square$ & $\square$"
        );
        assert_eq!(
            checkbox_cells(Some(InspectionStatus::NP), false),
            r"$\square$ & $\square$ & $\boxtimes$ & $\square$"
        );
        // Deficient wins over status
        assert_eq!(
            checkbox_cells(Some(InspectionStatus::I), true),
            r"$\square$ & $\square$ & $\square$ & $\boxtimes$"
        );
        assert_eq!(
            checkbox_cells(None, false),
            r"$\square$ & $\square$ & $\square$ & $\square$"
        );
    }

    #[test]
    fn test_format_timestamp_missing() {
        assert_eq!(format_timestamp(None), "");
    }

    #[test]
    fn test_format_timestamp_shape() {
        // Local-timezone dependent, so only assert the shape
        let formatted = format_timestamp(Some(1700000000000));
        assert_eq!(formatted.len(), "11/14/2023 04:13PM".len());
        assert!(formatted.ends_with("AM") || formatted.ends_with("PM"));
    }
}
