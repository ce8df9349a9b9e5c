//! CSV export of the control list shown in reports.

use crate::models::Control;

pub const CSV_HEADER: &str = "Date,Patient,Type,Amount,Status";

/// Format integer cents as a plain decimal amount (`5000` -> `50.00`).
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

pub fn controls_csv(controls: &[Control]) -> String {
    let mut csv = String::new();
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for c in controls {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            c.scheduled_date.format("%Y-%m-%d"),
            escape_csv(&c.patient_display()),
            escape_csv(&c.control_type),
            format_cents(c.cost_cents.unwrap_or(0)),
            escape_csv(&c.status),
        ));
    }

    csv
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_formatting() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(-1250), "-12.50");
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_csv("Checkup"), "Checkup");
        assert_eq!(escape_csv("X-Ray, chest"), "\"X-Ray, chest\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
