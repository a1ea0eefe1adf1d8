//! `{{placeholder}}` substitution for email templates.

use std::collections::HashMap;

/// Replace every `{{key}}` occurrence with its value from `data`.
/// Whitespace inside the braces is tolerated (`{{ alertName }}`).
/// Unknown placeholders are left in place so a typo is visible in the
/// delivered mail rather than silently dropped.
pub fn render(template: &str, data: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match data.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(&after[..end]);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Build the standard substitution set for a triggered alert.
pub fn alert_data(
    alert_name: &str,
    alert_time: &str,
    threshold_value: &str,
    notes: &str,
) -> HashMap<String, String> {
    HashMap::from([
        ("alertName".to_string(), alert_name.to_string()),
        ("alertTime".to_string(), alert_time.to_string()),
        ("thresholdValue".to_string(), threshold_value.to_string()),
        ("notes".to_string(), notes.to_string()),
    ])
}
