//! Dated index-name template.
//!
//! Index names may contain `%y`, `%m` and `%d` placeholders which are
//! resolved per document from the document's own timestamp, so replayed
//! historical records land in the historically correct partition rather
//! than the partition of the scrape run.

use chrono::{DateTime, Datelike, Utc};

/// An index-name template with date placeholders.
///
/// Recognized placeholders: `%y` (4-digit year), `%m` (2-digit month),
/// `%d` (2-digit day). Each is replaced globally, left to right; any other
/// text passes through unchanged.
#[derive(Debug, Clone)]
pub struct IndexTemplate {
    template: String,
}

impl IndexTemplate {
    /// Create a template from its raw string form.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Render the index name for a document with the given timestamp.
    pub fn render(&self, timestamp: &DateTime<Utc>) -> String {
        self.template
            .replace("%y", &format!("{:04}", timestamp.year()))
            .replace("%m", &format!("{:02}", timestamp.month()))
            .replace("%d", &format!("{:02}", timestamp.day()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_render_year_month() {
        let template = IndexTemplate::new("pagerduty-%y-%m");
        assert_eq!(template.render(&ts()), "pagerduty-2023-06");
    }

    #[test]
    fn test_render_all_placeholders() {
        let template = IndexTemplate::new("pagerduty-%y.%m.%d");
        assert_eq!(template.render(&ts()), "pagerduty-2023.06.15");
    }

    #[test]
    fn test_placeholders_replaced_globally() {
        let template = IndexTemplate::new("%y-%y");
        assert_eq!(template.render(&ts()), "2023-2023");
    }

    #[test]
    fn test_unrecognized_placeholders_pass_through() {
        let template = IndexTemplate::new("pagerduty-%x-%m");
        assert_eq!(template.render(&ts()), "pagerduty-%x-06");
    }

    #[test]
    fn test_literal_template_is_unchanged() {
        let template = IndexTemplate::new("pagerduty");
        assert_eq!(template.render(&ts()), "pagerduty");
    }

    #[test]
    fn test_rendering_rendered_output_is_idempotent() {
        let template = IndexTemplate::new("pagerduty-%y-%m");
        let rendered = template.render(&ts());
        let again = IndexTemplate::new(rendered.clone()).render(&ts());
        assert_eq!(rendered, again);
    }

    #[test]
    fn test_single_digit_fields_are_zero_padded() {
        let early = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let template = IndexTemplate::new("pd-%y-%m-%d");
        assert_eq!(template.render(&early), "pd-2024-01-05");
    }
}
