//! Rows for the pending verification documents panel.

use chrono::NaiveDateTime;
use serde::Deserialize;

/// One document awaiting admin review, from `/admin/documents/pending`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PendingDocument {
    #[serde(default)]
    pub user_name: String,
    #[serde(default, rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub submitted_date: String,
}

impl PendingDocument {
    /// Submission timestamp formatted for the table.
    ///
    /// The backend emits either RFC 3339 or a plain `YYYY-MM-DD HH:MM:SS`
    /// string depending on the route; anything else is shown as-is.
    pub fn submitted(&self) -> String {
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&self.submitted_date) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(&self.submitted_date, "%Y-%m-%d %H:%M:%S") {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
        self.submitted_date.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_with_type_keyword_field() {
        let doc: PendingDocument = serde_json::from_value(json!({
            "id": "42_resume",
            "user_name": "Jose Cruz",
            "type": "resume",
            "submitted_date": "2026-07-30T09:15:00+08:00"
        }))
        .unwrap();

        assert_eq!(doc.doc_type, "resume");
        assert_eq!(doc.submitted(), "2026-07-30 09:15");
    }

    #[test]
    fn formats_plain_datetime_strings() {
        let doc = PendingDocument {
            submitted_date: "2026-07-30 09:15:00".to_string(),
            ..PendingDocument::default()
        };
        assert_eq!(doc.submitted(), "2026-07-30 09:15");
    }

    #[test]
    fn unparseable_dates_pass_through() {
        let doc = PendingDocument {
            submitted_date: "yesterday".to_string(),
            ..PendingDocument::default()
        };
        assert_eq!(doc.submitted(), "yesterday");
    }
}
