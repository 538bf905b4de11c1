//! Rows for the user administration panel.

use ratatui::style::Color;
use serde::Deserialize;

/// One registered platform user, as returned by `/admin/users/list`.
///
/// Every field is defaulted: the backend omits document paths for users who
/// never uploaded anything, and a half-filled profile must still render as a
/// row rather than poisoning the whole table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserRow {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub resume_path: Option<String>,
    #[serde(default)]
    pub permit_path: Option<String>,
    #[serde(default)]
    pub verification_status: String,
}

impl UserRow {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn has_resume(&self) -> bool {
        self.resume_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_permit(&self) -> bool {
        self.permit_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Colour for a verification status badge.
///
/// Unknown statuses get a neutral colour rather than an error.
pub fn status_color(status: &str) -> Color {
    match status.to_lowercase().as_str() {
        "pending" => Color::Yellow,
        "verified" => Color::Green,
        "rejected" => Color::Red,
        _ => Color::DarkGray,
    }
}
