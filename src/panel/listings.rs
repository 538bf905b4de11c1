//! The business directory panel: rows and client-side filtering.
//!
//! `/api/search-businesses` returns a page of directory entries; the filter
//! here narrows them further without another round-trip, the same three-way
//! match the directory page applies: free-text query against name or
//! description, exact category, substring location. All comparisons are on
//! trimmed, lower-cased text.

use serde::Deserialize;

/// Envelope returned by `/api/search-businesses`: one page of entries plus
/// the total match count across all pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryPayload {
    #[serde(default)]
    pub businesses: Vec<Business>,
    #[serde(default)]
    pub total: u64,
}

/// One business-owner directory entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Business {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Client-side directory filter. Empty dimensions match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub query: String,
    pub category: String,
    pub location: String,
}

impl ListingFilter {
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.category.trim().is_empty()
            && self.location.trim().is_empty()
    }

    pub fn matches(&self, business: &Business) -> bool {
        let q = normalize(&self.query);
        let cat = normalize(&self.category);
        let loc = normalize(&self.location);

        let matches_query = q.is_empty()
            || normalize(&business.business_name).contains(&q)
            || normalize(&business.description).contains(&q);
        let matches_category = cat.is_empty() || normalize(&business.category) == cat;
        let matches_location = loc.is_empty() || normalize(&business.location).contains(&loc);

        matches_query && matches_category && matches_location
    }

    /// Borrowed view of the rows that pass the filter.
    pub fn apply<'a>(&self, rows: &'a [Business]) -> Vec<&'a Business> {
        rows.iter().filter(|b| self.matches(b)).collect()
    }
}

/// Distinct non-empty values of one field, sorted, for cycling a filter
/// dimension through what the data actually contains.
pub fn distinct_values<F>(rows: &[Business], field: F) -> Vec<String>
where
    F: Fn(&Business) -> &str,
{
    let mut values: Vec<String> = rows
        .iter()
        .map(|b| field(b).trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    values.sort();
    values.dedup();
    values
}

/// Step `current` through `values`: empty → first → … → last → empty.
pub fn cycle_value(values: &[String], current: &str) -> String {
    if values.is_empty() {
        return String::new();
    }
    match values.iter().position(|v| v == current) {
        None => values[0].clone(),
        Some(i) if i + 1 < values.len() => values[i + 1].clone(),
        Some(_) => String::new(),
    }
}
