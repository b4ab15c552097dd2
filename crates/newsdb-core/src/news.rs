use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized article ready to be handed to the store.
///
/// `link` is the natural key. Optional fields are `None` when absent and are
/// never represented by an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsCandidate {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn absent_fields_serialize_as_null() {
        let candidate = NewsCandidate {
            title: "Headline".to_string(),
            description: None,
            link: "https://example.com/a".to_string(),
            image: None,
            published_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            category: None,
        };
        let json = serde_json::to_value(&candidate).expect("serialize");
        assert!(json["description"].is_null());
        assert!(json["image"].is_null());
        assert!(json["category"].is_null());
        assert_eq!(json["published_at"], "2026-03-01T12:00:00Z");
    }
}
