use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// What a bookmark points at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkType {
    Hotel,
    Flight,
    Package,
}

impl BookmarkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkType::Hotel => "hotel",
            BookmarkType::Flight => "flight",
            BookmarkType::Package => "package",
        }
    }
}

impl std::fmt::Display for BookmarkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookmarkType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hotel" => Ok(BookmarkType::Hotel),
            "flight" => Ok(BookmarkType::Flight),
            "package" => Ok(BookmarkType::Package),
            other => Err(format!(
                "unknown bookmark type '{}' (expected hotel, flight or package)",
                other
            )),
        }
    }
}

/// A saved hotel, flight or package
///
/// Everything except `notes` is written once when the bookmark is created.
/// `name` and `description` are snapshots of the entity at that moment and
/// are never refreshed from it afterwards.
///
/// `created_at` is kept as the exact text that was stored, so rewriting the
/// collection never reformats it. Fields this version doesn't know about
/// end up in `extra` and are written back as they came.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BookmarkType,
    /// Id of the hotel/flight/package this points at
    pub reference_id: String,
    pub name: String,
    pub description: String,
    /// RFC 3339 timestamp, millisecond precision with a `Z` suffix
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bookmark {
    /// Snapshot an entity into a fresh bookmark with a new unique id
    pub fn from_entity<E: Bookmarkable + ?Sized>(entity: &E, notes: Option<String>) -> Self {
        Self {
            id: format!("bookmark-{}", uuid::Uuid::new_v4()),
            kind: entity.bookmark_type(),
            reference_id: entity.reference_id().to_string(),
            name: entity.display_name(),
            description: entity.display_description(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            notes,
            extra: Map::new(),
        }
    }

    /// `created_at` parsed, or `None` if the stored text isn't RFC 3339
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// True when this bookmark points at `(kind, reference_id)`
    pub fn refers_to(&self, kind: BookmarkType, reference_id: &str) -> bool {
        self.kind == kind && self.reference_id == reference_id
    }
}

/// Anything that can be bookmarked
///
/// The display strings are what the bookmark list shows later on, so they
/// have to make sense without the source entity around.
pub trait Bookmarkable {
    fn bookmark_type(&self) -> BookmarkType;
    fn reference_id(&self) -> &str;
    fn display_name(&self) -> String;
    fn display_description(&self) -> String;
}

/// Cities hotels are listed in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Makkah,
    Madinah,
    Jeddah,
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            City::Makkah => write!(f, "makkah"),
            City::Madinah => write!(f, "madinah"),
            City::Jeddah => write!(f, "jeddah"),
        }
    }
}

/// Nightly price range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

/// Hotel listing, trimmed to what bookmarking reads
///
/// Listings carry a lot more (address, amenities, reviews); those fields are
/// ignored on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub city: City,
    pub price_range: PriceRange,
}

impl Bookmarkable for Hotel {
    fn bookmark_type(&self) -> BookmarkType {
        BookmarkType::Hotel
    }

    fn reference_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn display_description(&self) -> String {
        format!(
            "{} - {}-{} {}",
            self.city, self.price_range.min, self.price_range.max, self.price_range.currency
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub price: f64,
    pub currency: String,
}

impl Bookmarkable for Flight {
    fn bookmark_type(&self) -> BookmarkType {
        BookmarkType::Flight
    }

    fn reference_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        format!("{} - {}", self.airline, self.flight_number)
    }

    fn display_description(&self) -> String {
        format!(
            "{} to {} - {} {}",
            self.departure_city, self.arrival_city, self.price, self.currency
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UmrahPackage {
    pub id: String,
    pub name: String,
    /// Length of the trip in days
    pub duration: u32,
    pub price: f64,
    pub currency: String,
}

impl Bookmarkable for UmrahPackage {
    fn bookmark_type(&self) -> BookmarkType {
        BookmarkType::Package
    }

    fn reference_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn display_description(&self) -> String {
        format!("{} days - {} {}", self.duration, self.price, self.currency)
    }
}

/// Type tab plus search box, as the bookmark list applies them
#[derive(Debug, Clone, Default)]
pub struct BookmarkFilter {
    /// `None` means every type
    pub kind: Option<BookmarkType>,
    /// Case-insensitive substring of name or description
    pub query: Option<String>,
}

impl BookmarkFilter {
    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        if let Some(kind) = self.kind {
            if bookmark.kind != kind {
                return false;
            }
        }

        match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                bookmark.name.to_lowercase().contains(&query)
                    || bookmark.description.to_lowercase().contains(&query)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hotel() -> Hotel {
        Hotel {
            id: "hotel-1".into(),
            name: "Al Safwah".into(),
            city: City::Makkah,
            price_range: PriceRange {
                min: 250.0,
                max: 500.0,
                currency: "USD".into(),
            },
        }
    }

    #[test]
    fn test_hotel_description_format() {
        assert_eq!(hotel().display_description(), "makkah - 250-500 USD");
    }

    #[test]
    fn test_flight_display_strings() {
        let flight = Flight {
            id: "flight-3".into(),
            airline: "Saudia".into(),
            flight_number: "SV 124".into(),
            departure_city: "London".into(),
            arrival_city: "Jeddah".into(),
            price: 749.99,
            currency: "GBP".into(),
        };
        assert_eq!(flight.display_name(), "Saudia - SV 124");
        assert_eq!(flight.display_description(), "London to Jeddah - 749.99 GBP");
    }

    #[test]
    fn test_package_description_format() {
        let pkg = UmrahPackage {
            id: "package-2".into(),
            name: "Economy Umrah".into(),
            duration: 10,
            price: 1800.0,
            currency: "USD".into(),
        };
        assert_eq!(pkg.display_description(), "10 days - 1800 USD");
    }

    #[test]
    fn test_entity_json_ignores_extra_fields() {
        let parsed: Hotel = serde_json::from_value(json!({
            "id": "hotel-1",
            "name": "Al Safwah",
            "description": "Steps from the Haram",
            "city": "makkah",
            "rating": 4.8,
            "amenities": ["wifi"],
            "priceRange": { "min": 250, "max": 500, "currency": "USD" }
        }))
        .unwrap();
        assert_eq!(parsed, hotel());
    }

    #[test]
    fn test_bookmark_json_layout() {
        let bookmark = Bookmark::from_entity(&hotel(), None);
        let value = serde_json::to_value(&bookmark).unwrap();

        assert_eq!(value["type"], "hotel");
        assert_eq!(value["referenceId"], "hotel-1");
        assert!(value.get("notes").is_none());

        let created_at = value["createdAt"].as_str().unwrap();
        assert!(created_at.ends_with('Z'));
        assert_eq!(created_at.rsplit('.').next().unwrap().len(), 4);
        assert!(bookmark.created_at_utc().is_some());
    }

    #[test]
    fn test_legacy_bookmark_loads() {
        let bookmark: Bookmark = serde_json::from_value(json!({
            "id": "bookmark-1712345678901",
            "type": "package",
            "referenceId": "package-1",
            "name": "Premium Umrah",
            "description": "14 days - 3500 USD",
            "createdAt": "2024-04-05T19:34:38.901Z",
            "notes": "ask about Ramadan dates"
        }))
        .unwrap();

        assert_eq!(bookmark.kind, BookmarkType::Package);
        assert_eq!(bookmark.notes.as_deref(), Some("ask about Ramadan dates"));
        assert_eq!(bookmark.created_at, "2024-04-05T19:34:38.901Z");
        assert!(bookmark.extra.is_empty());
    }

    #[test]
    fn test_unknown_fields_survive_a_rewrite() {
        let stored = json!({
            "id": "bookmark-1",
            "type": "hotel",
            "referenceId": "hotel-1",
            "name": "Al Safwah",
            "description": "makkah - 250-500 USD",
            "createdAt": "2024-03-01T08:00:00.000Z",
            "source": "search",
            "rank": 3
        });

        let bookmark: Bookmark = serde_json::from_value(stored.clone()).unwrap();
        assert_eq!(bookmark.extra.get("source"), Some(&json!("search")));
        assert_eq!(serde_json::to_value(&bookmark).unwrap(), stored);
    }

    #[test]
    fn test_ids_are_unique_under_rapid_creation() {
        let ids: std::collections::HashSet<String> = (0..1000)
            .map(|_| Bookmark::from_entity(&hotel(), None).id)
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_filter_by_type_and_query() {
        let bookmark = Bookmark::from_entity(&hotel(), None);

        assert!(BookmarkFilter::default().matches(&bookmark));
        assert!(BookmarkFilter {
            kind: Some(BookmarkType::Hotel),
            query: Some("SAFWAH".into()),
        }
        .matches(&bookmark));
        assert!(BookmarkFilter {
            kind: None,
            query: Some("250-500".into()),
        }
        .matches(&bookmark));
        assert!(!BookmarkFilter {
            kind: Some(BookmarkType::Flight),
            query: None,
        }
        .matches(&bookmark));
        assert!(!BookmarkFilter {
            kind: None,
            query: Some("madinah".into()),
        }
        .matches(&bookmark));
    }
}
