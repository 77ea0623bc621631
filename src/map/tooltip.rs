//! Hover Tooltip
//! Formats the joined properties of a hovered ZIP shape into display lines.

use geojson::JsonObject;
use serde_json::Value;

/// Formatted text for the hover tooltip. Built only for scored features.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub zip: String,
    pub score: String,
    pub place: String,
    pub population: String,
    pub bachelors: String,
    pub income: String,
}

impl HoverInfo {
    /// Build the tooltip text from a feature's joined properties. Returns
    /// `None` when the feature carries no centile score.
    pub fn from_properties(zip: &str, properties: &JsonObject) -> Option<Self> {
        let score = properties.get("centileScore").and_then(Value::as_f64)?;

        let text = |key: &str| -> String {
            properties
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string()
        };
        let number = |key: &str| -> f64 {
            properties.get(key).and_then(Value::as_f64).unwrap_or(0.0)
        };

        Some(Self {
            zip: format!("ZIP: {}", zip),
            score: format!("Centile Score: {:.1}", score),
            place: format!("{}, {}", text("city"), text("state")),
            population: format!(
                "Population: {}",
                group_thousands(number("population").max(0.0).round() as u64)
            ),
            bachelors: format!("Bachelor's Degree: {:.1}%", number("bachelorsPct")),
            income: format!(
                "Median Income: ${}k",
                group_thousands(number("medianIncome").max(0.0).round() as u64)
            ),
        })
    }

    pub fn lines(&self) -> [&str; 6] {
        [
            &self.zip,
            &self.score,
            &self.place,
            &self.population,
            &self.bachelors,
            &self.income,
        ]
    }
}

/// Format an integer with comma group separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn joined_properties() -> JsonObject {
        let value = json!({
            "zip": "12345",
            "centileScore": 62.3,
            "city": "Springfield",
            "state": "IL",
            "population": 50000,
            "bachelorsPct": 35.0,
            "medianIncome": 55.0
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn formats_the_full_tooltip() {
        let info = HoverInfo::from_properties("12345", &joined_properties()).unwrap();
        assert_eq!(
            info.lines(),
            [
                "ZIP: 12345",
                "Centile Score: 62.3",
                "Springfield, IL",
                "Population: 50,000",
                "Bachelor's Degree: 35.0%",
                "Median Income: $55k",
            ]
        );
    }

    #[test]
    fn no_tooltip_without_centile_score() {
        let mut properties = joined_properties();
        properties.remove("centileScore");
        assert!(HoverInfo::from_properties("12345", &properties).is_none());
    }

    #[test]
    fn missing_city_and_state_fall_back_to_unknown() {
        let mut properties = joined_properties();
        properties.remove("city");
        properties.remove("state");
        let info = HoverInfo::from_properties("12345", &properties).unwrap();
        assert_eq!(info.place, "Unknown, Unknown");
    }

    #[test]
    fn groups_thousands_with_commas() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(50000), "50,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn income_keeps_group_separators_and_k_suffix() {
        let mut properties = joined_properties();
        properties.insert("medianIncome".to_string(), json!(1250.0));
        let info = HoverInfo::from_properties("12345", &properties).unwrap();
        assert_eq!(info.income, "Median Income: $1,250k");
    }
}
