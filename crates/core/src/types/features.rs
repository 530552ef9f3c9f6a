//! Product feature lists.

use serde::{Deserialize, Serialize};

/// Feature list as submitted by the admin UI.
///
/// The product form posts a single comma-separated string, while API clients
/// usually send a JSON array. Both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FeaturesInput {
    /// `"Wireless, 30hr Battery, Foldable"`
    Delimited(String),
    /// `["Wireless", "30hr Battery", "Foldable"]`
    List(Vec<String>),
}

/// An ordered list of short product feature labels.
///
/// Entries are trimmed and blank entries dropped; order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(Vec<String>);

impl Features {
    /// Build a feature list, trimming each entry and discarding blanks.
    #[must_use]
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            items
                .into_iter()
                .map(|s| s.as_ref().trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    /// The feature labels in display order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consume the list, returning the labels.
    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<FeaturesInput> for Features {
    fn from(input: FeaturesInput) -> Self {
        match input {
            FeaturesInput::Delimited(s) => Self::new(s.split(',')),
            FeaturesInput::List(items) => Self::new(items),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_string_is_split_and_trimmed() {
        let input: FeaturesInput =
            serde_json::from_str("\"Wireless, 30hr Battery ,Foldable\"").unwrap();
        let features = Features::from(input);
        assert_eq!(
            features.as_slice(),
            ["Wireless", "30hr Battery", "Foldable"]
        );
    }

    #[test]
    fn test_list_keeps_order() {
        let input: FeaturesInput = serde_json::from_str(r#"["Z", "A", "M"]"#).unwrap();
        assert_eq!(Features::from(input).into_inner(), vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        let features = Features::from(FeaturesInput::Delimited("a,, ,b,".into()));
        assert_eq!(features.as_slice(), ["a", "b"]);

        let empty = Features::from(FeaturesInput::Delimited(String::new()));
        assert!(empty.as_slice().is_empty());
    }

    #[test]
    fn test_string_and_list_normalize_identically() {
        let from_str = Features::from(FeaturesInput::Delimited("GPS,Water Resistant".into()));
        let from_list = Features::from(FeaturesInput::List(vec![
            "GPS".into(),
            " Water Resistant".into(),
        ]));
        assert_eq!(from_str, from_list);
    }
}
