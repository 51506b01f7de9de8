use crate::dataset::Dataset;

const BOILERPLATE_TOKENS: [&str; 2] = ["PARTIDO", "PRIMERA"];

/// Strips the "PARTIDO"/"PRIMERA" boilerplate from an activity name and
/// normalizes it to a `vs <opponent>` label.
///
/// An activity that is nothing but boilerplate becomes `"vs "`.
pub fn clean_match_label(raw: &str) -> String {
    let mut cleaned = raw.to_string();
    for token in BOILERPLATE_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    let cleaned = cleaned.trim();
    if cleaned.to_lowercase().starts_with("vs") {
        cleaned.to_string()
    } else {
        format!("vs {cleaned}")
    }
}

/// Display label -> raw activity name, for one player's match selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchLabelMap {
    entries: Vec<(String, String)>,
}

impl MatchLabelMap {
    /// Builds the map from raw names in selector order. Colliding labels keep
    /// their first position and point at the last raw name seen.
    pub fn from_raw_names<I, S>(raw_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for raw in raw_names {
            let raw = raw.into();
            let label = clean_match_label(&raw);
            if let Some(existing) = entries.iter_mut().find(|(l, _)| *l == label) {
                existing.1 = raw;
            } else {
                entries.push((label, raw));
            }
        }
        Self { entries }
    }

    pub fn for_player(dataset: &Dataset, player: &str) -> Self {
        Self::from_raw_names(dataset.matches_for_player(player))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn raw_for(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, raw)| raw.as_str())
    }

    pub fn get(&self, idx: usize) -> Option<(&str, &str)> {
        self.entries
            .get(idx)
            .map(|(label, raw)| (label.as_str(), raw.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
