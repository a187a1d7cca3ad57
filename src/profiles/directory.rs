//! The in-memory agent directory.
//!
//! Built once at startup from enriched profiles and never mutated, so it is
//! safe to share behind an `Arc` across concurrent requests. Iteration order
//! is insertion order, and fuzzy lookup returns the first match under that
//! order; there is deliberately no ranking among multiple fuzzy matches.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::profiles::types::MediaProfile;
use crate::utilities::errors::SimulationError;
use crate::utilities::string_utils::clean_for_match;

/// Insertion-ordered map from media id to enriched profile.
#[derive(Debug, Default)]
pub struct MediaDirectory {
    entries: Vec<(String, MediaProfile)>,
    index: HashMap<String, usize>,
}

impl MediaDirectory {
    /// Build a directory from `(id, profile)` pairs. Later duplicates of an
    /// id replace earlier ones, matching source-data semantics where a
    /// re-exported row supersedes the previous one.
    pub fn from_profiles(profiles: impl IntoIterator<Item = (String, MediaProfile)>) -> Self {
        let mut directory = Self::default();
        for (id, profile) in profiles {
            if let Some(&pos) = directory.index.get(&id) {
                directory.entries[pos].1 = profile;
            } else {
                directory.index.insert(id.clone(), directory.entries.len());
                directory.entries.push((id, profile));
            }
        }
        directory
    }

    /// Load a directory from a profile JSON file (id → profile mapping).
    /// Entry order in the file is preserved.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SimulationError::MalformedRow {
                message: format!("cannot read {}: {}", path.as_ref().display(), e),
            }
        })?;
        let map: serde_json::Map<String, Value> =
            serde_json::from_str(&text).map_err(|e| SimulationError::MalformedRow {
                message: format!("invalid profile JSON: {}", e),
            })?;

        let mut profiles = Vec::with_capacity(map.len());
        for (id, value) in map {
            let profile: MediaProfile =
                serde_json::from_value(value).map_err(|e| SimulationError::MalformedRow {
                    message: format!("invalid profile for '{}': {}", id, e),
                })?;
            profiles.push((id, profile));
        }
        Ok(Self::from_profiles(profiles))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(id, profile)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MediaProfile)> {
        self.entries.iter().map(|(id, profile)| (id.as_str(), profile))
    }

    /// Exact id lookup.
    pub fn get(&self, id: &str) -> Option<&MediaProfile> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    /// Resolve an identifier to a profile.
    ///
    /// Resolution order: (1) exact key match; (2) first profile, in
    /// insertion order, whose normalized display name contains the
    /// normalized query or vice versa; (3) first directory key, in insertion
    /// order, containing the normalized query as a case-insensitive
    /// substring. First match wins at each stage.
    pub fn find(&self, identifier: &str) -> Option<&MediaProfile> {
        if let Some(profile) = self.get(identifier) {
            return Some(profile);
        }

        let clean_query = clean_for_match(identifier);
        if clean_query.is_empty() {
            return None;
        }

        for (_, profile) in &self.entries {
            let clean_name = clean_for_match(&profile.basic_info.name);
            if clean_name.contains(&clean_query) || clean_query.contains(&clean_name) {
                return Some(profile);
            }
        }

        for (id, profile) in &self.entries {
            if id.to_lowercase().contains(&clean_query) {
                return Some(profile);
            }
        }

        None
    }
}

/// Load the flat user-profile map (id → free-form attribute object).
pub fn load_user_profiles(
    path: impl AsRef<Path>,
) -> Result<HashMap<String, Value>, SimulationError> {
    let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        SimulationError::MalformedRow {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        }
    })?;
    serde_json::from_str(&text).map_err(|e| SimulationError::MalformedRow {
        message: format!("invalid user profile JSON: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::enrich::enrich_rows;
    use crate::profiles::row::test_support::sample_row;

    fn test_directory() -> MediaDirectory {
        let rows = vec![
            sample_row("《中国日报》"),
            sample_row("新华社"),
            sample_row("日本广播协会（NHK）"),
        ];
        MediaDirectory::from_profiles(enrich_rows(&rows))
    }

    #[test]
    fn test_exact_lookup() {
        let dir = test_directory();
        assert!(dir.get("中国日报").is_some());
        assert!(dir.get("不存在").is_none());
    }

    #[test]
    fn test_fuzzy_lookup_by_name_substring() {
        let dir = test_directory();
        let profile = dir.find("NHK").unwrap();
        assert_eq!(profile.basic_info.name, "日本广播协会（NHK）");
        // Case-insensitive.
        let profile = dir.find("nhk").unwrap();
        assert_eq!(profile.basic_info.name, "日本广播协会（NHK）");
    }

    #[test]
    fn test_fuzzy_lookup_with_quoting_brackets() {
        let dir = test_directory();
        let profile = dir.find("《新华社》").unwrap();
        assert_eq!(profile.basic_info.name, "新华社");
    }

    #[test]
    fn test_unrelated_query_not_found() {
        let dir = test_directory();
        assert!(dir.find("completely unrelated").is_none());
        assert!(dir.find("").is_none());
    }

    #[test]
    fn test_first_match_in_insertion_order() {
        // Both ids contain "社"; the earlier entry wins.
        let rows = vec![sample_row("新华社"), sample_row("中新社")];
        let dir = MediaDirectory::from_profiles(enrich_rows(&rows));
        let profile = dir.find("社").unwrap();
        assert_eq!(profile.basic_info.name, "新华社");
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let dir = test_directory();
        let ids: Vec<&str> = dir.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["中国日报", "新华社", "日本广播协会nhk"]);
    }

    #[test]
    fn test_load_roundtrip() {
        use std::io::Write;

        let rows = vec![sample_row("《中国日报》"), sample_row("新华社")];
        let profiles = enrich_rows(&rows);
        let mut map = serde_json::Map::new();
        for (id, profile) in &profiles {
            map.insert(id.clone(), serde_json::to_value(profile).unwrap());
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string_pretty(&map).unwrap()).unwrap();

        let dir = MediaDirectory::load(file.path()).unwrap();
        assert_eq!(dir.len(), 2);
        let ids: Vec<&str> = dir.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["中国日报", "新华社"]);
    }
}
