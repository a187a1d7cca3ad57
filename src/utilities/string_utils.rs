//! String normalization for media identifiers and fuzzy matching.

/// The four bracket characters used to quote media names in the source data.
const QUOTE_BRACKETS: [char; 4] = ['《', '》', '（', '）'];

/// Derive the stable directory id for a media display name.
///
/// Lowercases, replaces spaces with underscores, and strips the four quoting
/// brackets. Deterministic: the same display name always yields the same id.
pub fn derive_media_id(name: &str) -> String {
    name.to_lowercase().replace(' ', "_").replace(QUOTE_BRACKETS, "")
}

/// Normalize a string for fuzzy comparison: lowercase, quoting brackets and
/// spaces removed. Unlike [`derive_media_id`], spaces are dropped entirely so
/// that `"china daily"` matches `"chinadaily"`.
pub fn clean_for_match(s: &str) -> String {
    s.to_lowercase().replace(QUOTE_BRACKETS, "").replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_media_id_strips_brackets() {
        assert_eq!(derive_media_id("《中国日报》"), "中国日报");
        assert_eq!(derive_media_id("中国国际电视台（CGTN）"), "中国国际电视台cgtn");
    }

    #[test]
    fn test_derive_media_id_spaces_to_underscores() {
        assert_eq!(derive_media_id("New York Times"), "new_york_times");
    }

    #[test]
    fn test_derive_media_id_deterministic() {
        let a = derive_media_id("《南华早报》");
        let b = derive_media_id("《南华早报》");
        assert_eq!(a, b);
    }

    #[test]
    fn test_clean_for_match_drops_spaces() {
        assert_eq!(clean_for_match("China Daily"), "chinadaily");
        assert_eq!(clean_for_match("《环球时报》"), "环球时报");
    }
}
