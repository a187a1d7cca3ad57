//! Classification rules for media display names.
//!
//! Pure, total lookups: every function returns a categorical value for any
//! input, falling back to a fixed "unknown" sentinel. Resolution order is
//! always (a) the manual override table, then (b) for type and language,
//! ordered keyword groups scanned in priority order, then (c) the sentinel.

use std::collections::HashMap;

use once_cell::sync::Lazy;

// ---------------------------------------------------------------------------
// Manual override tables
// ---------------------------------------------------------------------------

/// Known media names mapped to their country/region.
static MANUAL_COUNTRY: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("《中国日报》", "中国"),
        ("《人民日报》", "中国"),
        ("《北京青年报》", "中国"),
        ("《南华早报》", "中国香港"),
        ("《澎湃新闻》", "中国"),
        ("《澳大利亚人报》", "澳大利亚"),
        ("《环球时报》", "中国"),
        ("《纽约时报》", "美国"),
        ("中国国际电视台（CGTN）", "中国"),
        ("中央广播电视总台", "中国"),
        ("中新社", "中国"),
        ("俄新社", "俄罗斯"),
        ("俄通塔斯社", "俄罗斯"),
        ("印度报业托拉斯社", "印度"),
        ("国际广播电台", "中国"),
        ("彭博社", "美国"),
        ("总台华语环球节目中心", "中国"),
        ("总台央视", "中国"),
        ("新华社", "中国"),
        ("日本东京电视台", "日本"),
        ("日本共同社", "日本"),
        ("日本广播协会（NHK）", "日本"),
        ("法新社", "法国"),
        ("深圳卫视", "中国"),
        ("湖北广播电视台", "中国"),
        ("澳亚卫视", "中国澳门"),
        ("澳大利亚人报", "澳大利亚"),
        ("环球邮报", "加拿大"),
        ("路透社", "英国"),
        ("香港中评社", "中国香港"),
        ("香港电台", "中国香港"),
    ])
});

/// Known media names mapped to their ownership class.
static MANUAL_OWNERSHIP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("《中国日报》", "国有"),
        ("新华社", "国有"),
        ("中央广播电视总台", "国有"),
        ("《人民日报》", "国有"),
        ("彭博社", "私营"),
        ("路透社", "私营"),
        ("法新社", "私营"),
        ("《纽约时报》", "私营"),
        ("《北京青年报》", "国有"),
        ("《南华早报》", "私营"),
        ("《澎湃新闻》", "国有"),
        ("《澳大利亚人报》", "私营"),
        ("《环球时报》", "国有"),
        ("中国国际电视台（CGTN）", "国有"),
        ("中新社", "国有"),
        ("俄新社", "国有"),
        ("俄通塔斯社", "国有"),
        ("印度报业托拉斯社", "国有"),
        ("国际广播电台", "国有"),
        ("总台华语环球节目中心", "国有"),
        ("总台央视", "国有"),
        ("日本东京电视台", "私营"),
        ("日本共同社", "国有"),
        ("日本广播协会（NHK）", "国有"),
        ("深圳卫视", "国有"),
        ("湖北广播电视台", "国有"),
        ("澳亚卫视", "私营"),
        ("澳大利亚人报", "私营"),
        ("环球邮报", "私营"),
        ("香港中评社", "私营"),
        ("香港电台", "公营"),
    ])
});

// ---------------------------------------------------------------------------
// Keyword groups
// ---------------------------------------------------------------------------

// Scanned in this order; the first group containing a matching keyword wins.
const TV_KEYWORDS: &[&str] = &["央视", "卫视", "NHK", "CNN", "BBC", "电视", "广播"];
const NEWS_AGENCY_KEYWORDS: &[&str] =
    &["新华", "路透", "共同", "美联", "法新", "俄新", "塔斯", "中新社"];
const NEWSPAPER_KEYWORDS: &[&str] =
    &["人民日报", "纽约", "时报", "日报", "晚报", "早报", "环球时报", "中国日报"];
const ONLINE_MEDIA_KEYWORDS: &[&str] = &["网", "澎湃", "界面", "腾讯", "新浪"];

const CHINESE_KEYWORDS: &[&str] =
    &["中国", "央视", "新华", "人民", "中评", "华语", "澎湃", "南华早报"];
const ENGLISH_KEYWORDS: &[&str] =
    &["CNN", "BBC", "纽约", "彭博", "路透", "澳大利亚人报", "环球邮报"];
const JAPANESE_KEYWORDS: &[&str] = &["日本", "NHK", "共同", "东京"];
const RUSSIAN_KEYWORDS: &[&str] = &["俄新", "塔斯"];
const FRENCH_KEYWORDS: &[&str] = &["法新"];

fn contains_any(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| name.contains(k))
}

// ---------------------------------------------------------------------------
// Classifiers
// ---------------------------------------------------------------------------

/// Country/region for a display name, from the manual table.
pub fn determine_country(media_name: &str) -> &'static str {
    MANUAL_COUNTRY.get(media_name).copied().unwrap_or("未知")
}

/// Ownership class for a display name, from the manual table.
pub fn determine_ownership(media_name: &str) -> &'static str {
    MANUAL_OWNERSHIP.get(media_name).copied().unwrap_or("未知所有权")
}

/// Organization type by keyword group, in priority order:
/// broadcast/TV, news agency, newspaper, online media.
pub fn determine_media_type(media_name: &str) -> &'static str {
    if contains_any(media_name, TV_KEYWORDS) {
        "电视台/广播电视媒体"
    } else if contains_any(media_name, NEWS_AGENCY_KEYWORDS) {
        "通讯社"
    } else if contains_any(media_name, NEWSPAPER_KEYWORDS) {
        "报社/纸质媒体"
    } else if contains_any(media_name, ONLINE_MEDIA_KEYWORDS) {
        "网络新媒体"
    } else {
        "未知媒体类型"
    }
}

/// Primary language by keyword group, in priority order:
/// Chinese, English, Japanese, Russian, French.
pub fn determine_language(media_name: &str) -> &'static str {
    if contains_any(media_name, CHINESE_KEYWORDS) {
        "中文"
    } else if contains_any(media_name, ENGLISH_KEYWORDS) {
        "英文"
    } else if contains_any(media_name, JAPANESE_KEYWORDS) {
        "日文"
    } else if contains_any(media_name, RUSSIAN_KEYWORDS) {
        "俄文"
    } else if contains_any(media_name, FRENCH_KEYWORDS) {
        "法文"
    } else {
        "未知语言"
    }
}

/// Map a stance label to its political-stance description.
pub fn map_stance_to_political(stance_label: &str) -> &'static str {
    match stance_label {
        "Counter" => "对立立场",
        "Aligned" => "一致立场",
        "Mixed" => "中立/混合立场",
        _ => "未知立场",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_override_wins() {
        assert_eq!(determine_country("《纽约时报》"), "美国");
        assert_eq!(determine_ownership("香港电台"), "公营");
    }

    #[test]
    fn test_unknown_sentinels() {
        assert_eq!(determine_country("某不知名媒体"), "未知");
        assert_eq!(determine_ownership("某不知名媒体"), "未知所有权");
        assert_eq!(determine_media_type("某不知名媒体"), "未知媒体类型");
        assert_eq!(determine_language("某不知名媒体xyz"), "未知语言");
    }

    #[test]
    fn test_media_type_priority_order() {
        // "中央广播电视总台" carries a TV keyword; the TV group is scanned first.
        assert_eq!(determine_media_type("中央广播电视总台"), "电视台/广播电视媒体");
        assert_eq!(determine_media_type("新华社"), "通讯社");
        assert_eq!(determine_media_type("《环球时报》"), "报社/纸质媒体");
        assert_eq!(determine_media_type("《澎湃新闻》"), "网络新媒体");
        // Contains both a TV keyword ("广播") and an agency keyword ("共同"):
        // the TV group wins because it is scanned first.
        assert_eq!(determine_media_type("日本广播协会（NHK）"), "电视台/广播电视媒体");
    }

    #[test]
    fn test_language_priority_order() {
        assert_eq!(determine_language("《中国日报》"), "中文");
        assert_eq!(determine_language("彭博社"), "英文");
        assert_eq!(determine_language("日本东京电视台"), "日文");
        assert_eq!(determine_language("俄新社"), "俄文");
        assert_eq!(determine_language("法新社"), "法文");
        // "日本共同社" matches Japanese before the agency keyword matters here;
        // no Chinese/English keyword precedes it.
        assert_eq!(determine_language("日本共同社"), "日文");
    }

    #[test]
    fn test_political_stance_mapping() {
        assert_eq!(map_stance_to_political("Counter"), "对立立场");
        assert_eq!(map_stance_to_political("Aligned"), "一致立场");
        assert_eq!(map_stance_to_political("Mixed"), "中立/混合立场");
        assert_eq!(map_stance_to_political("???"), "未知立场");
    }

    #[test]
    fn test_total_never_panics() {
        for name in ["", " ", "🦀", "a very long unrelated name"] {
            determine_country(name);
            determine_ownership(name);
            determine_media_type(name);
            determine_language(name);
        }
    }
}
