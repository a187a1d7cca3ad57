//! Profile enrichment: one raw attribute row in, one immutable profile out.
//!
//! All derivations are deterministic. Numeric derivations round to 4 decimal
//! places; ranking uses a stable sort so that ties keep the source field
//! order.

use serde_json::{Map, Value};

use crate::profiles::classify;
use crate::profiles::row::RawMediaRow;
use crate::profiles::types::{
    BasicInfo, GenerationParameters, IssueAnalysis, IssueDistribution, MediaProfile,
    OverallPerformance,
};

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Threshold-based stance fallback, applied only when the source field is
/// absent or empty. An explicit label is never overridden.
pub fn determine_stance_label(counter_ratio: f64, aligned_ratio: f64) -> &'static str {
    if counter_ratio > 0.6 {
        "Counter"
    } else if aligned_ratio > 0.6 {
        "Aligned"
    } else {
        "Mixed"
    }
}

/// Coverage intensity: domain-specific question count over total question
/// count, rounded to 4 decimals. 0.0 when the total is 0.
pub fn coverage_intensity(taihai_questions: u32, total_questions: u32) -> f64 {
    if total_questions == 0 {
        return 0.0;
    }
    round4(f64::from(taihai_questions) / f64::from(total_questions))
}

/// Topic diversity: the entropy score, boosted by 1.2 for Mixed-stance
/// outlets only. Rounded to 4 decimals either way.
pub fn topic_diversity(issue_entropy: f64, stance_label: &str) -> f64 {
    if stance_label == "Mixed" {
        round4(issue_entropy * 1.2)
    } else {
        round4(issue_entropy)
    }
}

/// Topic preferences: categories whose weight exceeds 0.1, in source field
/// order. Falls back to the fixed default pair when nothing qualifies.
pub fn extract_topic_preferences(row: &RawMediaRow) -> Map<String, Value> {
    let candidates = [
        ("立法议题", row.foreign_legislation),
        ("政要表态", row.official_statements),
        ("军事行动", row.military_transits),
        ("军售援助", row.arms_sales),
    ];

    let mut topics = Map::new();
    for (name, weight) in candidates {
        if weight > 0.1 {
            topics.insert(name.to_string(), weight.into());
        }
    }

    if topics.is_empty() {
        topics.insert("外交议题".to_string(), 0.5.into());
        topics.insert("一般性询问".to_string(), 0.5.into());
    }
    topics
}

/// Focus priority: categories with weight strictly greater than 0, sorted
/// descending (stable, so ties keep field order), top 2 kept with weights
/// rounded to 4 decimals. Falls back to the fixed default when none qualify.
pub fn determine_focus_priority(row: &RawMediaRow) -> Map<String, Value> {
    let candidates = [
        ("外国政府涉台立法", row.foreign_legislation),
        ("外国政要涉台表态/访问", row.official_statements),
        ("外国军舰军机穿越台海", row.military_transits),
        ("对台军售/军事援助", row.arms_sales),
    ];

    let mut scored: Vec<(&str, f64)> =
        candidates.into_iter().filter(|(_, score)| *score > 0.0).collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut focus = Map::new();
    for (name, score) in scored.into_iter().take(2) {
        focus.insert(name.to_string(), round4(score).into());
    }

    if focus.is_empty() {
        focus.insert("一般性台海议题".to_string(), 0.5.into());
    }
    focus
}

/// Qualitative question style from the (stance, average length) decision
/// table. Length thresholds: 50 chars for Counter, 40 for Mixed; Aligned is
/// length-independent.
pub fn determine_question_style(stance_label: &str, avg_question_length: f64) -> &'static str {
    match stance_label {
        "Counter" => {
            if avg_question_length > 50.0 {
                "尖锐冗长型（带有质疑导向）"
            } else {
                "简洁犀利型（带有对立导向）"
            }
        }
        "Aligned" => "客观中立型（带有共识导向）",
        _ => {
            if avg_question_length > 40.0 {
                "全面详细型（带有探究导向）"
            } else {
                "简洁中立型（带有平衡导向）"
            }
        }
    }
}

/// Enrich one raw row into a complete profile.
pub fn enrich_row(row: &RawMediaRow) -> MediaProfile {
    let stance_label = row
        .explicit_stance()
        .map(str::to_string)
        .unwrap_or_else(|| determine_stance_label(row.counter_ratio, row.aligned_ratio).to_string());

    let basic_info = BasicInfo {
        name: row.media_name.clone(),
        country: classify::determine_country(&row.media_name).to_string(),
        media_type: classify::determine_media_type(&row.media_name).to_string(),
        ownership: classify::determine_ownership(&row.media_name).to_string(),
        political_stance: classify::map_stance_to_political(&stance_label).to_string(),
        language: classify::determine_language(&row.media_name).to_string(),
    };

    let taiwan_issue_analysis = IssueAnalysis {
        total_questions: row.total_questions,
        counter_count: row.counter_count,
        aligned_count: row.aligned_count,
        neutral_count: row.neutral_count,
        counter_ratio: row.counter_ratio,
        aligned_ratio: row.aligned_ratio,
        neutral_ratio: row.neutral_ratio,
        stance_label: stance_label.clone(),
        avg_question_length: row.avg_question_length,
        issue_entropy: row.issue_entropy,
        taiwan_issue_ratio: row.taiwan_issue_ratio,
        avg_aligned_score: row.avg_aligned_score,
        avg_counter_score: row.avg_counter_score,
        avg_neutral_score: row.avg_neutral_score,
        issue_distribution: IssueDistribution {
            foreign_legislation: row.foreign_legislation,
            official_statements: row.official_statements,
            international_organizations: row.international_organizations,
            media_controversy: row.media_controversy,
            military_transits: row.military_transits,
            arms_sales: row.arms_sales,
        },
    };

    let overall_performance = OverallPerformance {
        media_total_questions: row.media_total_questions,
        media_taihai_questions: row.media_taihai_questions,
        taiwan_question_ratio: row.taiwan_question_ratio,
        coverage_intensity: coverage_intensity(row.media_taihai_questions, row.media_total_questions),
        topic_diversity: topic_diversity(row.issue_entropy, &stance_label),
    };

    let generation_parameters = GenerationParameters {
        question_style: determine_question_style(&stance_label, row.avg_question_length).to_string(),
        focus_priority: determine_focus_priority(row),
        challenge_level: row.counter_ratio,
        consistency_level: row.aligned_ratio,
        neutral_tendency: row.neutral_ratio,
        semantic_intensity: row.avg_aligned_score,
        topic_preferences: extract_topic_preferences(row),
    };

    MediaProfile {
        basic_info,
        taiwan_issue_analysis,
        overall_performance,
        generation_parameters,
    }
}

/// Enrich a batch of rows into `(id, profile)` pairs in input order.
pub fn enrich_rows(rows: &[RawMediaRow]) -> Vec<(String, MediaProfile)> {
    rows.iter()
        .map(|row| {
            let profile = enrich_row(row);
            (profile.id(), profile)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::row::test_support::sample_row;

    #[test]
    fn test_stance_fallback_counter() {
        assert_eq!(determine_stance_label(0.7, 0.1), "Counter");
    }

    #[test]
    fn test_stance_fallback_aligned() {
        assert_eq!(determine_stance_label(0.2, 0.65), "Aligned");
    }

    #[test]
    fn test_stance_fallback_mixed() {
        assert_eq!(determine_stance_label(0.3, 0.3), "Mixed");
    }

    #[test]
    fn test_explicit_stance_never_overridden() {
        let mut row = sample_row("新华社");
        row.stance_label = Some("Counter".into());
        // Ratios alone would classify this as Aligned.
        row.counter_ratio = 0.0;
        row.aligned_ratio = 0.9;
        let profile = enrich_row(&row);
        assert_eq!(profile.taiwan_issue_analysis.stance_label, "Counter");
        assert_eq!(profile.basic_info.political_stance, "对立立场");
    }

    #[test]
    fn test_coverage_intensity_zero_total() {
        assert_eq!(coverage_intensity(5, 0), 0.0);
        assert_eq!(coverage_intensity(0, 0), 0.0);
    }

    #[test]
    fn test_coverage_intensity_rounding() {
        assert_eq!(coverage_intensity(7, 312), 0.0224);
        assert_eq!(coverage_intensity(1, 3), 0.3333);
    }

    #[test]
    fn test_topic_diversity_mixed_boost() {
        assert_eq!(topic_diversity(0.5, "Mixed"), 0.6);
        assert_eq!(topic_diversity(0.5, "Aligned"), 0.5);
        assert_eq!(topic_diversity(0.5, "Counter"), 0.5);
    }

    #[test]
    fn test_stance_ratios_sum_to_one() {
        let row = sample_row("新华社");
        let profile = enrich_row(&row);
        let analysis = &profile.taiwan_issue_analysis;
        let sum = analysis.counter_ratio + analysis.aligned_ratio + analysis.neutral_ratio;
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_topic_preferences_threshold() {
        let mut row = sample_row("新华社");
        row.foreign_legislation = 0.05; // below the 0.1 threshold
        row.official_statements = 0.5;
        row.military_transits = 0.11;
        row.arms_sales = 0.0;
        let prefs = extract_topic_preferences(&row);
        let keys: Vec<&String> = prefs.keys().collect();
        assert_eq!(keys, ["政要表态", "军事行动"]);
    }

    #[test]
    fn test_topic_preferences_default_pair() {
        let mut row = sample_row("新华社");
        row.foreign_legislation = 0.0;
        row.official_statements = 0.1; // not strictly greater than 0.1
        row.military_transits = 0.0;
        row.arms_sales = 0.0;
        let prefs = extract_topic_preferences(&row);
        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs["外交议题"], 0.5);
        assert_eq!(prefs["一般性询问"], 0.5);
    }

    #[test]
    fn test_focus_priority_top2_descending() {
        let mut row = sample_row("新华社");
        row.foreign_legislation = 0.2;
        row.official_statements = 0.5;
        row.military_transits = 0.3;
        row.arms_sales = 0.0;
        let focus = determine_focus_priority(&row);
        let keys: Vec<&String> = focus.keys().collect();
        assert_eq!(keys, ["外国政要涉台表态/访问", "外国军舰军机穿越台海"]);
        assert_eq!(focus["外国政要涉台表态/访问"], 0.5);
    }

    #[test]
    fn test_focus_priority_ties_keep_field_order() {
        let mut row = sample_row("新华社");
        row.foreign_legislation = 0.3;
        row.official_statements = 0.3;
        row.military_transits = 0.3;
        row.arms_sales = 0.1;
        let focus = determine_focus_priority(&row);
        let keys: Vec<&String> = focus.keys().collect();
        // Stable sort: equal weights stay in source field order.
        assert_eq!(keys, ["外国政府涉台立法", "外国政要涉台表态/访问"]);
    }

    #[test]
    fn test_focus_priority_idempotent() {
        let row = sample_row("新华社");
        let first = determine_focus_priority(&row);
        let second = determine_focus_priority(&row);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_focus_priority_default() {
        let mut row = sample_row("新华社");
        row.foreign_legislation = 0.0;
        row.official_statements = 0.0;
        row.military_transits = 0.0;
        row.arms_sales = 0.0;
        let focus = determine_focus_priority(&row);
        assert_eq!(focus.len(), 1);
        assert_eq!(focus["一般性台海议题"], 0.5);
    }

    #[test]
    fn test_question_style_table() {
        assert_eq!(determine_question_style("Counter", 51.0), "尖锐冗长型（带有质疑导向）");
        assert_eq!(determine_question_style("Counter", 50.0), "简洁犀利型（带有对立导向）");
        assert_eq!(determine_question_style("Aligned", 10.0), "客观中立型（带有共识导向）");
        assert_eq!(determine_question_style("Aligned", 500.0), "客观中立型（带有共识导向）");
        assert_eq!(determine_question_style("Mixed", 41.0), "全面详细型（带有探究导向）");
        assert_eq!(determine_question_style("Mixed", 40.0), "简洁中立型（带有平衡导向）");
    }

    #[test]
    fn test_enrich_rows_ids_in_order() {
        let rows = vec![sample_row("《中国日报》"), sample_row("新华社")];
        let profiles = enrich_rows(&rows);
        assert_eq!(profiles[0].0, "中国日报");
        assert_eq!(profiles[1].0, "新华社");
    }
}
