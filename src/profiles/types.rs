//! The enriched media profile data model.
//!
//! Serialized shape matches the profile JSON files consumed downstream:
//! four nested groups keyed `basic_info`, `taiwan_issue_analysis`,
//! `overall_performance` and `generation_parameters`. Human-readable values
//! keep their source-language characters verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity attributes of a media outlet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicInfo {
    pub name: String,
    pub country: String,
    pub media_type: String,
    pub ownership: String,
    pub political_stance: String,
    pub language: String,
}

/// Per-category weights of the fixed issue distribution.
///
/// Weights are in [0, 1] and may overlap; they are not required to sum to 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueDistribution {
    #[serde(rename = "EI_1_外国政府涉台立法")]
    pub foreign_legislation: f64,
    #[serde(rename = "EI_2_外国政要涉台表态或访问")]
    pub official_statements: f64,
    #[serde(rename = "EI_3_国际组织涉台表述")]
    pub international_organizations: f64,
    #[serde(rename = "EI_5_外媒涉台报道争议")]
    pub media_controversy: f64,
    #[serde(rename = "MS_1_外国军舰军机穿越台海")]
    pub military_transits: f64,
    #[serde(rename = "MS_2_对台军售或军事援助")]
    pub arms_sales: f64,
}

/// Behavioral metrics over the outlet's observed questions.
///
/// The three stance ratios are mutually exclusive and sum to 1.0 within
/// floating rounding tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueAnalysis {
    pub total_questions: u32,
    pub counter_count: u32,
    pub aligned_count: u32,
    pub neutral_count: u32,
    pub counter_ratio: f64,
    pub aligned_ratio: f64,
    pub neutral_ratio: f64,
    pub stance_label: String,
    pub avg_question_length: f64,
    pub issue_entropy: f64,
    pub taiwan_issue_ratio: f64,
    pub avg_aligned_score: f64,
    pub avg_counter_score: f64,
    pub avg_neutral_score: f64,
    pub issue_distribution: IssueDistribution,
}

/// Aggregate coverage metrics across all of the outlet's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallPerformance {
    pub media_total_questions: u32,
    pub media_taihai_questions: u32,
    pub taiwan_question_ratio: f64,
    pub coverage_intensity: f64,
    pub topic_diversity: f64,
}

/// Parameters derived for conditioning generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub question_style: String,
    /// Ranked top-2 focus categories, descending by weight. Key order is
    /// significant and preserved through (de)serialization.
    pub focus_priority: Map<String, Value>,
    pub challenge_level: f64,
    pub consistency_level: f64,
    pub neutral_tendency: f64,
    pub semantic_intensity: f64,
    /// Categories whose distribution weight exceeds 0.1, or the fixed
    /// default pair when none do.
    pub topic_preferences: Map<String, Value>,
}

/// One enriched media outlet: created once during enrichment, never mutated,
/// held for the process lifetime by the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaProfile {
    pub basic_info: BasicInfo,
    pub taiwan_issue_analysis: IssueAnalysis,
    pub overall_performance: OverallPerformance,
    pub generation_parameters: GenerationParameters,
}

impl MediaProfile {
    /// The stable directory id derived from the display name.
    pub fn id(&self) -> String {
        crate::utilities::string_utils::derive_media_id(&self.basic_info.name)
    }
}
