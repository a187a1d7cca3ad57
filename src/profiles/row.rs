//! Raw attribute rows from the tabular source data.
//!
//! One CSV record per media outlet. Every numeric column is required; a
//! missing or non-numeric value fails the whole batch with
//! [`SimulationError::MalformedRow`] so that the directory is either built
//! completely or not at all.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::utilities::errors::SimulationError;

/// One source row of per-outlet indicators.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMediaRow {
    pub media_name: String,
    /// Optional explicit stance label; empty cells deserialize to `None`
    /// and trigger the threshold-based fallback during enrichment.
    #[serde(default)]
    pub stance_label: Option<String>,
    pub total_questions: u32,
    pub counter_count: u32,
    pub aligned_count: u32,
    pub neutral_count: u32,
    pub counter_ratio: f64,
    pub aligned_ratio: f64,
    pub neutral_ratio: f64,
    pub avg_question_length: f64,
    pub issue_entropy: f64,
    pub taiwan_issue_ratio: f64,
    pub avg_aligned_score: f64,
    pub avg_counter_score: f64,
    pub avg_neutral_score: f64,
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
    pub media_total_questions: u32,
    pub media_taihai_questions: u32,
    pub taiwan_question_ratio: f64,
}

impl RawMediaRow {
    /// The explicit stance label, if one was supplied and non-empty.
    pub fn explicit_stance(&self) -> Option<&str> {
        self.stance_label.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Read all rows from a CSV reader. The first malformed record aborts the
/// batch.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawMediaRow>, SimulationError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        let row: RawMediaRow = record.map_err(|e| SimulationError::MalformedRow {
            message: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read all rows from a CSV file on disk.
pub fn read_rows_from_path(path: impl AsRef<Path>) -> Result<Vec<RawMediaRow>, SimulationError> {
    let file = std::fs::File::open(path.as_ref()).map_err(|e| SimulationError::MalformedRow {
        message: format!("cannot open {}: {}", path.as_ref().display(), e),
    })?;
    read_rows(file)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::RawMediaRow;

    /// A baseline row for tests; individual fields are overridden per case.
    pub fn sample_row(name: &str) -> RawMediaRow {
        RawMediaRow {
            media_name: name.to_string(),
            stance_label: None,
            total_questions: 6,
            counter_count: 0,
            aligned_count: 4,
            neutral_count: 2,
            counter_ratio: 0.0,
            aligned_ratio: 0.6666666666666666,
            neutral_ratio: 0.3333333333333333,
            avg_question_length: 83.7,
            issue_entropy: 0.4505612088663046,
            taiwan_issue_ratio: 0.1666666666666666,
            avg_aligned_score: 0.62066454,
            avg_counter_score: 0.54134893,
            avg_neutral_score: 0.41899326,
            foreign_legislation: 0.0,
            official_statements: 0.5,
            international_organizations: 0.0,
            media_controversy: 0.5,
            military_transits: 0.0,
            arms_sales: 0.0,
            media_total_questions: 312,
            media_taihai_questions: 7,
            taiwan_question_ratio: 0.0224358974358974,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "media_name,stance_label,total_questions,counter_count,aligned_count,neutral_count,counter_ratio,aligned_ratio,neutral_ratio,avg_question_length,issue_entropy,taiwan_issue_ratio,avg_aligned_score,avg_counter_score,avg_neutral_score,EI_1_外国政府涉台立法,EI_2_外国政要涉台表态或访问,EI_3_国际组织涉台表述,EI_5_外媒涉台报道争议,MS_1_外国军舰军机穿越台海,MS_2_对台军售或军事援助,media_total_questions,media_taihai_questions,taiwan_question_ratio";

    #[test]
    fn test_read_rows_ok() {
        let data = format!(
            "{}\n《中国日报》,Aligned,6,0,4,2,0.0,0.667,0.333,83.7,0.45,0.167,0.62,0.54,0.42,0.0,0.5,0.0,0.5,0.0,0.0,312,7,0.022\n",
            HEADER
        );
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].media_name, "《中国日报》");
        assert_eq!(rows[0].explicit_stance(), Some("Aligned"));
        assert_eq!(rows[0].official_statements, 0.5);
    }

    #[test]
    fn test_empty_stance_label_is_none() {
        let data = format!(
            "{}\n新华社,,6,0,4,2,0.0,0.667,0.333,83.7,0.45,0.167,0.62,0.54,0.42,0.0,0.5,0.0,0.5,0.0,0.0,312,7,0.022\n",
            HEADER
        );
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows[0].explicit_stance(), None);
    }

    #[test]
    fn test_non_numeric_field_aborts_batch() {
        let data = format!(
            "{}\n新华社,Aligned,six,0,4,2,0.0,0.667,0.333,83.7,0.45,0.167,0.62,0.54,0.42,0.0,0.5,0.0,0.5,0.0,0.0,312,7,0.022\n",
            HEADER
        );
        let err = read_rows(data.as_bytes()).unwrap_err();
        assert!(matches!(err, SimulationError::MalformedRow { .. }));
    }
}
