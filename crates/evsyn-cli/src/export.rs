//! CSV tables for spreadsheet users.

use std::error::Error;

use evsyn_meta::{InfluenceDiagnostic, PooledResult};
use serde::Serialize;

#[derive(Serialize)]
struct StudyRow<'a> {
    study_label: &'a str,
    paper_id: String,
    effect_size: f64,
    std_error: f64,
    weight: f64,
    ci_lower: f64,
    ci_upper: f64,
}

#[derive(Serialize)]
struct InfluenceRow<'a> {
    study_label: &'a str,
    paper_id: String,
    effect_size: f64,
    weight: f64,
    influence_score: f64,
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, Box<dyn Error>> {
    Ok(writer.into_inner().map_err(|err| err.into_error())?)
}

/// Per-study table of a pooled result.
pub fn study_table(result: &PooledResult) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for study in &result.per_study {
        writer.serialize(StudyRow {
            study_label: &study.study_label,
            paper_id: study.paper_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            effect_size: study.effect_size,
            std_error: study.std_error,
            weight: study.weight,
            ci_lower: study.ci_lower,
            ci_upper: study.ci_upper,
        })?;
    }
    finish(writer)
}

/// Influence table, highest influence first.
pub fn influence_table(diagnostics: &[InfluenceDiagnostic]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in diagnostics {
        writer.serialize(InfluenceRow {
            study_label: &entry.study_label,
            paper_id: entry.paper_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            effect_size: entry.effect_size,
            weight: entry.weight,
            influence_score: entry.influence_score,
        })?;
    }
    finish(writer)
}
