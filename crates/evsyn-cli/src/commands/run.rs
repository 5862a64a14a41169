use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use evsyn_core::serde::to_canonical_json_bytes;
use evsyn_core::{hash_bytes, stable_hash_string, EffectSizeRecord, RunProvenance};
use evsyn_meta::{
    analyze, compare_by_variable, eggers_test_records, pool, ForestPlotData, FunnelPlotData,
};
use serde::{Deserialize, Serialize};

use crate::export::{influence_table, study_table};
use crate::io::{parse_records, write_file, OutputFormat};
use crate::plan::{resolve_path, AnalysisPlan, AnalysisStep};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML analysis plan.
    #[arg(long)]
    pub plan: PathBuf,
}

/// Index of a plan run, written as `manifest.json` in the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub provenance: RunProvenance,
    /// Artefact file name to SHA-256 of its bytes.
    pub artefacts: BTreeMap<String, String>,
}

struct ArtefactWriter<'a> {
    dir: &'a Path,
    artefacts: BTreeMap<String, String>,
}

impl ArtefactWriter<'_> {
    fn write(&mut self, name: String, bytes: &[u8]) -> Result<(), Box<dyn Error>> {
        write_file(&self.dir.join(&name), bytes)?;
        tracing::debug!(artefact = %name, bytes = bytes.len(), "wrote artefact");
        self.artefacts.insert(name, hash_bytes(bytes));
        Ok(())
    }

    fn write_json<T: Serialize>(&mut self, stem: &str, value: &T) -> Result<(), Box<dyn Error>> {
        self.write(format!("{stem}.json"), &to_canonical_json_bytes(value)?)
    }
}

fn run_step(
    step: &AnalysisStep,
    records: &[EffectSizeRecord],
    format: OutputFormat,
    writer: &mut ArtefactWriter<'_>,
) -> Result<(), Box<dyn Error>> {
    let stem = step.artefact_stem();
    match step {
        AnalysisStep::Pool => {
            let result = pool(records)?;
            match format {
                OutputFormat::Json => writer.write_json(&stem, &result),
                OutputFormat::Csv => writer.write(format!("{stem}.csv"), &study_table(&result)?),
            }
        }
        AnalysisStep::Subgroup { key } => {
            writer.write_json(&stem, &compare_by_variable(records, key)?)
        }
        AnalysisStep::Sensitivity => {
            let result = analyze(records)?;
            writer.write_json(&stem, &result)?;
            if format == OutputFormat::Csv {
                writer.write("influence.csv".into(), &influence_table(&result.influence_diagnostics)?)?;
            }
            Ok(())
        }
        AnalysisStep::Bias => writer.write_json(&stem, &eggers_test_records(records)),
        AnalysisStep::Forest => {
            writer.write_json(&stem, &ForestPlotData::from_pooled(&pool(records)?))
        }
        AnalysisStep::Funnel => writer.write_json(&stem, &FunnelPlotData::from_records(records)?),
    }
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let plan = AnalysisPlan::from_yaml(&fs::read(&args.plan)?)?;
    let base = args.plan.parent().unwrap_or_else(|| Path::new("."));

    let input_path = resolve_path(base, &plan.input);
    let input_bytes = fs::read(&input_path)?;
    let records = parse_records(&input_path, &input_bytes, plan.outcome.as_deref())?;

    let out_dir = resolve_path(base, &plan.output.dir);
    fs::create_dir_all(&out_dir)?;
    let mut writer = ArtefactWriter {
        dir: &out_dir,
        artefacts: BTreeMap::new(),
    };
    for step in &plan.analyses {
        tracing::info!(analysis = %step.artefact_stem(), "running analysis");
        run_step(step, &records, plan.output.format, &mut writer)?;
    }

    let mut tool_versions = BTreeMap::new();
    tool_versions.insert("evsyn".to_string(), env!("CARGO_PKG_VERSION").to_string());
    let manifest = RunManifest {
        provenance: RunProvenance {
            input_hash: hash_bytes(&input_bytes),
            plan_hash: stable_hash_string(&plan)?,
            n_studies: records.len(),
            created_at: chrono::Utc::now().to_rfc3339(),
            tool_versions,
            ..RunProvenance::default()
        },
        artefacts: writer.artefacts,
    };
    write_file(&out_dir.join("manifest.json"), &to_canonical_json_bytes(&manifest)?)?;
    Ok(())
}
