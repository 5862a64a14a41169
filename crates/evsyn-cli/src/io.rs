use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use evsyn_core::errors::EvsynError;
use evsyn_core::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_canonical_json_pretty};
use evsyn_core::{EffectSizeRecord, StudySet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Report encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Study input shared by the analysis subcommands.
#[derive(Args, Debug)]
pub struct StudyInputArgs {
    /// Study set (JSON or YAML): `{studies, papers}` or a bare list of records.
    #[arg(long)]
    pub input: PathBuf,
    /// Outcome to read from paper metadata; defaults to the first by name.
    #[arg(long)]
    pub outcome: Option<String>,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl StudyInputArgs {
    pub fn records(&self) -> Result<Vec<EffectSizeRecord>, Box<dyn Error>> {
        let bytes = fs::read(&self.input)?;
        Ok(parse_records(&self.input, &bytes, self.outcome.as_deref())?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StudyInput {
    Records(Vec<EffectSizeRecord>),
    Set(StudySet),
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

/// Decodes JSON or YAML depending on the file extension.
pub fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, EvsynError> {
    if is_yaml(path) {
        from_yaml_slice(bytes)
    } else {
        from_json_slice(bytes)
    }
}

/// Parses a study file into validated records.
pub fn parse_records(
    path: &Path,
    bytes: &[u8],
    outcome: Option<&str>,
) -> Result<Vec<EffectSizeRecord>, EvsynError> {
    let set = match decode::<StudyInput>(path, bytes)? {
        StudyInput::Records(studies) => StudySet {
            studies,
            papers: Vec::new(),
        },
        StudyInput::Set(set) => set,
    };
    let records = set.into_records(outcome)?;
    tracing::debug!(path = %path.display(), n_studies = records.len(), "loaded study records");
    Ok(records)
}

/// Writes bytes to `out`, or to stdout when no path is given.
pub fn emit(out: Option<&Path>, bytes: &[u8]) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => write_file(path, bytes),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            if !bytes.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

/// Canonical JSON to a file, pretty canonical JSON to stdout.
pub fn emit_json<T: Serialize>(out: Option<&Path>, value: &T) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => write_file(path, &to_canonical_json_bytes(value)?),
        None => emit(None, to_canonical_json_pretty(value)?.as_bytes()),
    }
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}
