use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use evsyn_wwc::{assess, AssessmentRequest, WwcAssessment};
use serde::Deserialize;

use crate::io::{decode, emit_json};

#[derive(Args, Debug)]
pub struct AssessArgs {
    /// `{extracted, judgments}` document (JSON or YAML), or a list of them.
    #[arg(long)]
    pub input: PathBuf,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AssessInput {
    Batch(Vec<AssessmentRequest>),
    Single(AssessmentRequest),
}

pub fn run(args: &AssessArgs) -> Result<(), Box<dyn Error>> {
    let bytes = fs::read(&args.input)?;
    let out = args.out.as_deref();
    match decode::<AssessInput>(&args.input, &bytes)? {
        AssessInput::Single(request) => {
            emit_json(out, &assess(&request.extracted, &request.judgments))
        }
        AssessInput::Batch(requests) => {
            let assessments: Vec<WwcAssessment> = requests
                .iter()
                .map(|request| assess(&request.extracted, &request.judgments))
                .collect();
            tracing::info!(n_studies = assessments.len(), "rated studies");
            emit_json(out, &assessments)
        }
    }
}
