use std::error::Error;

use clap::Args;
use evsyn_meta::analyze;

use crate::export::influence_table;
use crate::io::{emit, emit_json, OutputFormat, StudyInputArgs};

#[derive(Args, Debug)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub source: StudyInputArgs,
    /// Report encoding; csv writes the influence table.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

pub fn run(args: &SensitivityArgs) -> Result<(), Box<dyn Error>> {
    let records = args.source.records()?;
    let result = analyze(&records)?;
    let out = args.source.out.as_deref();
    match args.format {
        OutputFormat::Json => emit_json(out, &result),
        OutputFormat::Csv => emit(out, &influence_table(&result.influence_diagnostics)?),
    }
}
