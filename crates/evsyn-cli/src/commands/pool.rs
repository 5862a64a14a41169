use std::error::Error;

use clap::Args;
use evsyn_meta::pool;

use crate::export::study_table;
use crate::io::{emit, emit_json, OutputFormat, StudyInputArgs};

#[derive(Args, Debug)]
pub struct PoolArgs {
    #[command(flatten)]
    pub source: StudyInputArgs,
    /// Report encoding; csv writes the per-study table.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

pub fn run(args: &PoolArgs) -> Result<(), Box<dyn Error>> {
    let records = args.source.records()?;
    let result = pool(&records)?;
    let out = args.source.out.as_deref();
    match args.format {
        OutputFormat::Json => emit_json(out, &result),
        OutputFormat::Csv => emit(out, &study_table(&result)?),
    }
}
