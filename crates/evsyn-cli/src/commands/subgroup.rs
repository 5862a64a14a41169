use std::error::Error;

use clap::Args;
use evsyn_core::SUBGROUP_FIELD;
use evsyn_meta::compare_by_variable;

use crate::io::{emit_json, StudyInputArgs};

#[derive(Args, Debug)]
pub struct SubgroupArgs {
    #[command(flatten)]
    pub source: StudyInputArgs,
    /// Grouping variable: `subgroup_value` or the name of a study attribute.
    #[arg(long, default_value = SUBGROUP_FIELD)]
    pub key: String,
}

pub fn run(args: &SubgroupArgs) -> Result<(), Box<dyn Error>> {
    let records = args.source.records()?;
    let result = compare_by_variable(&records, &args.key)?;
    emit_json(args.source.out.as_deref(), &result)
}
