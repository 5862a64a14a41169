use std::error::Error;

use clap::Args;
use evsyn_meta::eggers_test_records;

use crate::io::{emit_json, StudyInputArgs};

#[derive(Args, Debug)]
pub struct BiasArgs {
    #[command(flatten)]
    pub source: StudyInputArgs,
}

pub fn run(args: &BiasArgs) -> Result<(), Box<dyn Error>> {
    let records = args.source.records()?;
    emit_json(args.source.out.as_deref(), &eggers_test_records(&records))
}
