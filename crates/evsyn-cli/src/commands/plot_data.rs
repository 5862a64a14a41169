use std::error::Error;

use clap::{Args, ValueEnum};
use evsyn_meta::{pool, ForestPlotData, FunnelPlotData};

use crate::io::{emit_json, StudyInputArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlotKind {
    Forest,
    Funnel,
}

#[derive(Args, Debug)]
pub struct PlotDataArgs {
    #[command(flatten)]
    pub source: StudyInputArgs,
    /// Plot whose series to emit.
    #[arg(long, value_enum)]
    pub kind: PlotKind,
}

pub fn run(args: &PlotDataArgs) -> Result<(), Box<dyn Error>> {
    let records = args.source.records()?;
    let out = args.source.out.as_deref();
    match args.kind {
        PlotKind::Forest => emit_json(out, &ForestPlotData::from_pooled(&pool(&records)?)),
        PlotKind::Funnel => emit_json(out, &FunnelPlotData::from_records(&records)?),
    }
}
