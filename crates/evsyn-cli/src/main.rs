use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    assess::{self, AssessArgs},
    bias::{self, BiasArgs},
    plot_data::{self, PlotDataArgs},
    pool::{self, PoolArgs},
    run::{self, RunArgs},
    sensitivity::{self, SensitivityArgs},
    subgroup::{self, SubgroupArgs},
    version::{self, VersionArgs},
};

mod commands;
mod export;
mod io;
mod logging;
mod plan;

#[derive(Parser, Debug)]
#[command(name = "evsyn", about = "Evidence synthesis: meta-analysis and WWC study ratings")]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pool effect sizes with the DerSimonian-Laird random-effects model.
    Pool(PoolArgs),
    /// Pool per subgroup and test for between-subgroup differences.
    Subgroup(SubgroupArgs),
    /// Leave-one-out pooling and influence diagnostics.
    Sensitivity(SensitivityArgs),
    /// Egger's regression test for publication bias.
    Bias(BiasArgs),
    /// Rate studies against the WWC standards.
    Assess(AssessArgs),
    /// Emit the numeric series behind forest and funnel plots.
    PlotData(PlotDataArgs),
    /// Execute every analysis listed in a YAML plan.
    Run(RunArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.command {
        Command::Pool(args) => pool::run(&args),
        Command::Subgroup(args) => subgroup::run(&args),
        Command::Sensitivity(args) => sensitivity::run(&args),
        Command::Bias(args) => bias::run(&args),
        Command::Assess(args) => assess::run(&args),
        Command::PlotData(args) => plot_data::run(&args),
        Command::Run(args) => run::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
