use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::allocation::AllocationTracker;
use crate::error::EpigridError;
use crate::execution_stats::{
    log_execution_statistics, write_execution_statistics, ExecutionProfilingCollector,
    ExecutionStatistics,
};
use crate::log::{info, set_log_level, LevelFilter, LogSpec};
use crate::parameters::Parameters;
use crate::progress::{init_day_progress_bar, update_day_progress};
use crate::prompt::read_parameters;
use crate::report::DailyReport;
use crate::simulation::Simulation;
use crate::snapshot::{NullSink, SnapshotSink, TextSnapshotWriter};
use clap::{ArgAction, Args, Command, FromArgMatches as _};

/// Default cli arguments for the epigrid runner
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Optional path to a JSON parameters file. When omitted the parameters are read
    /// interactively from stdin
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path of the per-day snapshot file
    #[arg(short, long, default_value = "simulation.txt")]
    pub output: PathBuf,

    /// Do not write the per-day snapshot file
    #[arg(long)]
    pub no_snapshots: bool,

    /// Optional path for a per-day CSV summary report
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Enable logging. Accepts a level (error, warn, info, debug, trace) and/or
    /// comma-separated `module=level` filters, e.g. `info,epigrid::transition=trace`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Show a progress bar over simulated days
    #[arg(long)]
    pub progress: bool,
}

impl Default for BaseArgs {
    fn default() -> Self {
        BaseArgs {
            config: None,
            output: PathBuf::from("simulation.txt"),
            no_snapshots: false,
            report: None,
            log_level: None,
            verbose: 0,
            progress: false,
        }
    }
}

fn create_epigrid_cli() -> Command {
    let cli = Command::new("epigrid")
        .about("Simulates infection spread and recovery on a population grid");
    BaseArgs::augment_args(cli)
}

/// Parses the process arguments and runs a simulation, reading parameters from stdin unless
/// a config file is given and writing the summary to stdout.
///
/// # Errors
/// Returns an error if argument parsing fails or the simulation cannot complete.
pub fn run() -> Result<ExecutionStatistics, Box<dyn std::error::Error>> {
    let matches = create_epigrid_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let statistics = run_with_args(args, &mut stdin.lock(), &mut stdout.lock())?;
    Ok(statistics)
}

fn configure_logging(args: &BaseArgs) -> Result<(), EpigridError> {
    let verbosity = match args.verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    if let Some(level) = verbosity {
        set_log_level(level);
    }
    if let Some(spec) = &args.log_level {
        let spec: LogSpec = spec.parse()?;
        spec.apply();
        for (module, level) in &spec.modules {
            info!("Logging enabled for {module} at level {level}");
        }
    }
    Ok(())
}

/// Runs a simulation with already parsed arguments. Prompts are written to and parameters
/// read from `input`/`output` when `args.config` is `None`; the execution summary is always
/// written to `output`.
///
/// # Errors
/// Returns an error if the parameters are missing or invalid, or if any output file cannot be
/// written.
pub fn run_with_args<R, W>(
    args: BaseArgs,
    input: &mut R,
    output: &mut W,
) -> Result<ExecutionStatistics, EpigridError>
where
    R: BufRead,
    W: Write,
{
    configure_logging(&args)?;

    let parameters = match &args.config {
        Some(path) => {
            info!("Loading parameters from: {}", path.display());
            Parameters::from_json_file(path)?
        }
        None => read_parameters(input, output)?,
    };

    let mut collector = ExecutionProfilingCollector::new();
    let tracker = AllocationTracker::new();
    let mut simulation = Simulation::new(parameters, &tracker)?;
    let days = simulation.parameters().days;

    // Output files are only touched once the run is set up; the report is validated before
    // an existing snapshot file is truncated.
    let mut report = args
        .report
        .as_deref()
        .map(DailyReport::create)
        .transpose()?;
    let mut snapshots: Box<dyn SnapshotSink> = if args.no_snapshots {
        Box::new(NullSink)
    } else {
        Box::new(TextSnapshotWriter::create(&args.output)?)
    };
    if args.progress {
        init_day_progress_bar(days);
    }

    simulation.run(snapshots.as_mut(), |summary| {
        if let Some(report) = report.as_mut() {
            report.send(summary)?;
        }
        if args.progress && summary.day > 0 {
            update_day_progress(summary.day);
        }
        Ok(())
    })?;

    let final_infected = simulation.infected_count();
    let population = simulation.current().area();
    simulation.release(&tracker);

    let statistics =
        collector.compute_final_statistics(&tracker, final_infected, population, days);
    write_execution_statistics(output, &statistics)?;
    log_execution_statistics(&statistics);
    Ok(statistics)
}
