use std::process::ExitCode;

use epigrid::log::info;
use epigrid::runner::run;

fn main() -> ExitCode {
    match run() {
        Ok(statistics) => {
            info!("runner_test_epigrid done, {} infected", statistics.final_infected);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
