use std::process::ExitCode;

fn main() -> ExitCode {
    match epigrid::runner::run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
