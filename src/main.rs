use std::process::ExitCode;

fn main() -> ExitCode {
    stock_metrics::logging::init();
    match stock_metrics::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
