// Runs without a console window in release; diagnostics then go to a dialog
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use clap::Parser;
use std::process::ExitCode;

use runres::cli::Cli;
use runres::{create_backend, logging, report, DisplayController, Orchestrator, ReportSink, SystemLauncher};

fn main() -> ExitCode {
    let sink = ReportSink::detect();
    let code = run(&sink);
    sink.finish(&report::program_title());
    code
}

fn run(sink: &ReportSink) -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version land here too, with exit code 0
            sink.usage(&e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    if let Err(e) = logging::init_logging(cli.log_level, cli.log_file, sink.clone()) {
        sink.report(&format!("Failed to initialize logging: {:#}", e));
    }

    let orchestrator = Orchestrator::new(DisplayController::new(create_backend()), SystemLauncher);

    match orchestrator.run(cli.width, cli.height, &cli.cmd) {
        Ok(report) => match report.error_message() {
            Some(message) => {
                sink.report(&message);
                ExitCode::FAILURE
            }
            None => ExitCode::SUCCESS,
        },
        Err(e) => {
            sink.report(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
