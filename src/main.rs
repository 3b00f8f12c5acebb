use clap::Parser;
use std::process;
use weather_comfort::cli::{self, Args};
use weather_comfort::constants::ERROR_GLYPH;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    if let Err(error) = cli::setup_logging(&args) {
        eprintln!("Failed to initialize logging: {:#}", error);
    }

    match cli::run(&args) {
        Ok(outcome) => {
            // The report has already been printed by the command
            process::exit(outcome.exit_code());
        }
        Err(error) => {
            // Faults never crash the process; surface them as a message
            eprintln!("{} {:#}", ERROR_GLYPH, error);
            process::exit(1);
        }
    }
}
