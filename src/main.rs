use clap::Parser;
use log::info;
use snafu::ErrorCompat;

mod args;
mod board;

use crate::args::Args;
use crate::board::BoardError;

fn main() {
    let args = Args::parse();
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else {
        env_logger::init();
    }
    info!("args: {:?}", args);

    if args.polls_config.is_some() != args.html_file.is_some() {
        eprintln!("A page update needs both --polls-config and --html-file");
        std::process::exit(2);
    }

    let mut operations = 0;
    let mut failures = 0;

    if args.csv_file.is_some() || args.json_file.is_some() {
        operations += 1;
        if let Err(e) = board::run_report(&args) {
            report_error(&e);
            failures += 1;
        }
    }

    // The page update runs independently of the report: a failed splice must
    // not undo a report that already succeeded.
    if let (Some(definitions), Some(page)) = (&args.polls_config, &args.html_file) {
        operations += 1;
        if let Err(e) = board::run_page_update(definitions, page) {
            report_error(&e);
            failures += 1;
        }
    }

    if operations == 0 {
        eprintln!(
            "Nothing to do: provide --csv-file or --json-file for a report, or --polls-config together with --html-file for a page update"
        );
        std::process::exit(2);
    }
    if failures > 0 {
        std::process::exit(1);
    }
}

fn report_error(e: &BoardError) {
    eprintln!("An error occurred: {}", e);
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
}
