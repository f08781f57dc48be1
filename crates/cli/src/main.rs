//! Tally CLI: optimistic counters from the command line.
//!
//! Two modes:
//! - **Shell mode**: `tally [flags] COMMAND`: single command, then exit
//! - **Pipe mode**: `printf 'incr k\nrace k\n' | tally`: line-by-line from
//!   stdin, all lines against the same in-process store

mod commands;
mod config;
mod format;
mod parse;
mod session;

use std::io::BufRead;
use std::process;

use tracing_subscriber::EnvFilter;

use commands::build_cli;
use config::CliConfig;
use format::{format_error, format_output, OutputMode};
use parse::{matches_to_action, parse_line};
use session::Session;

fn main() {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let session = match CliConfig::from_matches(&matches).and_then(|config| config.open()) {
        Ok(db) => Session::new(db),
        Err(e) => {
            eprintln!("(error) {:#}", e);
            process::exit(1);
        }
    };

    let exit_code = if matches.subcommand().is_some() {
        run_shell_mode(&matches, &session, output_mode)
    } else {
        run_pipe_mode(&session, output_mode)
    };
    process::exit(exit_code);
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_shell_mode(matches: &clap::ArgMatches, session: &Session, mode: OutputMode) -> i32 {
    match matches_to_action(matches) {
        Ok(action) => execute(session, action, mode),
        Err(e) => {
            eprintln!("(error) {}", e);
            1
        }
    }
}

fn run_pipe_mode(session: &Session, mode: OutputMode) -> i32 {
    let stdin = std::io::stdin();
    let mut exit_code = 0;

    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("(error) failed to read stdin: {}", e);
                return 1;
            }
        };
        match parse_line(&line) {
            Ok(Some(action)) => {
                if execute(session, action, mode) != 0 {
                    exit_code = 1;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(line = line_no + 1, "unparseable input line");
                eprintln!("(error) line {}: {}", line_no + 1, e);
                exit_code = 1;
            }
        }
    }
    exit_code
}

fn execute(session: &Session, action: parse::Action, mode: OutputMode) -> i32 {
    match session.execute(action) {
        Ok(output) => {
            println!("{}", format_output(&output, mode));
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}
