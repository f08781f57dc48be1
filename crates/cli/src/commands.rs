//! Clap command tree.

use clap::{value_parser, Arg, ArgAction, Command};

/// Full CLI: global flags plus subcommands.
pub fn build_cli() -> Command {
    Command::new("tally")
        .about("Watch-based optimistic counters")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config with [retry] and [store] tables"),
        )
        .arg(
            Arg::new("attempts")
                .long("attempts")
                .value_name("N")
                .value_parser(value_parser!(u32))
                .help("Attempts allowed per optimistic transaction"),
        )
        .arg(
            Arg::new("deadline-ms")
                .long("deadline-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Wall-clock bound across all attempts of one transaction"),
        )
        .arg(
            Arg::new("commit-delay-ms")
                .long("commit-delay-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Pause inside the watch window before each commit"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .subcommands(subcommands())
}

/// Subcommands only, for lines read in pipe mode.
pub fn build_line_parser() -> Command {
    Command::new("tally")
        .no_binary_name(true)
        .subcommand_required(true)
        .disable_help_subcommand(true)
        .subcommands(subcommands())
}

fn subcommands() -> Vec<Command> {
    vec![
        Command::new("get")
            .about("Read a key")
            .arg(Arg::new("key").required(true)),
        Command::new("set")
            .about("Overwrite a key")
            .arg(Arg::new("key").required(true))
            .arg(Arg::new("value").required(true).allow_hyphen_values(true)),
        Command::new("del")
            .about("Remove a key")
            .arg(Arg::new("key").required(true)),
        Command::new("incr")
            .about("Optimistically increment a counter")
            .arg(Arg::new("key").required(true))
            .arg(
                Arg::new("by")
                    .long("by")
                    .value_name("N")
                    .allow_hyphen_values(true)
                    .value_parser(value_parser!(i64))
                    .default_value("1"),
            ),
        Command::new("race")
            .about("Race concurrent workers incrementing one counter")
            .arg(Arg::new("key").required(true))
            .arg(
                Arg::new("workers")
                    .long("workers")
                    .value_name("N")
                    .value_parser(value_parser!(usize))
                    .default_value("100"),
            ),
        Command::new("stats").about("Show store and coordinator counters"),
    ]
}
