//! ArgMatches → Action conversion.

use clap::ArgMatches;
use tally::{Key, Value};

use crate::commands::build_line_parser;

/// A single thing the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Get { key: Key },
    Set { key: Key, value: Value },
    Delete { key: Key },
    Incr { key: Key, by: i64 },
    Race { key: Key, workers: usize },
    Stats,
}

/// Convert clap ArgMatches (with a subcommand) into an Action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<Action, String> {
    let (sub_name, m) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "get" => Ok(Action::Get { key: key(m)? }),
        "set" => {
            let raw = m
                .get_one::<String>("value")
                .ok_or("Missing value")?;
            Ok(Action::Set {
                key: key(m)?,
                value: parse_value(raw),
            })
        }
        "del" => Ok(Action::Delete { key: key(m)? }),
        "incr" => Ok(Action::Incr {
            key: key(m)?,
            by: m.get_one::<i64>("by").copied().unwrap_or(1),
        }),
        "race" => Ok(Action::Race {
            key: key(m)?,
            workers: m.get_one::<usize>("workers").copied().unwrap_or(100),
        }),
        "stats" => Ok(Action::Stats),
        other => Err(format!("Unknown command: {}", other)),
    }
}

/// Parse one line of pipe input.
///
/// Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Action>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let words = shlex::split(trimmed).ok_or_else(|| "Unbalanced quotes".to_string())?;
    let matches = build_line_parser()
        .try_get_matches_from(words)
        .map_err(|e| e.to_string().trim_end().to_string())?;
    matches_to_action(&matches).map(Some)
}

/// Integers are stored as `Int`, everything else as `String`.
pub fn parse_value(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(n) => Value::Int(n),
        Err(_) => Value::String(raw.to_string()),
    }
}

fn key(m: &ArgMatches) -> Result<Key, String> {
    m.get_one::<String>("key")
        .map(|k| Key::new(k.as_str()))
        .ok_or_else(|| "Missing key".to_string())
}
