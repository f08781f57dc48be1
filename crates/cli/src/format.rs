//! Output formatting, redis-cli style.

use serde_json::json;
use tally::{CoordinatorMetrics, Error, FanOutReport, Key, StoreStats, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Result of one executed action.
#[derive(Debug)]
pub enum Output {
    Ok,
    Value(Option<Value>),
    Integer(i64),
    Race {
        key: Key,
        report: FanOutReport,
        final_value: i64,
    },
    Stats {
        store: StoreStats,
        coordinator: CoordinatorMetrics,
    },
}

pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format_human(output),
        OutputMode::Json => format_json(output).to_string(),
    }
}

pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format!("(error) {}", err),
        OutputMode::Json => json!({ "error": err.to_string() }).to_string(),
    }
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Ok => "OK".to_string(),
        Output::Value(None) => "(nil)".to_string(),
        Output::Value(Some(Value::Int(n))) | Output::Integer(n) => format!("(integer) {}", n),
        Output::Value(Some(Value::String(s))) => format!("\"{}\"", s),
        Output::Race {
            key,
            report,
            final_value,
        } => format!(
            "{} workers on {}: {} committed, {} failed, {} attempts (max {} per worker), final value {} in {}ms",
            report.workers,
            key,
            report.committed,
            report.failures.len(),
            report.attempts,
            report.max_attempts_seen,
            final_value,
            report.elapsed.as_millis()
        ),
        Output::Stats { store, coordinator } => format!(
            "reads: {}\nwatched: {}\ncommits: {}\naborts: {}\nbatches: {}\nabort_rate: {:.3}\ninvocations: {}\nexhausted: {}\nfailed: {}",
            store.reads,
            store.watched_transactions,
            store.commits,
            store.aborts,
            store.batches,
            store.abort_rate(),
            coordinator.invocations,
            coordinator.exhausted,
            coordinator.failed
        ),
    }
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Int(n) => json!(n),
        Value::String(s) => json!(s),
    }
}

fn format_json(output: &Output) -> serde_json::Value {
    match output {
        Output::Ok => json!("OK"),
        Output::Value(value) => value.as_ref().map_or(serde_json::Value::Null, value_json),
        Output::Integer(n) => json!(n),
        Output::Race {
            key,
            report,
            final_value,
        } => json!({
            "key": key.as_str(),
            "workers": report.workers,
            "committed": report.committed,
            "failed": report.failures.len(),
            "errors": report.failures.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            "attempts": report.attempts,
            "max_attempts_seen": report.max_attempts_seen,
            "final_value": final_value,
            "elapsed_ms": report.elapsed.as_millis() as u64,
        }),
        Output::Stats { store, coordinator } => json!({
            "store": {
                "reads": store.reads,
                "watched_transactions": store.watched_transactions,
                "commits": store.commits,
                "aborts": store.aborts,
                "batches": store.batches,
            },
            "coordinator": {
                "invocations": coordinator.invocations,
                "committed": coordinator.committed,
                "conflicts": coordinator.conflicts,
                "exhausted": coordinator.exhausted,
                "failed": coordinator.failed,
            },
        }),
    }
}
