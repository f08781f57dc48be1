//! Executes actions against one in-process store.

use tally::{Result, Tally};

use crate::format::Output;
use crate::parse::Action;

pub struct Session {
    db: Tally,
}

impl Session {
    pub fn new(db: Tally) -> Self {
        Self { db }
    }

    pub fn execute(&self, action: Action) -> Result<Output> {
        match action {
            Action::Get { key } => self.db.get(key).map(Output::Value),
            Action::Set { key, value } => self.db.set(key, value).map(|_| Output::Ok),
            Action::Delete { key } => self.db.delete(key).map(|_| Output::Ok),
            Action::Incr { key, by } => self.db.incr_by(key, by).map(Output::Integer),
            Action::Race { key, workers } => {
                let report = self.db.race(key.clone(), workers)?;
                let final_value = self.db.get_int(key.clone())?;
                Ok(Output::Race {
                    key,
                    report,
                    final_value,
                })
            }
            Action::Stats => Ok(Output::Stats {
                store: self.db.stats(),
                coordinator: self.db.metrics(),
            }),
        }
    }
}
