//! Staged commands and commit outcomes
//!
//! A [`Batch`] is the unit a store applies atomically: every command in it
//! takes effect, or none does. Commands are only staged here; nothing is
//! visible to readers until a store applies the batch.

use crate::types::Key;
use crate::value::Value;
use smallvec::SmallVec;

/// A single write staged for an atomic batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Overwrite the key with a value
    Set {
        /// Target key
        key: Key,
        /// New value
        value: Value,
    },
    /// Remove the key
    Delete {
        /// Target key
        key: Key,
    },
    /// Add `delta` to the key's integer value, treating absent as zero
    IncrBy {
        /// Target key
        key: Key,
        /// Amount to add (may be negative)
        delta: i64,
    },
}

impl Command {
    /// Key this command writes
    pub fn key(&self) -> &Key {
        match self {
            Command::Set { key, .. } | Command::Delete { key } | Command::IncrBy { key, .. } => key,
        }
    }
}

/// Ordered commands applied all-or-nothing
///
/// Most transactions stage one or two writes, so the commands live inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    commands: SmallVec<[Command; 2]>,
}

impl Batch {
    /// Empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a `Set`
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> &mut Self {
        self.commands.push(Command::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Stage a `Delete`
    pub fn delete(&mut self, key: impl Into<Key>) -> &mut Self {
        self.commands.push(Command::Delete { key: key.into() });
        self
    }

    /// Stage an `IncrBy`
    pub fn incr_by(&mut self, key: impl Into<Key>, delta: i64) -> &mut Self {
        self.commands.push(Command::IncrBy {
            key: key.into(),
            delta,
        });
        self
    }

    /// Append an already built command
    pub fn push(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Number of staged commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if nothing is staged
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Staged commands in order
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Keys written by this batch, in staging order (may repeat)
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.commands.iter().map(Command::key)
    }
}

impl IntoIterator for Batch {
    type Item = Command;
    type IntoIter = smallvec::IntoIter<[Command; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl FromIterator<Command> for Batch {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Batch {
            commands: iter.into_iter().collect(),
        }
    }
}

/// Result of a watched transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No watched key changed; the batch was applied
    Committed,
    /// A watched key changed first; nothing was applied
    Aborted,
}

impl CommitOutcome {
    /// True for [`CommitOutcome::Committed`]
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed)
    }
}
