//! Serde models for every batch document layout the migrator reads or writes.
//!
//! Legacy layouts are decoded in two steps: the envelope first, then each
//! task record on its own so a schema error can name the task it came from.

pub mod remote_batch;
pub mod shot_results;
pub mod tagged;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{MigrateError, Result};

/// Legacy layout an input document is expected to follow.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
pub enum LegacySchema {
    /// `{"hardware_task_shot_results": {"<id>": {...}}}`
    ShotResults,
    /// `{"remote_batch": {"source", "name", "tasks": [[id, {...}]]}}`
    #[default]
    RemoteBatch,
}

impl LegacySchema {
    /// Top-level key a document in this layout must carry.
    pub fn root_key(self) -> &'static str {
        match self {
            Self::ShotResults => shot_results::ROOT_KEY,
            Self::RemoteBatch => remote_batch::ROOT_KEY,
        }
    }

    /// Layout the migrated document is written in.
    pub fn target(self) -> &'static str {
        match self {
            Self::ShotResults => remote_batch::ROOT_KEY,
            Self::RemoteBatch => tagged::REMOTE_BATCH_TAG,
        }
    }
}

impl std::fmt::Display for LegacySchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShotResults => write!(f, "shot-results"),
            Self::RemoteBatch => write!(f, "remote-batch"),
        }
    }
}

/// Remove and return the value under `key` from a top-level JSON object.
pub(crate) fn take_root(document: Value, key: &str) -> Result<Value> {
    let Value::Object(mut root) = document else {
        return Err(MigrateError::schema(
            "document",
            format!("expected a JSON object with top-level key `{key}`"),
        ));
    };

    root.remove(key).ok_or_else(|| {
        MigrateError::schema("document", format!("missing top-level key `{key}`"))
    })
}

/// Deserialize `value` into `T`, reporting failures as schema errors at `context`.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, context: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|err| MigrateError::schema(context, err))
}
