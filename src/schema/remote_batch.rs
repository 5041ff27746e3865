//! The intermediate `remote_batch` layout: wrapper objects around every payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{decode, take_root};
use crate::error::Result;

pub const ROOT_KEY: &str = "remote_batch";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteBatchFile {
    pub remote_batch: RemoteBatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBatch {
    pub source: Value,
    pub name: Value,
    pub tasks: Vec<(u64, BraketTaskEntry)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BraketTaskEntry {
    pub braket_task: BraketTaskRecord,
}

/// Field order matches the serialized layout existing batch files use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BraketTaskRecord {
    pub backend: BackendField,
    /// Either absent, `null`, or `{"parallel_decoder": ...}`.
    #[serde(default)]
    pub parallel_decoder: Option<Value>,
    pub task_id: Value,
    pub task_result_ir: TaskResultField,
    pub task_ir: TaskIrField,
    /// `None` only when the key is absent; an explicit `null` is kept.
    #[serde(default, deserialize_with = "present")]
    pub metadata: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendField {
    pub braket_backend: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResultField {
    pub task_result_ir: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskIrField {
    pub quera_task_specification: Value,
}

#[derive(Deserialize)]
struct RawRemoteBatch {
    source: Value,
    name: Value,
    tasks: Vec<Value>,
}

impl RemoteBatch {
    /// Decode a full `{"remote_batch": ...}` document.
    pub fn from_value(document: Value) -> Result<Self> {
        let raw: RawRemoteBatch = decode(take_root(document, ROOT_KEY)?, ROOT_KEY)?;

        let tasks = raw
            .tasks
            .into_iter()
            .enumerate()
            .map(|(index, entry)| decode(entry, &format!("{ROOT_KEY}.tasks[{index}]")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            source: raw.source,
            name: raw.name,
            tasks,
        })
    }

    pub fn into_file(self) -> RemoteBatchFile {
        RemoteBatchFile { remote_batch: self }
    }
}
