//! Current batch layout. Polymorphic values are single-key objects whose key
//! is the fully qualified variant name, which serde's externally tagged enums
//! produce directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const REMOTE_BATCH_TAG: &str = "bloqade.task.batch.RemoteBatch";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchDocument {
    #[serde(rename = "bloqade.task.batch.RemoteBatch")]
    RemoteBatch(RemoteBatch),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteBatch {
    pub source: Value,
    pub name: Value,
    pub tasks: Vec<(u64, TaskDocument)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskDocument {
    #[serde(rename = "bloqade.task.braket.BraketTask")]
    BraketTask(BraketTask),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BraketTask {
    pub backend: Value,
    pub parallel_decoder: Option<Value>,
    pub task_id: Value,
    pub task_result_ir: Value,
    pub task_ir: Value,
    pub metadata: Value,
}

impl BatchDocument {
    pub fn tasks(&self) -> &[(u64, TaskDocument)] {
        match self {
            Self::RemoteBatch(batch) => &batch.tasks,
        }
    }
}
