//! The oldest batch layout: a map from stringified task id to a shot-result record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, take_root};
use crate::error::{MigrateError, Result};

pub const ROOT_KEY: &str = "hardware_task_shot_results";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotResultRecord {
    /// Hardware-side task identifier, copied through untouched.
    pub task_id: Value,
    pub hardware_task: HardwareTask,
    pub task_result_ir: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareTask {
    pub task_ir: Value,
    pub braket_backend: Value,
    #[serde(default)]
    pub parallel_decoder: Option<Value>,
}

/// Every record of a shot-results document, in the source map's order.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotResults {
    pub tasks: Vec<(u64, ShotResultRecord)>,
}

impl ShotResults {
    pub fn from_value(document: Value) -> Result<Self> {
        let Value::Object(entries) = take_root(document, ROOT_KEY)? else {
            return Err(MigrateError::schema(
                ROOT_KEY,
                "expected an object keyed by task id",
            ));
        };

        let mut tasks = Vec::with_capacity(entries.len());
        for (key, record) in entries {
            let context = format!("{ROOT_KEY}[\"{key}\"]");
            let id = parse_task_key(&key).ok_or_else(|| {
                MigrateError::schema(&context, "task key is not an unsigned integer")
            })?;
            tasks.push((id, decode(record, &context)?));
        }

        Ok(Self { tasks })
    }
}

fn parse_task_key(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}
