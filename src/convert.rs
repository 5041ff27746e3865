//! Pure record reshaping between batch layouts.
//!
//! Payload values are moved, never rebuilt: only the wrapper objects around
//! them change.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MigrateError, Result};
use crate::schema::remote_batch::{
    self, BackendField, BraketTaskEntry, BraketTaskRecord, TaskIrField, TaskResultField,
};
use crate::schema::shot_results::{ShotResultRecord, ShotResults};
use crate::schema::tagged::{self, BatchDocument, BraketTask, TaskDocument};

/// Per-task facts gathered while converting, reported back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub task_ids: Vec<u64>,
    pub parallel_decoder_tasks: Vec<u64>,
    pub defaulted_metadata_tasks: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion<T> {
    pub document: T,
    pub summary: ConversionSummary,
}

/// Convert a shot-results document into the `remote_batch` layout.
///
/// Tasks come out sorted by integer id, since the source is a map whose
/// ordering carries no meaning. The source has no batch source or name, so
/// both are emitted as `null`.
pub fn shot_results_to_remote_batch(
    results: ShotResults,
) -> Result<Conversion<remote_batch::RemoteBatch>> {
    let mut tasks = results.tasks;
    tasks.sort_by_key(|(id, _)| *id);
    ensure_unique_ids(tasks.iter().map(|(id, _)| *id), "hardware_task_shot_results")?;

    let mut summary = ConversionSummary::default();
    let tasks = tasks
        .into_iter()
        .map(|(id, record)| {
            summary.task_ids.push(id);
            if record.hardware_task.parallel_decoder.is_some() {
                summary.parallel_decoder_tasks.push(id);
            }
            summary.defaulted_metadata_tasks.push(id);
            tracing::debug!(task = id, "reshaping shot-result record");
            (id, shot_result_to_entry(record))
        })
        .collect();

    Ok(Conversion {
        document: remote_batch::RemoteBatch {
            source: Value::Null,
            name: Value::Null,
            tasks,
        },
        summary,
    })
}

fn shot_result_to_entry(record: ShotResultRecord) -> BraketTaskEntry {
    let ShotResultRecord {
        task_id,
        hardware_task,
        task_result_ir,
    } = record;

    BraketTaskEntry {
        braket_task: BraketTaskRecord {
            backend: BackendField {
                braket_backend: hardware_task.braket_backend,
            },
            parallel_decoder: hardware_task.parallel_decoder,
            task_id,
            task_result_ir: TaskResultField { task_result_ir },
            task_ir: TaskIrField {
                quera_task_specification: hardware_task.task_ir,
            },
            metadata: Some(Value::Object(Map::new())),
        },
    }
}

/// Convert a `remote_batch` document into the tagged-union layout, keeping
/// task order as given.
pub fn remote_batch_to_tagged(
    batch: remote_batch::RemoteBatch,
) -> Result<Conversion<BatchDocument>> {
    ensure_unique_ids(batch.tasks.iter().map(|(id, _)| *id), "remote_batch.tasks")?;

    let mut summary = ConversionSummary::default();
    let mut tasks = Vec::with_capacity(batch.tasks.len());
    for (index, (id, entry)) in batch.tasks.into_iter().enumerate() {
        let record = entry.braket_task;
        let context = format!("remote_batch.tasks[{index}].braket_task");

        let parallel_decoder = unwrap_parallel_decoder(record.parallel_decoder, &context)?;
        if parallel_decoder.is_some() {
            summary.parallel_decoder_tasks.push(id);
        }

        let metadata = match record.metadata {
            Some(metadata) => metadata,
            None => {
                tracing::warn!(task = id, "task has no metadata, defaulting to an empty object");
                summary.defaulted_metadata_tasks.push(id);
                Value::Object(Map::new())
            }
        };

        summary.task_ids.push(id);
        tracing::debug!(task = id, "reshaping braket task");
        tasks.push((
            id,
            TaskDocument::BraketTask(BraketTask {
                backend: record.backend.braket_backend,
                parallel_decoder,
                task_id: record.task_id,
                task_result_ir: record.task_result_ir.task_result_ir,
                task_ir: record.task_ir.quera_task_specification,
                metadata,
            }),
        ));
    }

    Ok(Conversion {
        document: BatchDocument::RemoteBatch(tagged::RemoteBatch {
            source: batch.source,
            name: batch.name,
            tasks,
        }),
        summary,
    })
}

/// Strip the `{"parallel_decoder": ...}` wrapper. Absent and `null` both mean
/// no decoder.
fn unwrap_parallel_decoder(field: Option<Value>, context: &str) -> Result<Option<Value>> {
    match field {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(mut wrapper)) => match wrapper.remove("parallel_decoder") {
            Some(Value::Null) => Ok(None),
            Some(decoder) => Ok(Some(decoder)),
            None => Err(MigrateError::schema(
                format!("{context}.parallel_decoder"),
                "missing field `parallel_decoder`",
            )),
        },
        Some(other) => Err(MigrateError::schema(
            format!("{context}.parallel_decoder"),
            format!("expected an object or null, found {other}"),
        )),
    }
}

fn ensure_unique_ids(ids: impl Iterator<Item = u64>, context: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(MigrateError::schema(context, format!("duplicate task id {id}")));
        }
    }
    Ok(())
}
