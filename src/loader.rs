//! Loaders used to validate a migrated document before it reaches disk.

use serde_json::Value;

use crate::error::{MigrateError, Result};
use crate::schema::remote_batch::RemoteBatch;
use crate::schema::tagged::{BatchDocument, REMOTE_BATCH_TAG};

/// Load a tagged-union batch document from its serialized text.
pub fn loads(text: &str) -> Result<BatchDocument> {
    serde_json::from_str(text).map_err(|err| MigrateError::schema(REMOTE_BATCH_TAG, err))
}

/// Load a `remote_batch` document from its serialized text.
///
/// This checks the layout only. A raw `parallel_decoder` passes here but is
/// rejected by [`crate::convert::remote_batch_to_tagged`], which expects the
/// `{"parallel_decoder": ...}` wrapper.
pub fn loads_remote_batch(text: &str) -> Result<RemoteBatch> {
    let document: Value =
        serde_json::from_str(text).map_err(|err| MigrateError::schema("document", err))?;
    RemoteBatch::from_value(document)
}
