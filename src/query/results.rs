//! Result aggregation.
//!
//! [`drain_all`] drives an [`Operation`] through one wait and repeated
//! bounded fetches until the exhaustion signal, concatenating batches in
//! arrival order into one [`RowSet`].

use crate::error::HiveError;
use crate::query::operation::Operation;

pub use crate::transport::messages::Row;

/// Batch size used by the convenience query path.
pub const DEFAULT_FETCH_SIZE: i64 = 100;

/// An aggregated, ordered result set. Owned exclusively by the caller once
/// returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    /// Create a row set from already-collected rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result set is empty. An empty result is a valid outcome,
    /// not an error.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the rows in arrival order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the set, yielding the rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl IntoIterator for RowSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Drain an operation to completion.
///
/// Waits once for the operation to reach a terminal state, then fetches
/// batches of up to `batch_size` rows until an empty batch signals
/// exhaustion. Batches are concatenated in fetch order; zero batches yield a
/// valid empty set. There is no iteration bound beyond the exhaustion signal;
/// callers needing a bounded wait configure it on the connection parameters.
///
/// # Errors
///
/// Returns the wrapped error of whichever wait or fetch call failed. A
/// terminal `Error` state fails before any fetch is issued.
pub async fn drain_all(operation: &mut Operation, batch_size: i64) -> Result<RowSet, HiveError> {
    operation.wait().await?;

    let mut rows: Vec<Row> = Vec::new();
    loop {
        let batch = operation.fetch(batch_size).await?;
        if batch.is_empty() {
            return Ok(RowSet::new(rows));
        }
        rows.extend(batch);
    }
}
