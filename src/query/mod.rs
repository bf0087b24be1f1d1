//! Statement submission and result handling.

pub mod clean;
pub mod operation;
pub mod results;

pub use clean::clean;
pub use operation::Operation;
pub use results::{drain_all, Row, RowSet, DEFAULT_FETCH_SIZE};
