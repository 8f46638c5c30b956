pub mod envelope;
pub mod operation;

pub use envelope::{ApiError, ApiFailure, ApiSuccess};
pub use operation::{Operation, OperationOutput, ALLOWED_KEYS};
