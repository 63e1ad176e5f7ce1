mod environment;
mod error;

pub use environment::Environment;
pub use error::{AppError, ErrorBody, CAPACITY_EXCEEDED_MESSAGE};
