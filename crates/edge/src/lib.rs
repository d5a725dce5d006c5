//! Edge compute worker: the mid-tier move source the CPU gateway calls into
//! for levels 3-6, trading search depth for a hard, predictable CPU budget.

mod error;
mod handler;
mod opening_book;

pub use error::EdgeError;
pub use handler::{handle, EdgeDiagnostics, EdgeMode, EdgeRequest, EdgeResponse};
