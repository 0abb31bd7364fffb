//! Operations exposed to frontends: sync, search, point lookup and
//! repository management.

pub mod context;
pub mod error;
pub mod repos;
pub mod search;
pub mod sync;
pub mod types;

pub use context::PkgdexContext;
pub use error::{OperationError, OperationResult};
pub use types::*;
