//! CLI command implementations

mod analyze;
mod fetch;
mod init;
mod pipeline;
mod query;
mod transform;

pub use analyze::*;
pub use fetch::*;
pub use init::*;
pub use pipeline::*;
pub use query::*;
pub use transform::*;
