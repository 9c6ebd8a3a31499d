pub mod context;
pub mod error;
pub mod pipeline;

pub use context::AppContext;
pub use error::{Result, TidelineError};
pub use pipeline::{Digest, RunOptions};
