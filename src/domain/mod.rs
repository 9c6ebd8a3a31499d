pub mod entry;
pub mod feed;
pub mod watermark;

pub use entry::Entry;
pub use feed::{FailedSource, Feed, FeedSource};
pub use watermark::Watermarks;
