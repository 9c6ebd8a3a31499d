pub mod memory;
pub mod sqlite;

use crate::app::Result;
use crate::domain::Watermarks;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence of the per-feed watermarks.
///
/// Read once before a run and written once after it; implementations never
/// see concurrent callers.
pub trait WatermarkStore {
    fn load(&self) -> Result<Watermarks>;
    fn save(&self, watermarks: &Watermarks) -> Result<()>;
}
