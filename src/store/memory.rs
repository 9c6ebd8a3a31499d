use std::sync::Mutex;

use crate::app::{Result, TidelineError};
use crate::domain::Watermarks;
use crate::store::WatermarkStore;

/// Watermarks kept in process memory; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    watermarks: Mutex<Watermarks>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatermarkStore for MemoryStore {
    fn load(&self) -> Result<Watermarks> {
        self.watermarks
            .lock()
            .map(|w| w.clone())
            .map_err(|e| TidelineError::Other(e.to_string()))
    }

    fn save(&self, watermarks: &Watermarks) -> Result<()> {
        let mut stored = self
            .watermarks
            .lock()
            .map_err(|e| TidelineError::Other(e.to_string()))?;
        *stored = watermarks.clone();
        Ok(())
    }
}
