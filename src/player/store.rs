use std::collections::HashMap;

use anyhow::Result;

/// Persisted per-video state the controller reads and writes.
///
/// Plain get/set semantics; callers must not rely on writes being atomic
/// across keys.
pub(crate) trait PlaybackStore {
    fn resume_position(&self, video_id: &str) -> Result<Option<f64>>;
    fn set_resume_position(&mut self, video_id: &str, secs: f64) -> Result<()>;
    fn last_viewed_ms(&self, video_id: &str) -> Result<Option<i64>>;
    fn set_last_viewed_ms(&mut self, video_id: &str, at_ms: i64) -> Result<()>;
    fn preferred_quality(&self) -> Result<Option<u32>>;
    fn set_preferred_quality(&mut self, quality: u32) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryStore {
    resume: HashMap<String, f64>,
    viewed: HashMap<String, i64>,
    preferred_quality: Option<u32>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl PlaybackStore for MemoryStore {
    fn resume_position(&self, video_id: &str) -> Result<Option<f64>> {
        Ok(self.resume.get(video_id).copied())
    }

    fn set_resume_position(&mut self, video_id: &str, secs: f64) -> Result<()> {
        self.resume.insert(video_id.to_string(), secs);
        Ok(())
    }

    fn last_viewed_ms(&self, video_id: &str) -> Result<Option<i64>> {
        Ok(self.viewed.get(video_id).copied())
    }

    fn set_last_viewed_ms(&mut self, video_id: &str, at_ms: i64) -> Result<()> {
        self.viewed.insert(video_id.to_string(), at_ms);
        Ok(())
    }

    fn preferred_quality(&self) -> Result<Option<u32>> {
        Ok(self.preferred_quality)
    }

    fn set_preferred_quality(&mut self, quality: u32) -> Result<()> {
        self.preferred_quality = Some(quality);
        Ok(())
    }
}

/// Side effects the controller hands back to whoever embeds it.
pub(crate) trait PlayerHost {
    /// Reports a counted view. Errors are logged and dropped by the caller.
    fn on_view(&mut self, video_id: &str) -> Result<()>;

    fn on_ended(&mut self) {}

    fn on_next(&mut self) {}

    fn on_prev(&mut self) {}

    fn on_return(&mut self) {}

    fn on_close(&mut self) {}
}
