use crate::{AssetLayout, SampleBuffer, read_wav_mono};
use hol_core::Pitch;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("missing audio: {} ({reason})", path.display())]
    Unavailable { path: PathBuf, reason: String },
}

impl AssetError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Unavailable { path, .. } => path,
        }
    }
}

type Slot = Arc<OnceLock<Result<SampleBuffer, AssetError>>>;

/// Memoizes decoded files by path. Entries are never evicted, and failures are remembered just
/// like successes. Concurrent requests for the same path decode the file once; the other callers
/// block until it's ready.
#[derive(Default)]
pub struct BufferCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl BufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, path: &Path) -> Slot {
        // A poisoned lock only means another thread panicked while inserting a slot. The map
        // itself is still usable.
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(slots.entry(path.to_path_buf()).or_default())
    }

    pub fn get_or_load(
        &self,
        path: &Path,
        load: impl FnOnce(&Path) -> anyhow::Result<SampleBuffer>,
    ) -> Result<SampleBuffer, AssetError> {
        let slot = self.slot(path);
        slot.get_or_init(|| {
            log::debug!("loading {}", path.display());
            load(path).map_err(|e| {
                log::warn!("failed to load {}: {}", path.display(), e);
                AssetError::Unavailable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })
        })
        .clone()
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of the sample to play for a pitch
pub trait SampleLoader: Send + Sync {
    fn load(&self, pitch: Pitch) -> Result<SampleBuffer, AssetError>;
}

/// Loads wav files laid out according to an `AssetLayout`, caching the results
pub struct PitchSamples {
    layout: AssetLayout,
    cache: BufferCache,
}

impl PitchSamples {
    pub fn new(layout: AssetLayout) -> Self {
        Self {
            layout,
            cache: BufferCache::new(),
        }
    }
}

impl SampleLoader for PitchSamples {
    fn load(&self, pitch: Pitch) -> Result<SampleBuffer, AssetError> {
        let path = self.layout.path(pitch);
        self.cache.get_or_load(&path, |path| {
            let buffer = read_wav_mono(path)?;
            if buffer.is_empty() {
                anyhow::bail!("wav file contains no samples");
            }
            Ok(buffer)
        })
    }
}
