use hol_core::Pitch;
use std::path::PathBuf;

/// Where samples live on disk. The sample of each pitch is stored in its own file named after its
/// pitch class and octave, like "<dir>/csharp4.wav".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    pub dir: PathBuf,
    pub ext: String,
}

impl AssetLayout {
    pub fn new(dir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ext: ext.into(),
        }
    }

    pub fn file_name(&self, pitch: Pitch) -> String {
        format!(
            "{}{}.{}",
            pitch.class().sample_stem(),
            pitch.octave(),
            self.ext
        )
    }

    pub fn path(&self, pitch: Pitch) -> PathBuf {
        self.dir.join(self.file_name(pitch))
    }
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self::new("audio", "wav")
    }
}
