use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

/// Name shown on exported images when the player doesn't give one
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// A directory of json files. Each type of data gets its own subdirectory, and each value within
/// it is identified by a title.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("higher-or-lower"))
    }
}

impl Store {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn containing_dir(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn file_path(&self, name: &str, title: impl AsRef<str>) -> PathBuf {
        let title = title.as_ref();
        // Hex the title so we can safely use it as part of a file path (ie. so it contains no
        // slashes or other characters that have meaning within a file path).
        let hexxed_title = hex::encode(title);
        let prefix = title
            .chars()
            .take_while(|&c| {
                c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' '
            })
            .map(|c| if c == ' ' { '-' } else { c })
            .collect::<String>();
        self.containing_dir(name)
            .join(format!("{}-{}.json", prefix, hexxed_title))
    }

    pub fn save(
        &self,
        name: &str,
        data: &impl Serialize,
        title: impl AsRef<str>,
    ) -> anyhow::Result<()> {
        use std::io::Write;
        fs::create_dir_all(self.containing_dir(name))?;
        let json_string = serde_json::to_string(data)?;
        let mut file = File::create(self.file_path(name, title))?;
        write!(file, "{}", json_string)?;
        Ok(())
    }

    /// Like `save` but prints a warning on failure rather than returning an error value.
    pub fn save_(
        &self,
        name: &str,
        data: &impl Serialize,
        title: impl AsRef<str>,
    ) {
        if let Err(e) = self.save(name, data, &title) {
            log::warn!("Failed to save {} for {}: {}", name, title.as_ref(), e);
        }
    }

    pub fn load<T>(
        &self,
        name: &str,
        title: impl AsRef<str>,
    ) -> anyhow::Result<T>
    where
        T: for<'a> Deserialize<'a>,
    {
        let json_string = fs::read_to_string(self.file_path(name, title))?;
        let t = serde_json::from_str(json_string.as_str())?;
        Ok(t)
    }

    /// Like `load` but prints a warning on failure rather than returning an error value. A file
    /// that doesn't exist yet isn't worth a warning.
    pub fn load_<T>(&self, name: &str, title: impl AsRef<str>) -> Option<T>
    where
        T: for<'a> Deserialize<'a>,
    {
        match self.load(name, &title) {
            Ok(t) => Some(t),
            Err(e) => {
                let not_found = e
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound);
                if !not_found {
                    log::warn!(
                        "Failed to load {} for {}: {}",
                        name,
                        title.as_ref(),
                        e
                    );
                }
                None
            }
        }
    }
}

/// Implement this when the type uniquely determines the directory where values of that type will
/// be persisted.
pub trait PersistData: Serialize + for<'a> Deserialize<'a> {
    const NAME: &'static str;

    fn save(
        &self,
        store: &Store,
        title: impl AsRef<str>,
    ) -> anyhow::Result<()> {
        store.save(Self::NAME, self, title)
    }

    /// Like `save` but prints a warning on failure rather than returning an error value.
    fn save_(&self, store: &Store, title: impl AsRef<str>) {
        store.save_(Self::NAME, self, title)
    }

    fn load(store: &Store, title: impl AsRef<str>) -> anyhow::Result<Self> {
        store.load(Self::NAME, title)
    }

    /// Like `load` but prints a warning on failure rather than returning an error value.
    fn load_(store: &Store, title: impl AsRef<str>) -> Option<Self> {
        store.load_(Self::NAME, title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
}

impl PersistData for PlayerProfile {
    const NAME: &'static str = "player-profile";
}

impl PlayerProfile {
    const TITLE: &'static str = "player";

    /// The name remembered from last time, or an empty string
    pub fn remembered_name(store: &Store) -> String {
        Self::load_(store, Self::TITLE)
            .map(|profile| profile.name)
            .unwrap_or_default()
    }

    /// Decides the name to put on an exported image from what the player typed. A non-empty name
    /// is remembered for next time. An empty one becomes `DEFAULT_PLAYER_NAME` and isn't saved.
    pub fn accept_name(store: &Store, input: &str) -> String {
        let name = input.trim();
        if name.is_empty() {
            return DEFAULT_PLAYER_NAME.to_string();
        }
        let profile = Self {
            name: name.to_string(),
        };
        profile.save_(store, Self::TITLE);
        profile.name
    }
}
