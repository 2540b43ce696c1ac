use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// String-keyed persistent storage, the only I/O surface of the app.
/// Reads are infallible; writes may touch the filesystem.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    Project,
    Global,
}

/// Key-value map persisted as a single YAML file, rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    pub scope: StoreScope,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: PathBuf, scope: StoreScope) -> Result<Self> {
        let entries = if path.exists() {
            let data =
                fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
            serde_yaml::from_str(&data).context("parsing store file")?
        } else {
            HashMap::new()
        };
        Ok(FileStore {
            path,
            scope,
            entries,
        })
    }

    /// Opens the store for the current directory: a `.taskdesk` directory in
    /// the cwd or any ancestor wins, otherwise the per-user data directory.
    pub fn open_current() -> Result<Self> {
        let cwd = env::current_dir()?;
        match find_project_dir(&cwd) {
            Some(dir) => FileStore::open(dir.join("store.yml"), StoreScope::Project),
            None => FileStore::open(global_store_path()?, StoreScope::Global),
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        let serialized = serde_yaml::to_string(&self.entries).context("serializing store")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("writing {:?}", self.path))?;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

/// In-memory store with no persistence, used by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

fn find_project_dir(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(".taskdesk");
        if candidate.is_dir() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_store_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "taskdesk").context("locating data directory")?;
    Ok(dirs.data_dir().join("store.yml"))
}
