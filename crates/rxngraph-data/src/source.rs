//! Artifact resolution: mapping `(dataset id, split)` to artifact bytes.
//!
//! The dataset never opens files itself. It asks an [`ArtifactResolver`] for
//! the bytes of a named artifact, so tests can serve fixtures from memory
//! and production code can read from a data directory.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use rxngraph_core::{Error, Result};

/// The closed set of known datasets.
///
/// Ids 1 and 2 are the production variants and share the
/// `dataset_{id}_{split}` naming scheme; id 3 is the held-out test set,
/// named `test_{split}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetId {
    Production1,
    Production2,
    HeldOutTest,
}

impl DatasetId {
    pub const ALL: [DatasetId; 3] = [
        DatasetId::Production1,
        DatasetId::Production2,
        DatasetId::HeldOutTest,
    ];

    /// Numeric code used on the command line and in file names.
    pub fn code(&self) -> u32 {
        match self {
            DatasetId::Production1 => 1,
            DatasetId::Production2 => 2,
            DatasetId::HeldOutTest => 3,
        }
    }

    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(DatasetId::Production1),
            2 => Ok(DatasetId::Production2),
            3 => Ok(DatasetId::HeldOutTest),
            other => Err(Error::UnknownDatasetId(other)),
        }
    }

    /// Artifact name (without extension) for a split of this dataset.
    pub fn artifact_name(&self, split: u32) -> String {
        match self {
            DatasetId::Production1 | DatasetId::Production2 => {
                format!("dataset_{}_{}", self.code(), split)
            }
            DatasetId::HeldOutTest => format!("test_{split}"),
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetId::HeldOutTest => write!(f, "test"),
            other => write!(f, "dataset-{}", other.code()),
        }
    }
}

/// Strategy that turns an artifact name into its bytes.
///
/// Implementations report an absent or unreadable artifact as
/// [`Error::DatasetNotFound`].
pub trait ArtifactResolver: Send + Sync {
    /// Fetch the bytes of the artifact called `name`.
    fn fetch(&self, name: &str) -> Result<Vec<u8>>;

    /// Human-readable location of `name`, for logs and errors.
    fn describe(&self, name: &str) -> String {
        name.to_string()
    }

    /// Fetch the artifact for a dataset split.
    fn fetch_split(&self, id: DatasetId, split: u32) -> Result<Vec<u8>> {
        self.fetch(&id.artifact_name(split))
    }
}

/// Reads `<root>/<name>.<extension>` from the filesystem.
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
    extension: String,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Full path of the artifact called `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        if self.extension.is_empty() {
            self.root.join(name)
        } else {
            self.root.join(format!("{name}.{}", self.extension))
        }
    }
}

impl ArtifactResolver for FsResolver {
    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name);
        tracing::debug!(path = %path.display(), "reading artifact");
        std::fs::read(&path).map_err(|e| Error::DatasetNotFound {
            artifact: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn describe(&self, name: &str) -> String {
        self.path_for(name).display().to_string()
    }
}

/// Serves artifacts from an in-memory map, keyed by artifact name.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    artifacts: HashMap<String, Vec<u8>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.artifacts.insert(name.into(), bytes);
    }

    /// Register bytes under the name a dataset split resolves to.
    pub fn with_split(mut self, id: DatasetId, split: u32, bytes: Vec<u8>) -> Self {
        self.insert(id.artifact_name(split), bytes);
        self
    }
}

impl ArtifactResolver for MemoryResolver {
    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        self.artifacts
            .get(name)
            .cloned()
            .ok_or_else(|| Error::DatasetNotFound {
                artifact: name.to_string(),
                reason: "not registered in memory resolver".to_string(),
            })
    }

    fn describe(&self, name: &str) -> String {
        format!("memory:{name}")
    }
}
