// DataConfig — where dataset artifacts live on disk

use std::path::PathBuf;

use crate::source::FsResolver;

/// Configuration for filesystem-backed dataset loading.
///
/// # Example
/// ```ignore
/// let config = DataConfig::default().root("/mnt/rxn").extension("safetensors");
/// let ds = ReactionDataset::load(&config.resolver(), DatasetId::Production1, 0)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    /// Directory holding the artifacts.
    pub root: PathBuf,
    /// File extension of artifacts, without the dot. Empty means none.
    pub extension: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data"),
            extension: "safetensors".to_string(),
        }
    }
}

impl DataConfig {
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into();
        self
    }

    /// A resolver reading `<root>/<name>.<extension>`.
    pub fn resolver(&self) -> FsResolver {
        FsResolver::new(self.root.clone(), self.extension.clone())
    }
}
