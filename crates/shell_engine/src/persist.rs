use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("invalid store namespace {0:?}")]
    InvalidNamespace(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Directory holding one JSON document per store namespace.
#[derive(Debug, Clone)]
pub struct StoreDir {
    root: PathBuf,
}

impl StoreDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `namespace`. Only a plain file name is a valid namespace.
    pub fn document(&self, namespace: &str) -> Result<PathBuf, PersistError> {
        if namespace.is_empty() || Path::new(namespace).file_name() != Some(OsStr::new(namespace)) {
            return Err(PersistError::InvalidNamespace(namespace.to_string()));
        }
        Ok(self.root.join(namespace))
    }

    /// Raw document text, `None` if it was never written.
    pub fn read(&self, namespace: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.document(namespace)?) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces the document of `namespace` with `values` as pretty JSON.
    ///
    /// Readers see either the old or the new document, never a partial one.
    pub fn replace(
        &self,
        namespace: &str,
        values: &Map<String, Value>,
    ) -> Result<PathBuf, PersistError> {
        let target = self.document(namespace)?;
        self.prepare()?;

        let mut content = serde_json::to_vec_pretty(values)?;
        content.push(b'\n');
        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(&content)?;
        staged.as_file_mut().sync_all()?;
        staged.persist(&target).map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }

    fn prepare(&self) -> Result<(), PersistError> {
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(PersistError::NotADirectory(self.root.clone())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.root)?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
