use std::collections::BTreeMap;
use std::fs;
use std::io::{
  self,
  Write
};
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use tasklist_core::storage::{
  KeyValueStore,
  StorageError,
  projected_bytes
};
use tempfile::NamedTempFile;
use tracing::{
  debug,
  info,
  warn
};

pub const STORAGE_FILE: &str =
  "storage.json";

/// Key-value store kept as one JSON
/// object on disk. Every access goes back
/// to the file.
#[derive(Debug)]
pub struct FileStore {
  pub path: PathBuf,
  quota:    Option<usize>
}

impl FileStore {
  #[tracing::instrument(skip(data_dir))]
  pub fn open(
    data_dir: &Path,
    quota: Option<usize>
  ) -> anyhow::Result<Self> {
    fs::create_dir_all(data_dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          data_dir.display()
        )
      })?;

    let path = data_dir.join(STORAGE_FILE);
    info!(
      path = %path.display(),
      ?quota,
      "opened file store"
    );

    Ok(Self {
      path,
      quota
    })
  }

  /// A missing file is an empty store; a
  /// malformed one is logged and read as
  /// empty too.
  fn read_items(
    &self
  ) -> Result<BTreeMap<String, String>, StorageError>
  {
    let raw = match fs::read_to_string(
      &self.path
    ) {
      | Ok(raw) => raw,
      | Err(err)
        if err.kind()
          == io::ErrorKind::NotFound =>
      {
        return Ok(BTreeMap::new());
      }
      | Err(err) => return Err(err.into())
    };

    if raw.trim().is_empty() {
      return Ok(BTreeMap::new());
    }

    match serde_json::from_str(&raw) {
      | Ok(items) => Ok(items),
      | Err(error) => {
        warn!(
          %error,
          path = %self.path.display(),
          "storage file is malformed; \
           reading as empty"
        );
        Ok(BTreeMap::new())
      }
    }
  }

  fn write_items(
    &self,
    items: &BTreeMap<String, String>
  ) -> Result<(), StorageError> {
    debug!(
      path = %self.path.display(),
      keys = items.len(),
      "writing storage file atomically"
    );

    let dir = self
      .path
      .parent()
      .unwrap_or_else(|| Path::new("."));
    let mut temp =
      NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(
      &mut temp, items
    )?;
    writeln!(temp)?;
    temp.flush()?;
    temp
      .persist(&self.path)
      .map_err(|err| err.error)?;
    Ok(())
  }
}

impl KeyValueStore for FileStore {
  fn get_item(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    Ok(self.read_items()?.remove(key))
  }

  fn set_item(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    let mut items = self.read_items()?;
    if let Some(quota) = self.quota {
      let needed =
        projected_bytes(&items, key, value);
      if needed > quota {
        return Err(
          StorageError::QuotaExceeded {
            needed,
            quota
          }
        );
      }
    }

    items.insert(
      key.to_string(),
      value.to_string()
    );
    self.write_items(&items)
  }

  fn remove_item(
    &mut self,
    key: &str
  ) -> Result<(), StorageError> {
    let mut items = self.read_items()?;
    if items.remove(key).is_some() {
      self.write_items(&items)?;
    }
    Ok(())
  }
}
