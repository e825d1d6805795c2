use std::collections::{
  BTreeMap,
  BTreeSet
};

use thiserror::Error;
use tracing::{
  debug,
  warn
};

use crate::filter::Filter;
use crate::task::{
  TaskId,
  TaskRecord
};
use crate::theme::Theme;

pub const TASKS_KEY: &str = "tasks";
pub const THEME_KEY: &str = "theme";
pub const FILTER_KEY: &str =
  "taskFilter";

/// Same order of magnitude browsers give
/// a single origin.
pub const DEFAULT_QUOTA_BYTES: usize =
  5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
  #[error(
    "storage quota exceeded: {needed} \
     bytes needed, {quota} allowed"
  )]
  QuotaExceeded {
    needed: usize,
    quota:  usize
  },

  #[error("storage unavailable: {0}")]
  Unavailable(String),

  #[error(
    "failed to serialize task \
     collection: {0}"
  )]
  Serialize(#[from] serde_json::Error),

  #[error(
    "refusing to persist duplicate \
     task id {0}"
  )]
  DuplicateId(TaskId),

  #[error("storage I/O failed: {0}")]
  Io(#[from] std::io::Error)
}

impl StorageError {
  pub fn user_message(
    &self
  ) -> &'static str {
    match self {
      | Self::DuplicateId(_) => {
        "No se pudo guardar la tarea: \
         hay tareas con el mismo \
         identificador."
      }
      | _ => {
        "No se pudo guardar la tarea. \
         Libera espacio o desactiva \
         modos privados."
      }
    }
  }
}

/// String-keyed, string-valued
/// persistent store scoped to one user
/// context.
pub trait KeyValueStore {
  fn get_item(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>;

  fn set_item(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError>;

  fn remove_item(
    &mut self,
    key: &str
  ) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  items:    BTreeMap<String, String>,
  quota:    Option<usize>,
  disabled: bool
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_quota(
    quota: usize
  ) -> Self {
    Self {
      quota: Some(quota),
      ..Self::default()
    }
  }

  /// Every access fails, like a browser
  /// with storage switched off.
  pub fn disabled() -> Self {
    Self {
      disabled: true,
      ..Self::default()
    }
  }

  pub fn used_bytes(&self) -> usize {
    used_bytes(&self.items)
  }

  fn check_enabled(
    &self
  ) -> Result<(), StorageError> {
    if self.disabled {
      return Err(
        StorageError::Unavailable(
          "storage is disabled"
            .to_string()
        )
      );
    }
    Ok(())
  }
}

impl KeyValueStore for MemoryStore {
  fn get_item(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    self.check_enabled()?;
    Ok(self.items.get(key).cloned())
  }

  fn set_item(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    self.check_enabled()?;
    if let Some(quota) = self.quota {
      let needed = projected_bytes(
        &self.items,
        key,
        value
      );
      if needed > quota {
        return Err(
          StorageError::QuotaExceeded {
            needed,
            quota
          }
        );
      }
    }
    self
      .items
      .insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove_item(
    &mut self,
    key: &str
  ) -> Result<(), StorageError> {
    self.check_enabled()?;
    self.items.remove(key);
    Ok(())
  }
}

/// Bytes held by `items` counting keys
/// and values.
pub fn used_bytes(
  items: &BTreeMap<String, String>
) -> usize {
  items
    .iter()
    .map(|(k, v)| k.len() + v.len())
    .sum()
}

/// Bytes `items` would hold after
/// writing `value` under `key`.
pub fn projected_bytes(
  items: &BTreeMap<String, String>,
  key: &str,
  value: &str
) -> usize {
  let current = used_bytes(items);
  let replaced = items
    .get(key)
    .map(|old| key.len() + old.len())
    .unwrap_or(0);
  current - replaced + key.len()
    + value.len()
}

/// Typed access to the task collection
/// and preferences kept in a
/// [`KeyValueStore`].
#[derive(Debug)]
pub struct Storage<S> {
  backend: S
}

impl<S: KeyValueStore> Storage<S> {
  pub fn new(backend: S) -> Self {
    Self {
      backend
    }
  }

  pub fn backend(&self) -> &S {
    &self.backend
  }

  pub fn backend_mut(
    &mut self
  ) -> &mut S {
    &mut self.backend
  }

  /// Absent, `null`, malformed or
  /// unreadable state all read as an
  /// empty collection. Repeated ids are
  /// renamed so every record stays
  /// addressable.
  #[tracing::instrument(skip(self))]
  pub fn load_tasks(
    &self
  ) -> Vec<TaskRecord> {
    let raw = match self
      .backend
      .get_item(TASKS_KEY)
    {
      | Ok(Some(raw)) => raw,
      | Ok(None) => return Vec::new(),
      | Err(error) => {
        warn!(
          %error,
          "failed reading tasks; \
           treating as empty"
        );
        return Vec::new();
      }
    };

    match serde_json::from_str::<
      Option<Vec<TaskRecord>>
    >(&raw)
    {
      | Ok(tasks) => {
        let mut tasks =
          tasks.unwrap_or_default();
        dedupe_ids(&mut tasks);
        debug!(
          count = tasks.len(),
          "loaded tasks"
        );
        tasks
      }
      | Err(error) => {
        warn!(
          %error,
          "persisted tasks are \
           malformed; treating as empty"
        );
        Vec::new()
      }
    }
  }

  /// Writes the whole collection. On
  /// error nothing was written.
  #[tracing::instrument(skip(self, tasks), fields(count = tasks.len()))]
  pub fn save_tasks(
    &mut self,
    tasks: &[TaskRecord]
  ) -> Result<(), StorageError> {
    let mut seen = BTreeSet::new();
    for task in tasks {
      if !seen.insert(&task.id) {
        return Err(
          StorageError::DuplicateId(
            task.id.clone()
          )
        );
      }
    }

    let json =
      serde_json::to_string(tasks)?;
    self
      .backend
      .set_item(TASKS_KEY, &json)?;
    debug!("saved tasks");
    Ok(())
  }

  pub fn load_filter(&self) -> Filter {
    Filter::from_storage(
      self
        .read_preference(FILTER_KEY)
        .as_deref()
    )
  }

  pub fn save_filter(
    &mut self,
    filter: Filter
  ) -> Result<(), StorageError> {
    self.backend.set_item(
      FILTER_KEY,
      filter.storage_value()
    )
  }

  pub fn load_theme(&self) -> Theme {
    Theme::from_storage(
      self
        .read_preference(THEME_KEY)
        .as_deref()
    )
  }

  pub fn save_theme(
    &mut self,
    theme: Theme
  ) -> Result<(), StorageError> {
    self.backend.set_item(
      THEME_KEY,
      theme.storage_value()
    )
  }

  fn read_preference(
    &self,
    key: &str
  ) -> Option<String> {
    match self.backend.get_item(key) {
      | Ok(value) => value,
      | Err(error) => {
        warn!(
          key,
          %error,
          "failed reading preference; \
           using default"
        );
        None
      }
    }
  }
}

/// Later holders of an already seen id
/// get `<id>-<n>`, the first free `n`.
fn dedupe_ids(tasks: &mut [TaskRecord]) {
  let mut taken: BTreeSet<String> = tasks
    .iter()
    .map(|t| t.id.as_str().to_string())
    .collect();
  let mut seen = BTreeSet::new();

  for task in tasks.iter_mut() {
    let id = task.id.as_str().to_string();
    if seen.insert(id.clone()) {
      continue;
    }

    let fresh = (2..)
      .map(|n| format!("{id}-{n}"))
      .find(|candidate| {
        !taken.contains(candidate)
      })
      .unwrap_or_default();
    warn!(
      %id,
      renamed = %fresh,
      "persisted task id repeats; \
       renaming"
    );
    taken.insert(fresh.clone());
    seen.insert(fresh.clone());
    task.id = TaskId::from(fresh);
  }
}
