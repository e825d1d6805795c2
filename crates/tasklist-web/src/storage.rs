use tasklist_core::{
  KeyValueStore,
  StorageError
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::DomException;

/// `window.localStorage` behind the
/// key-value contract. A browser without
/// storage reads as empty and refuses
/// every write.
#[derive(Debug, Clone)]
pub struct LocalStore {
  storage: Option<web_sys::Storage>
}

impl LocalStore {
  pub fn open() -> Self {
    let storage = web_sys::window()
      .and_then(|window| {
        window
          .local_storage()
          .ok()
          .flatten()
      });

    if storage.is_none() {
      tracing::warn!(
        "local storage unavailable; \
         changes will not persist"
      );
    }

    Self {
      storage
    }
  }

  fn storage(
    &self
  ) -> Result<&web_sys::Storage, StorageError>
  {
    self.storage.as_ref().ok_or_else(|| {
      StorageError::Unavailable(
        "local storage is disabled"
          .to_string()
      )
    })
  }
}

impl KeyValueStore for LocalStore {
  fn get_item(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    self
      .storage()?
      .get_item(key)
      .map_err(js_error)
  }

  fn set_item(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    let storage = self.storage()?;
    storage.set_item(key, value).map_err(
      |err| {
        if is_quota_error(&err) {
          StorageError::QuotaExceeded {
            needed: key.len() + value.len(),
            quota:  held_bytes(storage)
          }
        } else {
          js_error(err)
        }
      }
    )
  }

  fn remove_item(
    &mut self,
    key: &str
  ) -> Result<(), StorageError> {
    self
      .storage()?
      .remove_item(key)
      .map_err(js_error)
  }
}

fn js_error(err: JsValue) -> StorageError {
  StorageError::Unavailable(format!("{err:?}"))
}

fn is_quota_error(err: &JsValue) -> bool {
  err
    .dyn_ref::<DomException>()
    .is_some_and(|e| {
      is_quota_error_name(&e.name())
    })
}

/// Firefox still reports its legacy
/// name.
fn is_quota_error_name(name: &str) -> bool {
  matches!(
    name,
    "QuotaExceededError"
      | "NS_ERROR_DOM_QUOTA_REACHED"
  )
}

/// The browser hides its limit; what the
/// origin already holds stands in for
/// it.
fn held_bytes(
  storage: &web_sys::Storage
) -> usize {
  let len = storage.length().unwrap_or(0);
  (0..len)
    .filter_map(|idx| {
      storage.key(idx).ok().flatten()
    })
    .map(|key| {
      let value = storage
        .get_item(&key)
        .ok()
        .flatten()
        .unwrap_or_default();
      key.len() + value.len()
    })
    .sum()
}
