use chrono::{
  DateTime,
  Utc
};
use thiserror::Error;
use tracing::{
  debug,
  info,
  instrument
};

use crate::filter::Filter;
use crate::host::{
  Confirmer,
  Prompter
};
use crate::render::View;
use crate::storage::{
  KeyValueStore,
  Storage,
  StorageError
};
use crate::task::{
  TaskId,
  TaskRecord,
  normalize_text
};
use crate::theme::Theme;

pub const EDIT_PROMPT: &str =
  "Edita la tarea:";
pub const DELETE_CONFIRM: &str =
  "¿Seguro que quieres borrar esta \
   tarea?";

/// A rejected operation. Nothing was
/// persisted when one of these comes
/// back.
#[derive(Debug, Error)]
pub enum TaskError {
  #[error("task `{text}` already exists")]
  Duplicate {
    text: String
  },

  #[error(
    "another task already reads `{text}`"
  )]
  DuplicateOther {
    text: String
  },

  #[error("task text cannot be empty")]
  EmptyText,

  #[error(transparent)]
  Storage(#[from] StorageError)
}

impl TaskError {
  /// Text for the blocking notification
  /// shown to the user.
  pub fn user_message(
    &self
  ) -> &'static str {
    match self {
      | Self::Duplicate {
        ..
      } => "Esa tarea ya existe.",
      | Self::DuplicateOther {
        ..
      } => {
        "Ya existe otra tarea con ese \
         texto."
      }
      | Self::EmptyText => {
        "El texto no puede estar vacío."
      }
      | Self::Storage(err) => {
        err.user_message()
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
  /// Blank input; nothing happened.
  Ignored,
  Added(TaskRecord)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
  Declined,
  Deleted(TaskRecord),
  Missing
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
  Missing,
  Cancelled,
  Renamed(TaskRecord)
}

/// Task operations over a key-value
/// store. Each one reloads the whole
/// collection, applies a single change
/// and writes the whole collection back.
#[derive(Debug)]
pub struct TaskStore<S> {
  storage: Storage<S>
}

impl<S: KeyValueStore> TaskStore<S> {
  pub fn new(backend: S) -> Self {
    Self {
      storage: Storage::new(backend)
    }
  }

  pub fn storage(&self) -> &Storage<S> {
    &self.storage
  }

  pub fn tasks(&self) -> Vec<TaskRecord> {
    self.storage.load_tasks()
  }

  #[instrument(skip(self, raw, now))]
  pub fn add_task(
    &mut self,
    raw: &str,
    now: DateTime<Utc>
  ) -> Result<AddOutcome, TaskError> {
    let Some(text) = normalize_text(raw)
    else {
      debug!("blank input ignored");
      return Ok(AddOutcome::Ignored);
    };

    let mut tasks =
      self.storage.load_tasks();
    if tasks.iter().any(|t| t.text == text) {
      return Err(TaskError::Duplicate {
        text
      });
    }

    let task = TaskRecord::new(text, now);
    tasks.push(task.clone());
    self.storage.save_tasks(&tasks)?;

    info!(id = %task.id, "task added");
    Ok(AddOutcome::Added(task))
  }

  /// Nothing is read or written until
  /// the user has confirmed.
  #[instrument(skip(self, confirmer), fields(id = %id))]
  pub fn delete_task(
    &mut self,
    id: &TaskId,
    confirmer: &mut impl Confirmer
  ) -> Result<DeleteOutcome, TaskError> {
    if !confirmer.confirm(DELETE_CONFIRM) {
      debug!("delete declined");
      return Ok(DeleteOutcome::Declined);
    }

    let mut tasks =
      self.storage.load_tasks();
    let removed = tasks
      .iter()
      .position(|t| &t.id == id)
      .map(|idx| tasks.remove(idx));
    self.storage.save_tasks(&tasks)?;

    match removed {
      | Some(task) => {
        info!("task deleted");
        Ok(DeleteOutcome::Deleted(task))
      }
      | None => {
        debug!("delete target vanished");
        Ok(DeleteOutcome::Missing)
      }
    }
  }

  /// Returns `false` when no record has
  /// `id`.
  #[instrument(skip(self), fields(id = %id))]
  pub fn toggle_done(
    &mut self,
    id: &TaskId,
    done: bool
  ) -> Result<bool, TaskError> {
    let mut tasks =
      self.storage.load_tasks();
    let Some(task) =
      tasks.iter_mut().find(|t| &t.id == id)
    else {
      debug!("toggle target vanished");
      return Ok(false);
    };

    task.done = done;
    self.storage.save_tasks(&tasks)?;
    info!(done, "task toggled");
    Ok(true)
  }

  #[instrument(skip(self, prompter), fields(id = %id))]
  pub fn edit_task(
    &mut self,
    id: &TaskId,
    prompter: &mut impl Prompter
  ) -> Result<EditOutcome, TaskError> {
    let mut tasks =
      self.storage.load_tasks();
    let Some(idx) =
      tasks.iter().position(|t| &t.id == id)
    else {
      debug!("edit target vanished");
      return Ok(EditOutcome::Missing);
    };

    let Some(raw) = prompter
      .prompt_for_text(
        EDIT_PROMPT,
        &tasks[idx].text
      )
    else {
      debug!("edit cancelled");
      return Ok(EditOutcome::Cancelled);
    };

    let text = normalize_text(&raw)
      .ok_or(TaskError::EmptyText)?;
    let clash = tasks
      .iter()
      .enumerate()
      .any(|(i, t)| i != idx && t.text == text);
    if clash {
      return Err(
        TaskError::DuplicateOther {
          text
        }
      );
    }

    tasks[idx].text = text;
    self.storage.save_tasks(&tasks)?;
    info!("task renamed");
    Ok(EditOutcome::Renamed(
      tasks[idx].clone()
    ))
  }

  /// Fresh projection of the persisted
  /// collection under `filter`.
  pub fn render(
    &self,
    filter: Filter
  ) -> View {
    View::project(
      &self.storage.load_tasks(),
      filter
    )
  }

  /// The persisted filter.
  pub fn filter(&self) -> Filter {
    self.storage.load_filter()
  }

  pub fn set_filter(
    &mut self,
    filter: Filter
  ) -> Result<(), TaskError> {
    self.storage.save_filter(filter)?;
    Ok(())
  }

  /// The persisted theme.
  pub fn theme(&self) -> Theme {
    self.storage.load_theme()
  }

  pub fn set_theme(
    &mut self,
    theme: Theme
  ) -> Result<(), TaskError> {
    self.storage.save_theme(theme)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    TimeZone,
    Utc
  };

  use super::*;
  use crate::host::ScriptedHost;
  use crate::storage::MemoryStore;

  fn now() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(2026, 4, 2, 8, 0, 0)
      .unwrap()
  }

  fn added(
    store: &mut TaskStore<MemoryStore>,
    text: &str
  ) -> TaskRecord {
    match store.add_task(text, now()).unwrap()
    {
      | AddOutcome::Added(task) => task,
      | other => {
        panic!("expected add, got {other:?}")
      }
    }
  }

  #[test]
  fn add_trims_and_appends() {
    let mut store =
      TaskStore::new(MemoryStore::new());
    let first = added(&mut store, "  one ");
    let second = added(&mut store, "two");

    assert_eq!(first.text, "one");
    assert!(!first.done);
    assert_ne!(first.id, second.id);
    let texts: Vec<String> = store
      .tasks()
      .into_iter()
      .map(|t| t.text)
      .collect();
    assert_eq!(texts, ["one", "two"]);
  }

  #[test]
  fn blank_add_is_ignored() {
    let mut store =
      TaskStore::new(MemoryStore::new());
    assert_eq!(
      store.add_task(" \t ", now()).unwrap(),
      AddOutcome::Ignored
    );
    assert!(
      store
        .storage()
        .backend()
        .get_item(crate::storage::TASKS_KEY)
        .unwrap()
        .is_none()
    );
  }

  #[test]
  fn duplicate_compare_is_exact_after_trim()
   {
    let mut store =
      TaskStore::new(MemoryStore::new());
    added(&mut store, "Buy milk");

    let err = store
      .add_task(" Buy milk ", now())
      .unwrap_err();
    assert!(matches!(
      err,
      TaskError::Duplicate { .. }
    ));
    assert_eq!(
      err.user_message(),
      "Esa tarea ya existe."
    );

    added(&mut store, "buy milk");
    assert_eq!(store.tasks().len(), 2);
  }

  #[test]
  fn toggle_unknown_id_writes_nothing() {
    let mut store =
      TaskStore::new(MemoryStore::new());
    let task = added(&mut store, "a");
    assert!(
      !store
        .toggle_done(&TaskId::from("nope"), true)
        .unwrap()
    );
    assert!(
      store.toggle_done(&task.id, true).unwrap()
    );
    assert!(store.tasks()[0].done);
    assert!(
      store.toggle_done(&task.id, false).unwrap()
    );
    assert!(!store.tasks()[0].done);
  }

  #[test]
  fn delete_requires_confirmation() {
    let mut store =
      TaskStore::new(MemoryStore::new());
    let task = added(&mut store, "a");
    let mut host =
      ScriptedHost::new().answer_confirm(false);

    assert_eq!(
      store
        .delete_task(&task.id, &mut host)
        .unwrap(),
      DeleteOutcome::Declined
    );
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(
      host.confirmations,
      [DELETE_CONFIRM]
    );

    let mut host =
      ScriptedHost::new().answer_confirm(true);
    assert_eq!(
      store
        .delete_task(&task.id, &mut host)
        .unwrap(),
      DeleteOutcome::Deleted(task.clone())
    );
    assert!(store.tasks().is_empty());

    let mut host =
      ScriptedHost::new().answer_confirm(true);
    assert_eq!(
      store
        .delete_task(&task.id, &mut host)
        .unwrap(),
      DeleteOutcome::Missing
    );
  }

  #[test]
  fn edit_prompt_is_prefilled_and_cancel_is_noop()
   {
    let mut store =
      TaskStore::new(MemoryStore::new());
    let task = added(&mut store, "draft");
    let mut host =
      ScriptedHost::new().answer_prompt(None);

    assert_eq!(
      store.edit_task(&task.id, &mut host).unwrap(),
      EditOutcome::Cancelled
    );
    assert_eq!(
      host.prompts,
      [(
        EDIT_PROMPT.to_string(),
        "draft".to_string()
      )]
    );
    assert_eq!(store.tasks()[0].text, "draft");
  }

  #[test]
  fn edit_rejects_blank_and_clashing_text() {
    let mut store =
      TaskStore::new(MemoryStore::new());
    let a = added(&mut store, "a");
    added(&mut store, "b");

    let mut host = ScriptedHost::new()
      .answer_prompt(Some("   "))
      .answer_prompt(Some(" b "));
    assert!(matches!(
      store.edit_task(&a.id, &mut host),
      Err(TaskError::EmptyText)
    ));
    let err = store
      .edit_task(&a.id, &mut host)
      .unwrap_err();
    assert_eq!(
      err.user_message(),
      "Ya existe otra tarea con ese texto."
    );
    assert_eq!(store.tasks()[0].text, "a");
  }

  #[test]
  fn edit_to_same_text_is_allowed() {
    let mut store =
      TaskStore::new(MemoryStore::new());
    let a = added(&mut store, "a");
    let mut host = ScriptedHost::new()
      .answer_prompt(Some(" a "))
      .answer_prompt(Some("renamed"));

    assert!(matches!(
      store.edit_task(&a.id, &mut host).unwrap(),
      EditOutcome::Renamed(_)
    ));
    let renamed =
      store.edit_task(&a.id, &mut host).unwrap();
    assert_eq!(
      renamed,
      EditOutcome::Renamed(TaskRecord {
        id:   a.id.clone(),
        text: "renamed".to_string(),
        done: false
      })
    );
  }

  #[test]
  fn edit_of_vanished_task_never_prompts() {
    let mut store =
      TaskStore::new(MemoryStore::new());
    let mut host =
      ScriptedHost::new().answer_prompt(Some("x"));
    assert_eq!(
      store
        .edit_task(&TaskId::from("gone"), &mut host)
        .unwrap(),
      EditOutcome::Missing
    );
    assert!(host.prompts.is_empty());
  }

  #[test]
  fn failed_write_keeps_previous_collection()
   {
    let mut store = TaskStore::new(
      MemoryStore::with_quota(80)
    );
    added(&mut store, "short");

    let err = store
      .add_task(&"x".repeat(200), now())
      .unwrap_err();
    assert!(matches!(
      err,
      TaskError::Storage(
        StorageError::QuotaExceeded { .. }
      )
    ));
    assert_eq!(
      err.user_message(),
      "No se pudo guardar la tarea. Libera \
       espacio o desactiva modos privados."
    );
    assert_eq!(store.tasks().len(), 1);
  }

  #[test]
  fn preferences_round_trip() {
    let mut store =
      TaskStore::new(MemoryStore::new());
    assert_eq!(store.theme(), Theme::Light);
    assert_eq!(store.filter(), Filter::All);

    store.set_theme(Theme::Dark).unwrap();
    store.set_filter(Filter::Done).unwrap();
    assert_eq!(store.theme(), Theme::Dark);
    assert_eq!(store.filter(), Filter::Done);
  }

  #[test]
  fn repeated_persisted_ids_stay_writable() {
    let mut store =
      TaskStore::new(MemoryStore::new());
    store
      .storage
      .backend_mut()
      .set_item(
        crate::storage::TASKS_KEY,
        r#"[{"id":"x","text":"a","done":false},
            {"id":"x","text":"b","done":false}]"#
      )
      .unwrap();

    assert!(
      store
        .toggle_done(&TaskId::from("x"), true)
        .unwrap()
    );
    added(&mut store, "c");

    let tasks = store.tasks();
    assert_eq!(tasks.len(), 3);
    assert!(tasks[0].done);
    assert!(!tasks[1].done);
    assert_ne!(tasks[0].id, tasks[1].id);
  }
}
