use chrono::{
  DateTime,
  Utc
};
use tracing::{
  debug,
  instrument,
  warn
};

use crate::filter::Filter;
use crate::host::Host;
use crate::render::View;
use crate::storage::KeyValueStore;
use crate::store::{
  AddOutcome,
  TaskError,
  TaskStore
};
use crate::task::TaskId;
use crate::theme::Theme;

/// A user gesture with its target
/// already resolved to a record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
  Submit {
    input: String
  },
  DeleteClicked(TaskId),
  EditClicked(TaskId),
  DoneChanged {
    id:      TaskId,
    checked: bool
  },
  FilterChanged(Filter),
  ThemeToggled
}

/// A node in whatever tree the UI toolkit
/// renders rows into.
pub trait RowNode: Sized {
  /// The tagged id if this node is a
  /// row.
  fn row_id(&self) -> Option<TaskId>;

  fn parent(&self) -> Option<Self>;
}

/// Walks from `origin` through its
/// ancestors to the nearest row and
/// returns that row's id.
pub fn resolve_row_id<N: RowNode>(
  origin: N
) -> Option<TaskId> {
  let mut node = Some(origin);
  while let Some(current) = node {
    if let Some(id) = current.row_id() {
      return Some(id);
    }
    node = current.parent();
  }
  None
}

/// Runs gestures against a task store,
/// one at a time, each to completion.
///
/// The filter and theme on screen live
/// here, so a preference that could not
/// be persisted still sticks for the
/// session.
#[derive(Debug)]
pub struct App<S> {
  store:  TaskStore<S>,
  filter: Filter,
  theme:  Theme
}

impl<S: KeyValueStore> App<S> {
  pub fn new(backend: S) -> Self {
    let store = TaskStore::new(backend);
    let filter = store.filter();
    let theme = store.theme();
    Self {
      store,
      filter,
      theme
    }
  }

  pub fn store(&self) -> &TaskStore<S> {
    &self.store
  }

  pub fn theme(&self) -> Theme {
    self.theme
  }

  /// Picks up the persisted preferences,
  /// applies the theme and produces the
  /// first view.
  #[instrument(skip_all)]
  pub fn boot(
    &mut self,
    host: &mut impl Host
  ) -> View {
    self.filter = self.store.filter();
    self.theme = self.store.theme();
    host.apply_theme(self.theme);
    self.render()
  }

  pub fn render(&self) -> View {
    self.store.render(self.filter)
  }

  #[instrument(skip(self, host, now))]
  pub fn handle(
    &mut self,
    gesture: Gesture,
    host: &mut impl Host,
    now: DateTime<Utc>
  ) -> View {
    let result = match gesture {
      | Gesture::Submit {
        input
      } => {
        match self.store.add_task(&input, now)
        {
          | Ok(AddOutcome::Added(_)) => {
            host.reset_compose();
            Ok(())
          }
          | Ok(AddOutcome::Ignored) => Ok(()),
          | Err(err) => Err(err)
        }
      }
      | Gesture::DeleteClicked(id) => {
        self
          .store
          .delete_task(&id, host)
          .map(|_| ())
      }
      | Gesture::EditClicked(id) => {
        self
          .store
          .edit_task(&id, host)
          .map(|_| ())
      }
      | Gesture::DoneChanged {
        id,
        checked
      } => {
        self
          .store
          .toggle_done(&id, checked)
          .map(|_| ())
      }
      | Gesture::FilterChanged(filter) => {
        self.filter = filter;
        self.store.set_filter(filter)
      }
      | Gesture::ThemeToggled => {
        self.theme = self.theme.toggled();
        host.apply_theme(self.theme);
        self.store.set_theme(self.theme)
      }
    };

    if let Err(err) = result {
      report(&err, host);
    }
    self.render()
  }
}

fn report(
  err: &TaskError,
  host: &mut impl Host
) {
  match err {
    | TaskError::Storage(_) => {
      warn!(error = %err, "gesture rejected")
    }
    | _ => {
      debug!(error = %err, "gesture rejected")
    }
  }
  host.notify(err.user_message());
}
