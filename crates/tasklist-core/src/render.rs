use std::fmt;

use crate::filter::Filter;
use crate::task::{
  TaskId,
  TaskRecord
};

pub const CHECK_LABEL: &str =
  "Marcar como completada";
pub const EDIT_LABEL: &str =
  "Editar tarea";
pub const DELETE_LABEL: &str =
  "Eliminar tarea";

/// Aggregates over the unfiltered
/// collection.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub struct Counts {
  pub total:   usize,
  pub pending: usize,
  pub done:    usize
}

impl Counts {
  pub fn of(tasks: &[TaskRecord]) -> Self {
    let done = tasks
      .iter()
      .filter(|task| task.done)
      .count();
    Self {
      total: tasks.len(),
      pending: tasks.len() - done,
      done
    }
  }
}

impl fmt::Display for Counts {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "Total: {} • Pendientes: {} • \
       Hechas: {}",
      self.total, self.pending, self.done
    )
  }
}

/// One visible row. `id` is the tag the
/// row's affordances resolve back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
  pub id:   TaskId,
  pub text: String,
  pub done: bool
}

impl Row {
  fn from_record(task: &TaskRecord) -> Self {
    Self {
      id:   task.id.clone(),
      text: task.text.clone(),
      done: task.done
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
  pub filter: Filter,
  pub rows:   Vec<Row>,
  pub counts: Counts
}

impl View {
  pub fn project(
    tasks: &[TaskRecord],
    filter: Filter
  ) -> Self {
    let rows = tasks
      .iter()
      .filter(|task| filter.matches(task))
      .map(Row::from_record)
      .collect();

    Self {
      filter,
      rows,
      counts: Counts::of(tasks)
    }
  }

  pub fn row(
    &self,
    id: &TaskId
  ) -> Option<&Row> {
    self.rows.iter().find(|row| &row.id == id)
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}
