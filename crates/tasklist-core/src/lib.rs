//! Task list domain: records persisted in
//! a key-value store, the operations that
//! mutate them, and the view projected
//! from them.

pub mod bindings;
pub mod filter;
pub mod host;
pub mod render;
pub mod storage;
pub mod store;
pub mod task;
pub mod theme;

pub use bindings::{
  App,
  Gesture,
  RowNode,
  resolve_row_id
};
pub use filter::Filter;
pub use host::{
  Confirmer,
  Host,
  Notifier,
  Prompter,
  ScriptedHost
};
pub use render::{
  Counts,
  Row,
  View
};
pub use storage::{
  KeyValueStore,
  MemoryStore,
  Storage,
  StorageError
};
pub use store::{
  AddOutcome,
  DeleteOutcome,
  EditOutcome,
  TaskError,
  TaskStore
};
pub use task::{
  TaskId,
  TaskRecord
};
pub use theme::Theme;
