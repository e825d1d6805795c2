use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::task::TaskRecord;

/// View predicate applied at render
/// time.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum Filter {
  #[default]
  All,
  Active,
  Done
}

#[derive(Debug, Error)]
#[error(
  "unknown filter `{0}` (expected \
   all, active or done)"
)]
pub struct UnknownFilter(pub String);

impl Filter {
  pub const ALL: [Filter; 3] = [
    Filter::All,
    Filter::Active,
    Filter::Done
  ];

  pub fn storage_value(
    self
  ) -> &'static str {
    match self {
      | Self::All => "all",
      | Self::Active => "active",
      | Self::Done => "done"
    }
  }

  /// Lenient read of a persisted value:
  /// anything unrecognised shows the
  /// whole list.
  pub fn from_storage(
    raw: Option<&str>
  ) -> Self {
    raw
      .and_then(|value| {
        value.parse().ok()
      })
      .unwrap_or_default()
  }

  pub fn matches(
    self,
    task: &TaskRecord
  ) -> bool {
    match self {
      | Self::All => true,
      | Self::Active => !task.done,
      | Self::Done => task.done
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::All => "Todas",
      | Self::Active => "Pendientes",
      | Self::Done => "Hechas"
    }
  }
}

impl FromStr for Filter {
  type Err = UnknownFilter;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s.trim() {
      | "all" => Ok(Self::All),
      | "active" => Ok(Self::Active),
      | "done" => Ok(Self::Done),
      | other => {
        Err(UnknownFilter(
          other.to_string()
        ))
      }
    }
  }
}

impl fmt::Display for Filter {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.storage_value())
  }
}

#[cfg(test)]
mod tests {
  use super::Filter;
  use crate::task::{
    TaskId,
    TaskRecord
  };

  fn record(done: bool) -> TaskRecord {
    TaskRecord {
      id: TaskId::from("t-1"),
      text: "x".to_string(),
      done
    }
  }

  #[test]
  fn predicates_follow_done_flag() {
    assert!(Filter::All.matches(&record(true)));
    assert!(Filter::All.matches(&record(false)));
    assert!(
      Filter::Active.matches(&record(false))
    );
    assert!(
      !Filter::Active.matches(&record(true))
    );
    assert!(Filter::Done.matches(&record(true)));
    assert!(
      !Filter::Done.matches(&record(false))
    );
  }

  #[test]
  fn persisted_values_fall_back_to_all() {
    assert_eq!(
      Filter::from_storage(Some("done")),
      Filter::Done
    );
    assert_eq!(
      Filter::from_storage(Some("weird")),
      Filter::All
    );
    assert_eq!(
      Filter::from_storage(None),
      Filter::All
    );
  }

  #[test]
  fn strict_parse_rejects_unknown() {
    assert!("pending".parse::<Filter>().is_err());
    for filter in Filter::ALL {
      assert_eq!(
        filter
          .storage_value()
          .parse::<Filter>()
          .unwrap(),
        filter
      );
    }
  }
}
