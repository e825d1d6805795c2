use std::fmt;

use chrono::{
  DateTime,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};
use uuid::Uuid;

const SUFFIX_LEN: usize = 6;

/// Identifier tagged onto every task
/// record and every rendered row.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
  /// Millisecond timestamp in base 36,
  /// a dash, then six random base-36
  /// characters.
  pub fn generate(
    now: DateTime<Utc>
  ) -> Self {
    let millis = u128::try_from(
      now.timestamp_millis()
    )
    .unwrap_or_default();
    let random =
      to_base36(Uuid::new_v4().as_u128());
    let suffix = &random
      [random.len().saturating_sub(
        SUFFIX_LEN
      )..];

    Self(format!(
      "{}-{suffix}",
      to_base36(millis)
    ))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<String> for TaskId {
  fn from(value: String) -> Self {
    Self(value)
  }
}

impl From<&str> for TaskId {
  fn from(value: &str) -> Self {
    Self(value.to_string())
  }
}

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct TaskRecord {
  pub id:   TaskId,
  pub text: String,
  #[serde(default)]
  pub done: bool
}

impl TaskRecord {
  /// `text` is expected to be already
  /// normalized.
  pub fn new(
    text: String,
    now: DateTime<Utc>
  ) -> Self {
    Self {
      id: TaskId::generate(now),
      text,
      done: false
    }
  }
}

/// Trims surrounding whitespace; `None`
/// when nothing is left.
pub fn normalize_text(
  raw: &str
) -> Option<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

fn to_base36(mut value: u128) -> String {
  const DIGITS: &[u8; 36] =
    b"0123456789abcdefghijklmnopqrstuvwxyz";

  if value == 0 {
    return "0".to_string();
  }

  let mut out = Vec::new();
  while value > 0 {
    out.push(
      DIGITS[(value % 36) as usize]
    );
    value /= 36;
  }
  out.reverse();
  String::from_utf8_lossy(&out)
    .into_owned()
}
