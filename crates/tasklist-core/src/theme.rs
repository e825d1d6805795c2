#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum Theme {
  #[default]
  Light,
  Dark
}

impl Theme {
  pub const DARK_CLASS: &'static str =
    "dark-theme";

  pub fn storage_value(
    self
  ) -> &'static str {
    match self {
      | Self::Light => "light",
      | Self::Dark => "dark"
    }
  }

  /// Only an explicit `"dark"` turns the
  /// dark theme on.
  pub fn from_storage(
    raw: Option<&str>
  ) -> Self {
    match raw {
      | Some("dark") => Self::Dark,
      | _ => Self::Light
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      | Self::Light => Self::Dark,
      | Self::Dark => Self::Light
    }
  }

  /// Class carried by the document root
  /// while this theme is active.
  pub fn root_class(
    self
  ) -> Option<&'static str> {
    match self {
      | Self::Light => None,
      | Self::Dark => {
        Some(Self::DARK_CLASS)
      }
    }
  }
}
