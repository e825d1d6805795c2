use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tasklist_core::storage::DEFAULT_QUOTA_BYTES;
use tracing::{
  debug,
  info,
  trace,
  warn
};

pub const RC_ENV: &str = "TASKLISTRC";

#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "data.location".to_string(),
      "~/.tasklist".to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    map.insert(
      "storage.quota".to_string(),
      DEFAULT_QUOTA_BYTES.to_string()
    );

    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc = resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading rc file");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no rc file found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  /// Fails on a value that is neither
  /// truthy nor falsy.
  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    let Some(raw) = self.map.get(key) else {
      return Ok(None);
    };
    parse_bool(raw).map(Some).ok_or_else(|| {
      anyhow!("invalid {key} setting: {raw}")
    })
  }

  /// `0` or `none` disables the limit.
  pub fn storage_quota(
    &self
  ) -> anyhow::Result<Option<usize>> {
    let Some(raw) = self.map.get("storage.quota")
    else {
      return Ok(Some(DEFAULT_QUOTA_BYTES));
    };

    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
      return Ok(None);
    }
    let bytes: usize =
      raw.parse().with_context(|| {
        format!(
          "invalid storage.quota: {raw}"
        )
      })?;
    Ok((bytes > 0).then_some(bytes))
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self.load_text(&text, &path)?;
    self.loaded_files.push(path);
    Ok(())
  }

  fn load_text(
    &mut self,
    text: &str,
    origin: &Path
  ) -> anyhow::Result<()> {
    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            origin.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else if let Some(cfg_value) =
    cfg.get("data.location")
  {
    expand_tilde(Path::new(&cfg_value))
  } else {
    default_data_dir()?
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) = std::env::var(RC_ENV)
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(rc_env)));
  }

  let Some(home) = dirs::home_dir() else {
    warn!(
      "cannot determine home \
       directory; skipping rc file"
    );
    return Ok(None);
  };
  let candidate = home.join(".tasklistrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn default_data_dir()
-> anyhow::Result<PathBuf> {
  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  Ok(home.join(".tasklist"))
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> Option<bool> {
  match s.trim().to_ascii_lowercase().as_str()
  {
    | "1" | "y" | "yes" | "on" | "true" => {
      Some(true)
    }
    | "0" | "n" | "no" | "off" | "false" => {
      Some(false)
    }
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::path::Path;

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn rc_file_overrides_defaults() {
    let temp = tempdir().unwrap();
    let rc = temp.path().join("tasklistrc");
    fs::write(
      &rc,
      "# comment\n\ncolor = off  # inline\n\
       data.location=/tmp/somewhere\n"
    )
    .unwrap();

    let cfg = Config::load(Some(rc.as_path())).unwrap();
    assert_eq!(cfg.get_bool("color").unwrap(), Some(false));
    assert_eq!(
      cfg.get("data.location").as_deref(),
      Some("/tmp/somewhere")
    );
    assert_eq!(cfg.loaded_files, vec![rc]);
  }

  #[test]
  fn malformed_line_is_an_error() {
    let mut cfg = Config::default();
    let err = cfg
      .load_text("color on\n", Path::new("rc"))
      .unwrap_err();
    assert!(
      err
        .to_string()
        .contains("invalid config line rc:1")
    );
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::default();
    cfg.apply_overrides([
      ("rc.color".to_string(), "no".to_string()),
      (
        "storage.quota".to_string(),
        "none".to_string()
      ),
    ]);
    assert_eq!(cfg.get_bool("color").unwrap(), Some(false));
    assert_eq!(cfg.storage_quota().unwrap(), None);
  }

  #[test]
  fn bool_settings_reject_garbage() {
    let mut cfg = Config::default();
    assert_eq!(cfg.get_bool("color").unwrap(), Some(true));
    assert_eq!(cfg.get_bool("missing").unwrap(), None);

    cfg.apply_overrides([(
      "color".to_string(),
      "sometimes".to_string()
    )]);
    let err = cfg.get_bool("color").unwrap_err();
    assert!(
      err
        .to_string()
        .contains("invalid color setting: sometimes")
    );
  }

  #[test]
  fn quota_parsing() {
    let mut cfg = Config::default();
    assert_eq!(
      cfg.storage_quota().unwrap(),
      Some(DEFAULT_QUOTA_BYTES)
    );

    cfg.apply_overrides([(
      "storage.quota".to_string(),
      "0".to_string()
    )]);
    assert_eq!(cfg.storage_quota().unwrap(), None);

    cfg.apply_overrides([(
      "storage.quota".to_string(),
      "lots".to_string()
    )]);
    assert!(cfg.storage_quota().is_err());
  }

  #[test]
  fn data_dir_override_is_created() {
    let temp = tempdir().unwrap();
    let target = temp.path().join("nested/data");
    let dir = resolve_data_dir(
      &Config::default(),
      Some(target.as_path())
    )
    .unwrap();
    assert_eq!(dir, target);
    assert!(target.is_dir());
  }
}
