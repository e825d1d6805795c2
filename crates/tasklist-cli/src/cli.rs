use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{
  ArgAction,
  Parser,
  Subcommand,
  ValueEnum
};
use tasklist_core::{
  Filter,
  TaskId,
  View
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
  pub key:   String,
  pub value: String
}

impl std::str::FromStr for KeyVal {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let (k, v) = s
      .split_once('=')
      .ok_or_else(|| {
        anyhow!(
          "expected KEY=VALUE, got: {s}"
        )
      })?;
    Ok(Self {
      key:   k.trim().to_string(),
      value: v.trim().to_string()
    })
  }
}

#[derive(Parser, Debug, Clone)]
#[command(
  name = "tasks",
  version,
  about = "A small persistent task list",
  disable_help_subcommand = true
)]
pub struct GlobalCli {
  #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
  pub verbose: u8,

  #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
  pub quiet: u8,

  #[arg(
    long = "rc",
    value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
    action = ArgAction::Append,
    global = true
  )]
  pub rc_overrides: Vec<KeyVal>,

  #[arg(long = "config", global = true)]
  pub config: Option<PathBuf>,

  #[arg(long = "data", global = true)]
  pub data: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Option<Command>
}

/// Targets are a row number from the
/// current list, a task id, or a unique
/// id prefix.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
  /// Show the list under the saved filter
  List {
    /// Show this filter once without
    /// saving it
    #[arg(long)]
    filter: Option<Filter>
  },

  /// Add a task
  Add {
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>
  },

  /// Rename a task
  Edit {
    target: String,

    /// New text; prompts when omitted
    #[arg(long)]
    text: Option<String>
  },

  /// Mark a task as done
  Done {
    target: String
  },

  /// Mark a task as pending again
  Undone {
    target: String
  },

  /// Delete a task after confirmation
  Delete {
    target: String,

    #[arg(short = 'y', long = "yes")]
    yes: bool
  },

  /// Save the active filter
  Filter {
    value: Filter
  },

  /// Toggle or show the theme
  Theme {
    #[arg(value_enum, default_value_t = ThemeAction::Toggle)]
    action: ThemeAction
  }
}

impl Default for Command {
  fn default() -> Self {
    Self::List {
      filter: None
    }
  }
}

#[derive(
  ValueEnum,
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
)]
pub enum ThemeAction {
  Toggle,
  Show
}

pub fn init_tracing(
  verbose: u8,
  quiet: u8
) -> anyhow::Result<()> {
  let default_level = if quiet >= 2 {
    "error"
  } else if quiet == 1 {
    "warn"
  } else if verbose >= 3 {
    "trace"
  } else if verbose == 2 {
    "debug"
  } else if verbose == 1 {
    "info"
  } else {
    "warn"
  };

  let env_filter =
    EnvFilter::try_from_default_env()
      .or_else(|_| {
        EnvFilter::try_new(default_level)
      })
      .map_err(|e| {
        anyhow!(
          "invalid RUST_LOG / log filter: \
           {e}"
        )
      })?;

  let init_result =
    tracing_subscriber::fmt()
      .with_env_filter(env_filter)
      .with_writer(std::io::stderr)
      .with_target(true)
      .with_level(true)
      .with_ansi(
        std::io::stderr().is_terminal()
      )
      .try_init();

  if let Err(err) = init_result {
    debug!(error = %err, "tracing subscriber already set, continuing");
  }

  Ok(())
}

/// Resolves a command-line target against
/// the rows the user currently sees.
#[tracing::instrument(skip(view))]
pub fn resolve_target(
  view: &View,
  token: &str
) -> anyhow::Result<TaskId> {
  let token = token.trim();

  if let Ok(number) = token.parse::<usize>()
    && let Some(row) = number
      .checked_sub(1)
      .and_then(|idx| view.rows.get(idx))
  {
    debug!(number, id = %row.id, "target resolved by row number");
    return Ok(row.id.clone());
  }

  if let Some(row) = view
    .rows
    .iter()
    .find(|row| row.id.as_str() == token)
  {
    return Ok(row.id.clone());
  }

  let matches: Vec<&TaskId> = view
    .rows
    .iter()
    .map(|row| &row.id)
    .filter(|id| {
      !token.is_empty()
        && id.as_str().starts_with(token)
    })
    .collect();

  match matches.as_slice() {
    | [id] => Ok((*id).clone()),
    | [] => {
      Err(anyhow!(
        "no task matches `{token}`"
      ))
    }
    | _ => {
      Err(anyhow!(
        "`{token}` matches {} tasks; use \
         more of the id",
        matches.len()
      ))
    }
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;
  use tasklist_core::{
    Filter,
    TaskId,
    TaskRecord,
    View
  };

  use super::*;

  fn view() -> View {
    let tasks: Vec<TaskRecord> = [
      "abc-111111",
      "abd-222222",
      "xyz-333333"
    ]
    .into_iter()
    .enumerate()
    .map(|(i, id)| TaskRecord {
      id:   TaskId::from(id),
      text: format!("t{i}"),
      done: false
    })
    .collect();
    View::project(&tasks, Filter::All)
  }

  #[test]
  fn targets_by_number_id_and_prefix() {
    let view = view();
    assert_eq!(
      resolve_target(&view, "2").unwrap(),
      TaskId::from("abd-222222")
    );
    assert_eq!(
      resolve_target(&view, "xyz-333333")
        .unwrap(),
      TaskId::from("xyz-333333")
    );
    assert_eq!(
      resolve_target(&view, "abc").unwrap(),
      TaskId::from("abc-111111")
    );
    assert!(resolve_target(&view, "ab").is_err());
    assert!(resolve_target(&view, "9").is_err());
    assert!(resolve_target(&view, "0").is_err());
  }

  #[test]
  fn parses_subcommands_and_globals() {
    let cli = GlobalCli::parse_from([
      "tasks",
      "-vv",
      "--rc",
      "color=off",
      "add",
      "Buy",
      "milk",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.rc_overrides[0].key, "color");
    match cli.command {
      | Some(Command::Add {
        text
      }) => {
        assert_eq!(text, ["Buy", "milk"])
      }
      | other => panic!("unexpected {other:?}")
    }

    let cli = GlobalCli::parse_from([
      "tasks", "filter", "active"
    ]);
    assert!(matches!(
      cli.command,
      Some(Command::Filter {
        value: Filter::Active
      })
    ));

    assert!(
      GlobalCli::try_parse_from([
        "tasks", "filter", "pending"
      ])
      .is_err()
    );
  }
}
