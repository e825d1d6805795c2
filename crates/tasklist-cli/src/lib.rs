pub mod cli;
pub mod commands;
pub mod config;
pub mod file_store;
pub mod render;
pub mod terminal;

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tasklist_core::App;
use tracing::{
  debug,
  info
};

use crate::cli::Command;

#[tracing::instrument(skip_all)]
pub fn run<I, T>(
  raw_args: I
) -> anyhow::Result<()>
where
  I: IntoIterator<Item = T>,
  T: Into<OsString> + Clone
{
  let cli = cli::GlobalCli::parse_from(
    raw_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tasks CLI"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );
  debug!(files = ?cfg.loaded_files, "configuration loaded");

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let store =
    file_store::FileStore::open(
      &data_dir,
      cfg.storage_quota()?
    )
    .with_context(|| {
      format!(
        "failed to open storage at {}",
        data_dir.display()
      )
    })?;

  let renderer =
    render::Renderer::new(&cfg)?;
  let command =
    cli.command.unwrap_or_default();

  let (preset_text, assume_yes) =
    match &command {
      | Command::Edit {
        text,
        ..
      } => (text.clone(), false),
      | Command::Delete {
        yes,
        ..
      } => (None, *yes),
      | _ => (None, false)
    };
  let mut host =
    terminal::TerminalHost::new(
      io::stdin().lock(),
      io::stderr()
    )
    .preset_text(preset_text)
    .assume_yes(assume_yes);

  let mut app = App::new(store);
  commands::dispatch(
    &mut app,
    &renderer,
    &mut host,
    command,
    io::stdout().lock(),
    Utc::now()
  )?;

  info!("done");
  Ok(())
}
