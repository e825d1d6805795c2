use std::io::{
  BufRead,
  Write
};

use chrono::{
  DateTime,
  Utc
};
use tasklist_core::{
  App,
  Gesture,
  KeyValueStore
};
use tracing::{
  debug,
  info,
  instrument
};

use crate::cli::{
  Command,
  ThemeAction,
  resolve_target
};
use crate::render::Renderer;
use crate::terminal::TerminalHost;

/// Turns one command into at most one
/// gesture, runs it and prints the
/// resulting view to `out`.
#[instrument(skip(app, renderer, host, out, now))]
pub fn dispatch<S, R, W, O>(
  app: &mut App<S>,
  renderer: &Renderer,
  host: &mut TerminalHost<R, W>,
  command: Command,
  mut out: O,
  now: DateTime<Utc>
) -> anyhow::Result<()>
where
  S: KeyValueStore,
  R: BufRead,
  W: Write,
  O: Write
{
  let current = app.boot(host);

  let view = match command {
    | Command::List {
      filter
    } => {
      match filter {
        | Some(filter) => {
          debug!(%filter, "one-off filter");
          app.store().render(filter)
        }
        | None => current
      }
    }
    | Command::Add {
      text
    } => {
      let input = text.join(" ");
      app.handle(
        Gesture::Submit {
          input
        },
        host,
        now
      )
    }
    | Command::Edit {
      target,
      ..
    } => {
      let id = resolve_target(&current, &target)?;
      app.handle(Gesture::EditClicked(id), host, now)
    }
    | Command::Done {
      target
    } => {
      let id = resolve_target(&current, &target)?;
      app.handle(
        Gesture::DoneChanged {
          id,
          checked: true
        },
        host,
        now
      )
    }
    | Command::Undone {
      target
    } => {
      let id = resolve_target(&current, &target)?;
      app.handle(
        Gesture::DoneChanged {
          id,
          checked: false
        },
        host,
        now
      )
    }
    | Command::Delete {
      target,
      ..
    } => {
      let id = resolve_target(&current, &target)?;
      app.handle(
        Gesture::DeleteClicked(id),
        host,
        now
      )
    }
    | Command::Filter {
      value
    } => {
      app.handle(
        Gesture::FilterChanged(value),
        host,
        now
      )
    }
    | Command::Theme {
      action: ThemeAction::Show
    } => {
      writeln!(
        out,
        "{}",
        app.theme().storage_value()
      )?;
      return Ok(());
    }
    | Command::Theme {
      action: ThemeAction::Toggle
    } => {
      let view = app.handle(
        Gesture::ThemeToggled,
        host,
        now
      );
      info!(
        theme = app.theme().storage_value(),
        "theme toggled"
      );
      writeln!(
        out,
        "Tema: {}",
        app.theme().storage_value()
      )?;
      view
    }
  };

  renderer.print_view(
    &mut out,
    &view,
    host.theme()
  )
}
