use std::io::{
  BufRead,
  Write
};

use tasklist_core::{
  Confirmer,
  Host,
  Notifier,
  Prompter,
  Theme
};
use tracing::{
  debug,
  warn
};

/// Host backed by a line-oriented
/// terminal. Questions and notifications
/// go to `output` (stderr in the binary)
/// so stdout only carries the list.
#[derive(Debug)]
pub struct TerminalHost<R, W> {
  input:       R,
  output:      W,
  assume_yes:  bool,
  preset_text: Option<String>,
  theme:       Theme
}

impl<R: BufRead, W: Write> TerminalHost<R, W> {
  pub fn new(input: R, output: W) -> Self {
    Self {
      input,
      output,
      assume_yes: false,
      preset_text: None,
      theme: Theme::default()
    }
  }

  /// Answer every confirmation with yes.
  pub fn assume_yes(
    mut self,
    yes: bool
  ) -> Self {
    self.assume_yes = yes;
    self
  }

  /// Answer the next prompt with `text`
  /// without reading input.
  pub fn preset_text(
    mut self,
    text: Option<String>
  ) -> Self {
    self.preset_text = text;
    self
  }

  pub fn theme(&self) -> Theme {
    self.theme
  }

  pub fn into_output(self) -> W {
    self.output
  }

  fn read_line(&mut self) -> Option<String> {
    let _ = self.output.flush();
    let mut line = String::new();
    match self.input.read_line(&mut line) {
      | Ok(0) => None,
      | Ok(_) => {
        Some(
          line
            .trim_end_matches(['\r', '\n'])
            .to_string()
        )
      }
      | Err(error) => {
        warn!(%error, "failed reading terminal input");
        None
      }
    }
  }
}

impl<R: BufRead, W: Write> Prompter
  for TerminalHost<R, W>
{
  /// EOF cancels; an empty line keeps the
  /// current text.
  fn prompt_for_text(
    &mut self,
    message: &str,
    initial: &str
  ) -> Option<String> {
    if let Some(text) = self.preset_text.take()
    {
      debug!("prompt answered from arguments");
      return Some(text);
    }

    let _ = write!(
      self.output,
      "{message} [{initial}] "
    );
    let line = self.read_line()?;
    if line.is_empty() {
      Some(initial.to_string())
    } else {
      Some(line)
    }
  }
}

impl<R: BufRead, W: Write> Confirmer
  for TerminalHost<R, W>
{
  fn confirm(
    &mut self,
    message: &str
  ) -> bool {
    if self.assume_yes {
      debug!("confirmation pre-approved");
      return true;
    }

    let _ =
      write!(self.output, "{message} [s/N] ");
    self
      .read_line()
      .map(|answer| is_yes(&answer))
      .unwrap_or(false)
  }
}

impl<R: BufRead, W: Write> Notifier
  for TerminalHost<R, W>
{
  fn notify(&mut self, message: &str) {
    let _ = writeln!(self.output, "{message}");
  }
}

impl<R: BufRead, W: Write> Host
  for TerminalHost<R, W>
{
  fn reset_compose(&mut self) {
    debug!("compose input reset");
  }

  fn apply_theme(&mut self, theme: Theme) {
    self.theme = theme;
  }
}

fn is_yes(answer: &str) -> bool {
  matches!(
    answer
      .trim()
      .to_lowercase()
      .as_str(),
    "s" | "si" | "sí" | "y" | "yes"
  )
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  fn host(
    input: &str
  ) -> TerminalHost<Cursor<Vec<u8>>, Vec<u8>>
  {
    TerminalHost::new(
      Cursor::new(input.as_bytes().to_vec()),
      Vec::new()
    )
  }

  #[test]
  fn prompt_reads_line_keeps_blank_and_cancels_on_eof()
   {
    let mut h = host("new text\n\n");
    assert_eq!(
      h.prompt_for_text("Edita la tarea:", "old"),
      Some("new text".to_string())
    );
    assert_eq!(
      h.prompt_for_text("Edita la tarea:", "old"),
      Some("old".to_string())
    );
    assert_eq!(
      h.prompt_for_text("Edita la tarea:", "old"),
      None
    );

    let out =
      String::from_utf8(h.into_output()).unwrap();
    assert!(out.starts_with("Edita la tarea: [old] "));
  }

  #[test]
  fn preset_text_skips_input() {
    let mut h = host("")
      .preset_text(Some("scripted".to_string()));
    assert_eq!(
      h.prompt_for_text("?", "old"),
      Some("scripted".to_string())
    );
    assert_eq!(h.prompt_for_text("?", "old"), None);
  }

  #[test]
  fn confirm_accepts_spanish_and_english_yes() {
    let mut h = host("sí\nY\nno\n\n");
    assert!(h.confirm("?"));
    assert!(h.confirm("?"));
    assert!(!h.confirm("?"));
    assert!(!h.confirm("?"));
    assert!(!h.confirm("?"));

    let mut h = host("").assume_yes(true);
    assert!(h.confirm("?"));
  }
}
