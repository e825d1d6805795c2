use std::collections::VecDeque;

use crate::theme::Theme;

/// Blocking text input pre-filled with
/// `initial`. `None` means the user
/// cancelled.
pub trait Prompter {
  fn prompt_for_text(
    &mut self,
    message: &str,
    initial: &str
  ) -> Option<String>;
}

pub trait Confirmer {
  fn confirm(
    &mut self,
    message: &str
  ) -> bool;
}

/// Synchronous notification the user has
/// to acknowledge.
pub trait Notifier {
  fn notify(&mut self, message: &str);
}

/// Everything a binding layer provides to
/// the gesture handlers.
pub trait Host:
  Prompter + Confirmer + Notifier
{
  /// Clear the compose input and give it
  /// focus again.
  fn reset_compose(&mut self);

  fn apply_theme(&mut self, theme: Theme);
}

/// Host driven by queued answers. Records
/// everything the handlers asked of it.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHost {
  pub prompt_answers:  VecDeque<Option<String>>,
  pub confirm_answers: VecDeque<bool>,
  pub prompts:         Vec<(String, String)>,
  pub confirmations:   Vec<String>,
  pub notifications:   Vec<String>,
  pub compose_resets:  usize,
  pub theme:           Option<Theme>
}

impl ScriptedHost {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn answer_prompt(
    mut self,
    answer: Option<&str>
  ) -> Self {
    self
      .prompt_answers
      .push_back(answer.map(str::to_string));
    self
  }

  pub fn answer_confirm(
    mut self,
    answer: bool
  ) -> Self {
    self.confirm_answers.push_back(answer);
    self
  }
}

impl Prompter for ScriptedHost {
  /// An exhausted script behaves like a
  /// cancelled prompt.
  fn prompt_for_text(
    &mut self,
    message: &str,
    initial: &str
  ) -> Option<String> {
    self.prompts.push((
      message.to_string(),
      initial.to_string()
    ));
    self
      .prompt_answers
      .pop_front()
      .flatten()
  }
}

impl Confirmer for ScriptedHost {
  fn confirm(
    &mut self,
    message: &str
  ) -> bool {
    self
      .confirmations
      .push(message.to_string());
    self
      .confirm_answers
      .pop_front()
      .unwrap_or(false)
  }
}

impl Notifier for ScriptedHost {
  fn notify(&mut self, message: &str) {
    self
      .notifications
      .push(message.to_string());
  }
}

impl Host for ScriptedHost {
  fn reset_compose(&mut self) {
    self.compose_resets += 1;
  }

  fn apply_theme(&mut self, theme: Theme) {
    self.theme = Some(theme);
  }
}
