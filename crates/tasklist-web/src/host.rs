use tasklist_core::{
  Confirmer,
  Host,
  Notifier,
  Prompter,
  RowNode,
  TaskId,
  Theme
};
use web_sys::{
  Element,
  HtmlInputElement
};
use yew::NodeRef;

/// Blocking browser dialogs plus the
/// compose input and the body's theme
/// class.
pub struct BrowserHost {
  compose: NodeRef
}

impl BrowserHost {
  pub fn new(compose: NodeRef) -> Self {
    Self {
      compose
    }
  }
}

impl Prompter for BrowserHost {
  fn prompt_for_text(
    &mut self,
    message: &str,
    initial: &str
  ) -> Option<String> {
    web_sys::window()?
      .prompt_with_message_and_default(
        message, initial
      )
      .ok()
      .flatten()
  }
}

impl Confirmer for BrowserHost {
  fn confirm(
    &mut self,
    message: &str
  ) -> bool {
    web_sys::window()
      .and_then(|window| {
        window
          .confirm_with_message(message)
          .ok()
      })
      .unwrap_or(false)
  }
}

impl Notifier for BrowserHost {
  fn notify(&mut self, message: &str) {
    if let Some(window) = web_sys::window()
    {
      let _ = window.alert_with_message(message);
    }
  }
}

impl Host for BrowserHost {
  fn reset_compose(&mut self) {
    if let Some(input) =
      self.compose.cast::<HtmlInputElement>()
    {
      input.set_value("");
      let _ = input.focus();
    }
  }

  fn apply_theme(&mut self, theme: Theme) {
    let body = web_sys::window()
      .and_then(|window| window.document())
      .and_then(|document| document.body());

    if let Some(body) = body {
      let _ = body.class_list().toggle_with_force(
        Theme::DARK_CLASS,
        theme.root_class().is_some()
      );
    }
  }
}

/// DOM element seen as a node of the row
/// tree: `<li data-id=…>` elements are
/// rows.
pub struct DomNode(pub Element);

impl RowNode for DomNode {
  fn row_id(&self) -> Option<TaskId> {
    if self.0.tag_name().eq_ignore_ascii_case("li") {
      self
        .0
        .get_attribute("data-id")
        .map(TaskId::from)
    } else {
      None
    }
  }

  fn parent(&self) -> Option<Self> {
    self.0.parent_element().map(DomNode)
  }
}
