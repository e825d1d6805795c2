use chrono::{
  DateTime,
  Utc
};
use tasklist_core::render::{
  CHECK_LABEL,
  DELETE_LABEL,
  EDIT_LABEL
};
use tasklist_core::{
  App as TaskApp,
  Filter,
  Gesture,
  Row,
  resolve_row_id
};
use web_sys::{
  Element,
  Event,
  HtmlInputElement,
  MouseEvent,
  SubmitEvent
};
use yew::{
  Callback,
  Html,
  TargetCast,
  classes,
  function_component,
  html,
  use_mut_ref,
  use_node_ref,
  use_state
};

use crate::host::{
  BrowserHost,
  DomNode
};
use crate::storage::LocalStore;

fn now() -> DateTime<Utc> {
  DateTime::from_timestamp_millis(
    js_sys::Date::now() as i64
  )
  .unwrap_or_default()
}

#[function_component(App)]
pub fn app() -> Html {
  let compose = use_node_ref();
  let tasks = use_mut_ref(|| {
    TaskApp::new(LocalStore::open())
  });
  let view = {
    let tasks = tasks.clone();
    let compose = compose.clone();
    use_state(move || {
      let mut host =
        BrowserHost::new(compose);
      tasks.borrow_mut().boot(&mut host)
    })
  };

  let dispatch = {
    let tasks = tasks.clone();
    let view = view.clone();
    let compose = compose.clone();
    Callback::from(move |gesture: Gesture| {
      tracing::debug!(?gesture, "dispatching gesture");
      let mut host =
        BrowserHost::new(compose.clone());
      let next = tasks
        .borrow_mut()
        .handle(gesture, &mut host, now());
      view.set(next);
    })
  };

  let on_submit = {
    let dispatch = dispatch.clone();
    let compose = compose.clone();
    Callback::from(move |e: SubmitEvent| {
      e.prevent_default();
      let input = compose
        .cast::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default();
      dispatch.emit(Gesture::Submit {
        input
      });
    })
  };

  let on_list_click = {
    let dispatch = dispatch.clone();
    Callback::from(move |e: MouseEvent| {
      let Some(target) =
        e.target_dyn_into::<Element>()
      else {
        return;
      };
      let classes = target.class_list();
      let Some(id) = resolve_row_id(
        DomNode(target)
      ) else {
        return;
      };

      if classes.contains("delete-btn") {
        dispatch
          .emit(Gesture::DeleteClicked(id));
      } else if classes.contains("edit-btn")
      {
        dispatch.emit(Gesture::EditClicked(id));
      }
    })
  };

  let on_list_change = {
    let dispatch = dispatch.clone();
    Callback::from(move |e: Event| {
      let Some(input) = e
        .target_dyn_into::<HtmlInputElement>()
      else {
        return;
      };
      if input.type_() != "checkbox" {
        return;
      }
      let checked = input.checked();
      let element: Element = input.into();
      if let Some(id) =
        resolve_row_id(DomNode(element))
      {
        dispatch.emit(Gesture::DoneChanged {
          id,
          checked
        });
      }
    })
  };

  let on_filter_change = {
    let dispatch = dispatch.clone();
    Callback::from(move |e: Event| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      let filter = Filter::from_storage(
        Some(input.value().as_str())
      );
      dispatch
        .emit(Gesture::FilterChanged(filter));
    })
  };

  let on_toggle_theme = {
    let dispatch = dispatch.clone();
    Callback::from(move |_: MouseEvent| {
      dispatch.emit(Gesture::ThemeToggled);
    })
  };

  html! {
      <main class="app">
          <header class="app-header">
              <h1>{ "Tareas" }</h1>
              <button
                  id="toggle-theme-btn"
                  type="button"
                  class="btn"
                  onclick={on_toggle_theme}
              >
                  { "Cambiar tema" }
              </button>
          </header>

          <form id="task-form" onsubmit={on_submit}>
              <input
                  id="task-input"
                  ref={compose}
                  type="text"
                  autocomplete="off"
                  placeholder="Nueva tarea"
                  aria-label="Nueva tarea"
              />
              <button type="submit" class="btn">{ "Agregar" }</button>
          </form>

          <fieldset id="filters" onchange={on_filter_change}>
              <legend>{ "Mostrar" }</legend>
              {
                  for Filter::ALL.into_iter().map(|filter| html! {
                      <label>
                          <input
                              type="radio"
                              name="status"
                              value={filter.storage_value()}
                              checked={view.filter == filter}
                          />
                          { filter.label() }
                      </label>
                  })
              }
          </fieldset>

          <ul id="task-list" onclick={on_list_click} onchange={on_list_change}>
              { for view.rows.iter().map(task_row) }
          </ul>

          <p id="counter">{ view.counts.to_string() }</p>
      </main>
  }
}

fn task_row(row: &Row) -> Html {
  html! {
      <li key={row.id.to_string()} class="task-item" data-id={row.id.to_string()}>
          <input
              type="checkbox"
              class="task-check"
              checked={row.done}
              aria-label={CHECK_LABEL}
          />
          <span class={classes!("task-text", row.done.then_some("is-done"))}>
              { &row.text }
          </span>
          <div class="task-actions">
              <button type="button" class="edit-btn" aria-label={EDIT_LABEL}>{ "✏️" }</button>
              <button type="button" class="delete-btn" aria-label={DELETE_LABEL}>{ "❌" }</button>
          </div>
      </li>
  }
}
