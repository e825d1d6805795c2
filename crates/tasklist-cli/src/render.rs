use std::io::{
  self,
  IsTerminal,
  Write
};

use tasklist_core::{
  Row,
  Theme,
  View
};
use unicode_width::{
  UnicodeWidthChar,
  UnicodeWidthStr
};

use crate::config::Config;

const HEADERS: [&str; 4] =
  ["#", "Hecha", "Tarea", "ID"];

/// Task texts wider than this are cut
/// with an ellipsis; ids never are.
const TEXT_MAX_WIDTH: usize = 48;

#[derive(Debug, Clone)]
pub struct Renderer {
  styled: bool
}

impl Renderer {
  pub fn new(
    cfg: &Config
  ) -> anyhow::Result<Self> {
    let color = cfg
      .get_bool("color")?
      .unwrap_or(true);

    Ok(Self {
      styled: color
        && io::stdout().is_terminal()
    })
  }

  pub fn plain() -> Self {
    Self {
      styled: false
    }
  }

  #[tracing::instrument(skip(self, out, view), fields(rows = view.rows.len()))]
  pub fn print_view<W: Write>(
    &self,
    mut out: W,
    view: &View,
    theme: Theme
  ) -> anyhow::Result<()> {
    writeln!(
      out,
      "{}",
      self.paint(
        &format!(
          "Filtro: {}",
          view.filter.label()
        ),
        accent(theme)
      )
    )?;

    if view.is_empty() {
      writeln!(out, "No hay tareas.")?;
    } else {
      self.write_rows(
        &mut out,
        &view.rows,
        theme
      )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", view.counts)?;
    Ok(())
  }

  /// Column widths come from the plain
  /// cells; styling is added while
  /// padding.
  fn write_rows<W: Write>(
    &self,
    mut out: W,
    rows: &[Row],
    theme: Theme
  ) -> anyhow::Result<()> {
    let cells: Vec<[String; 4]> = rows
      .iter()
      .enumerate()
      .map(|(idx, row)| {
        [
          (idx + 1).to_string(),
          if row.done { "[x]" } else { "[ ]" }
            .to_string(),
          truncate(&row.text, TEXT_MAX_WIDTH),
          row.id.to_string(),
        ]
      })
      .collect();

    let mut widths =
      HEADERS.map(|header| header.width());
    for line in &cells {
      for (width, cell) in
        widths.iter_mut().zip(line)
      {
        *width = (*width).max(cell.width());
      }
    }

    for (header, &width) in
      HEADERS.iter().zip(&widths)
    {
      write!(out, "{header:width$} ")?;
    }
    writeln!(out)?;

    for &width in &widths {
      write!(out, "{:-<width$} ", "")?;
    }
    writeln!(out)?;

    for (row, line) in rows.iter().zip(&cells) {
      for (col, (cell, &width)) in
        line.iter().zip(&widths).enumerate()
      {
        let padding =
          width.saturating_sub(cell.width());
        let shown = match col {
          | 0 => self.paint(cell, accent(theme)),
          | 2 if row.done => {
            self.paint(cell, "2;9")
          }
          | _ => cell.clone()
        };
        write!(
          out,
          "{shown}{} ",
          " ".repeat(padding)
        )?;
      }
      writeln!(out)?;
    }

    Ok(())
  }

  fn paint(
    &self,
    text: &str,
    code: &str
  ) -> String {
    if !self.styled {
      return text.to_string();
    }
    format!("\x1b[{code}m{text}\x1b[0m")
  }
}

fn accent(theme: Theme) -> &'static str {
  match theme {
    | Theme::Light => "34",
    | Theme::Dark => "96"
  }
}

fn truncate(
  text: &str,
  max: usize
) -> String {
  if text.width() <= max {
    return text.to_string();
  }

  let mut out = String::new();
  let mut used = 0;
  for ch in text.chars() {
    let width = ch.width().unwrap_or(0);
    if used + width + 1 > max {
      break;
    }
    out.push(ch);
    used += width;
  }
  out.push('…');
  out
}
