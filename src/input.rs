use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

/// What the host does with one terminal event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Input {
    Quit,
    CycleTheme,
    CycleGlyphs,
    RevealNow,
    PointerMove { x: f32, y: f32 },
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    PointerEnd,
    Resize { cols: u16, rows: u16 },
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<Event>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        out.push(event::read()?);
        if out.len() >= 64 {
            break;
        }
    }
    Ok(out)
}

/// Center of the terminal cell in field pixels.
fn cell_center(column: u16, row: u16, cell_size: f32) -> (f32, f32) {
    (
        (column as f32 + 0.5) * cell_size,
        (row as f32 + 0.5) * cell_size,
    )
}

pub(crate) fn map_event(ev: &Event, cell_size: f32) -> Option<Input> {
    match ev {
        Event::Key(k) => map_key(k),
        Event::Mouse(m) => map_mouse(m, cell_size),
        Event::FocusLost => Some(Input::PointerEnd),
        Event::Resize(cols, rows) => Some(Input::Resize {
            cols: *cols,
            rows: *rows,
        }),
        _ => None,
    }
}

fn map_key(k: &KeyEvent) -> Option<Input> {
    if k.kind != KeyEventKind::Press && k.kind != KeyEventKind::Repeat {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C')).then_some(Input::Quit);
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Input::Quit),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(Input::CycleTheme),
        KeyCode::Char('g') | KeyCode::Char('G') => Some(Input::CycleGlyphs),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Input::RevealNow),
        _ => None,
    }
}

fn map_mouse(m: &MouseEvent, cell_size: f32) -> Option<Input> {
    let (x, y) = cell_center(m.column, m.row, cell_size);
    match m.kind {
        MouseEventKind::Moved => Some(Input::PointerMove { x, y }),
        // A held left button stands in for a finger on the glass.
        MouseEventKind::Down(MouseButton::Left) => Some(Input::TouchStart { x, y }),
        MouseEventKind::Drag(MouseButton::Left) => Some(Input::TouchMove { x, y }),
        MouseEventKind::Up(MouseButton::Left) => Some(Input::PointerEnd),
        _ => None,
    }
}
