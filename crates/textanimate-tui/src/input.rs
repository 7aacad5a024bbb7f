use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Move the text up by one row
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    /// Put the text back in the middle of the viewport
    Recenter,
    /// Unmount and mount again, replaying the trigger from scratch
    Remount,
    /// Pointer moved to a cell
    PointerAt(u16, u16),
    /// Primary button pressed on a cell
    ClickAt(u16, u16),
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => Action::ScrollUp,
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => Action::ScrollDown,
        (KeyCode::PageUp, _) | (KeyCode::Char('b'), KeyModifiers::CONTROL) => Action::PageUp,
        (KeyCode::PageDown, _) | (KeyCode::Char('f'), KeyModifiers::CONTROL) => Action::PageDown,
        (KeyCode::Home, _) | (KeyCode::Char('0'), KeyModifiers::NONE) => Action::Recenter,

        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Remount,

        _ => Action::None,
    }
}

/// Handle a mouse event and return the corresponding action
pub fn handle_mouse_event(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Action::PointerAt(mouse.column, mouse.row),
        MouseEventKind::Down(MouseButton::Left) => Action::ClickAt(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => Action::ScrollUp,
        MouseEventKind::ScrollDown => Action::ScrollDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 4,
            row: 2,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(handle_key_event(key(KeyCode::PageDown)), Action::PageDown);
        assert_eq!(handle_key_event(key(KeyCode::Char('r'))), Action::Remount);
        assert_eq!(handle_key_event(key(KeyCode::Char('x'))), Action::None);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_mouse() {
        assert_eq!(handle_mouse_event(mouse(MouseEventKind::Moved)), Action::PointerAt(4, 2));
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left))),
            Action::ClickAt(4, 2)
        );
        assert_eq!(handle_mouse_event(mouse(MouseEventKind::ScrollDown)), Action::ScrollDown);
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Right))),
            Action::None
        );
    }
}
