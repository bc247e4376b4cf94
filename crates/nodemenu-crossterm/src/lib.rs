//! Crossterm terminal driver for nodemenu.
//!
//! Provides a [`CrosstermDriver`] that implements [`nodemenu_core::Driver`],
//! turning terminal input into [`Msg`]s and painting a [`Scene`].

use std::io::{self, Write};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        MouseButton, MouseEventKind, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{self, Color as CtColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use nodemenu_core::{
    app::{Context, Driver},
    messages::{Key, ModMask, MouseAction, Msg},
    scene::{Scene, Tone},
    Point,
};

/// Foreground and background colours for a [`Tone`].
fn tone_colors(tone: Tone) -> (CtColor, CtColor) {
    match tone {
        Tone::Normal => (CtColor::Reset, CtColor::Reset),
        Tone::Surface => (CtColor::Black, CtColor::Grey),
        Tone::Highlight => (CtColor::Black, CtColor::Cyan),
        Tone::Muted => (CtColor::DarkGrey, CtColor::Reset),
    }
}

/// Maps crossterm key modifiers to a [`ModMask`].
fn to_mod_mask(mods: KeyModifiers) -> ModMask {
    let mut m = ModMask::NONE;
    if mods.contains(KeyModifiers::SHIFT) {
        m = m | ModMask::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        m = m | ModMask::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        m = m | ModMask::ALT;
    }
    if mods.contains(KeyModifiers::META) {
        m = m | ModMask::META;
    }
    m
}

/// Maps a crossterm [`KeyCode`] to a [`Key`].
fn to_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Delete => Some(Key::Delete),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        _ => None,
    }
}

/// Maps a key event to messages. Terminals that cannot report releases get
/// a `KeyUp` right after each `KeyDown`.
fn key_msgs(ev: KeyEvent, reports_release: bool) -> Vec<Msg> {
    let Some(key) = to_key(ev.code) else {
        return Vec::new();
    };
    let modifiers = to_mod_mask(ev.modifiers);
    let time = Instant::now();
    match ev.kind {
        KeyEventKind::Press if reports_release => vec![Msg::KeyDown {
            key,
            modifiers,
            time,
        }],
        KeyEventKind::Press => vec![
            Msg::KeyDown {
                key: key.clone(),
                modifiers,
                time,
            },
            Msg::KeyUp {
                key,
                modifiers,
                time,
            },
        ],
        KeyEventKind::Release => vec![Msg::KeyUp {
            key,
            modifiers,
            time,
        }],
        KeyEventKind::Repeat => Vec::new(),
    }
}

/// A terminal back-end using crossterm.
pub struct CrosstermDriver {
    mouse_enabled: bool,
    reports_release: bool,
}

impl CrosstermDriver {
    pub fn new() -> Self {
        Self {
            mouse_enabled: true,
            reports_release: false,
        }
    }

    /// Configure whether mouse events are captured.
    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse_enabled = enabled;
        self
    }

    /// Current terminal size as `(width, height)`.
    pub fn size() -> io::Result<(i32, i32)> {
        let (w, h) = terminal::size()?;
        Ok((w as i32, h as i32))
    }
}

impl Default for CrosstermDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for CrosstermDriver {
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        if self.mouse_enabled {
            execute!(stdout, event::EnableMouseCapture)?;
        }
        self.reports_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.reports_release {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::debug!(
            "crossterm driver ready (mouse: {}, key release: {})",
            self.mouse_enabled,
            self.reports_release
        );
        Ok(())
    }

    fn poll_msgs(
        &mut self,
        ctx: &Context,
        tx: Sender<Msg>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !event::poll(Duration::from_millis(16))? {
            return Ok(());
        }

        while event::poll(Duration::ZERO)? {
            if ctx.is_done() {
                return Ok(());
            }

            let msgs = match event::read()? {
                Event::Key(ke) => key_msgs(ke, self.reports_release),
                Event::Mouse(me) => {
                    let pos = Point::new(me.column as i32, me.row as i32);
                    let action = match me.kind {
                        MouseEventKind::Down(MouseButton::Left) => Some(MouseAction::Main),
                        MouseEventKind::Down(MouseButton::Right) => Some(MouseAction::Secondary),
                        MouseEventKind::Down(MouseButton::Middle) => Some(MouseAction::Auxiliary),
                        MouseEventKind::Up(_) => Some(MouseAction::Release),
                        MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(MouseAction::Move),
                        MouseEventKind::ScrollUp => Some(MouseAction::WheelUp),
                        MouseEventKind::ScrollDown => Some(MouseAction::WheelDown),
                        _ => None,
                    };
                    action
                        .map(|action| Msg::Mouse {
                            action,
                            pos,
                            target: None,
                            modifiers: to_mod_mask(me.modifiers),
                            time: Instant::now(),
                        })
                        .into_iter()
                        .collect()
                }
                Event::Resize(w, h) => vec![Msg::Screen {
                    width: w as i32,
                    height: h as i32,
                    time: Instant::now(),
                }],
                _ => Vec::new(),
            };

            for m in msgs {
                tx.send(m).ok();
            }
        }

        Ok(())
    }

    fn flush(&mut self, scene: &Scene) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = io::stdout();
        queue!(stdout, style::ResetColor, terminal::Clear(ClearType::All))?;

        for run in scene.runs() {
            let (fg, bg) = tone_colors(run.tone);
            queue!(
                stdout,
                cursor::MoveTo(run.pos.x as u16, run.pos.y as u16),
                SetForegroundColor(fg),
                SetBackgroundColor(bg),
                style::Print(&run.text)
            )?;
        }

        queue!(stdout, style::ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        let mut stdout = io::stdout();
        if self.reports_release {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        if self.mouse_enabled {
            let _ = execute!(stdout, event::DisableMouseCapture);
        }
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn press_synthesizes_release_without_enhancement() {
        let msgs = key_msgs(key_event(KeyCode::Esc, KeyEventKind::Press), false);
        assert_eq!(msgs.len(), 2);
        assert!(matches!(msgs[0], Msg::KeyDown { key: Key::Escape, .. }));
        assert!(msgs[1].is_escape_up());
    }

    #[test]
    fn press_and_release_map_one_to_one_with_enhancement() {
        let down = key_msgs(key_event(KeyCode::Esc, KeyEventKind::Press), true);
        assert_eq!(down.len(), 1);
        assert!(!down[0].is_escape_up());
        let up = key_msgs(key_event(KeyCode::Esc, KeyEventKind::Release), true);
        assert_eq!(up.len(), 1);
        assert!(up[0].is_escape_up());
    }

    #[test]
    fn unknown_keys_are_dropped() {
        assert!(key_msgs(key_event(KeyCode::F(5), KeyEventKind::Press), false).is_empty());
    }

    #[test]
    fn modifiers_map_to_mask() {
        let m = to_mod_mask(KeyModifiers::SHIFT | KeyModifiers::CONTROL);
        assert!(m.contains(ModMask::SHIFT));
        assert!(m.contains(ModMask::CTRL));
        assert!(!m.contains(ModMask::ALT));
    }
}
