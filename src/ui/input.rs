/// Keyboard → button bitset.
///
/// Held buttons drive walking and climbing; newly pressed buttons
/// (held now, not held last tick) drive jumping, ladder grabs, and
/// block make / toss.
///
/// Terminals that report key releases get exact hold tracking. Elsewhere
/// a key counts as held until `HOLD_TIMEOUT` passes without a repeat.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use crate::domain::entity::{Buttons, FrameInput};

/// Silence after which a key without release reporting is let go.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Fixed keyboard map.
pub fn button_for(code: KeyCode) -> Buttons {
    match code {
        KeyCode::Left => Buttons::LEFT,
        KeyCode::Right => Buttons::RIGHT,
        KeyCode::Up => Buttons::UP,
        KeyCode::Down => Buttons::DOWN,
        KeyCode::Enter => Buttons::START,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Buttons::LEFT,
            'd' => Buttons::RIGHT,
            'w' => Buttons::UP,
            's' => Buttons::DOWN,
            'z' | ' ' => Buttons::A,
            'x' => Buttons::B,
            _ => Buttons::NONE,
        },
        _ => Buttons::NONE,
    }
}

pub struct InputState {
    /// Last press or repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went down during the latest drain.
    fresh_presses: Vec<KeyCode>,
    /// Every key event from the latest drain, for quit handling.
    pub raw_events: Vec<KeyEvent>,
    /// Set once the terminal has agreed to report releases.
    pub honor_release: bool,

    /// Buttons held as of the previous `frame_input` call.
    last_held: Buttons,

    /// Buttons freshly pressed since the previous `frame_input` call, so a
    /// tap shorter than one tick still reaches the simulation.
    latched: Buttons,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
            last_held: Buttons::NONE,
            latched: Buttons::NONE,
        }
    }

    /// Ask the terminal for key release events. Leaves timeout-based
    /// release in place when the terminal can't report them.
    pub fn enable_release_events(&mut self) -> io::Result<()> {
        if terminal::supports_keyboard_enhancement()? {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.honor_release = true;
        }
        Ok(())
    }

    pub fn disable_release_events(&mut self) -> io::Result<()> {
        if self.honor_release {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            self.honor_release = false;
        }
        Ok(())
    }

    /// Read every pending terminal event without blocking. Once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }
        self.expire(Instant::now());
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                    self.latched = self.latched | button_for(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    /// Did any of these keys go down during the latest drain?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    /// Buttons whose keys are down right now.
    pub fn held_buttons(&self) -> Buttons {
        self.last_active
            .keys()
            .fold(Buttons::NONE, |acc, &code| acc | button_for(code))
    }

    /// Held and newly pressed buttons for one simulation tick.
    pub fn frame_input(&mut self) -> FrameInput {
        let held = self.held_buttons() | self.latched;
        let mut input = FrameInput::new(held, self.last_held);
        input.pressed = input.pressed | self.latched;
        self.last_held = held;
        self.latched = Buttons::NONE;
        input
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c' | 'C'))
        })
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| self.honor_release || now.duration_since(*t) < HOLD_TIMEOUT)
    }
}
