//! Input events.
//!
//! The host hands the window an [`InputState`] snapshot each tick.
//! [`EventSynth`] diffs consecutive snapshots into discrete [`Event`]s, which
//! the window dispatches through the widget tree one at a time. The same
//! `Event` allocation is reset and reused for every occurrence.

use bitflags::bitflags;

use super::WidgetId;

bitflags! {
    /// Mouse buttons held, as a bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u32 {
        /// Left button.
        const LEFT = 1;
        /// Right button.
        const RIGHT = 2;
        /// Middle button.
        const MIDDLE = 64;
    }
}

/// Keyboard modifiers held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Control.
    pub ctrl: bool,
    /// Shift.
    pub shift: bool,
    /// Alt.
    pub alt: bool,
    /// Meta / command.
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Control only.
    pub const CTRL: Modifiers = Modifiers { ctrl: true, ..Self::NONE };

    /// Shift only.
    pub const SHIFT: Modifiers = Modifiers { shift: true, ..Self::NONE };
}

/// A pressed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Enter / return.
    Enter,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Insert.
    Insert,
    /// A character.
    Char(char),
}

impl Key {
    /// Decode a host key code.
    ///
    /// Named keys use the packed-ASCII codes hosts of this toolkit report
    /// (for example `"left"` packed big-endian); plain characters are
    /// their code point.
    pub fn from_code(code: u32) -> Option<Key> {
        let key = match code {
            8 => Key::Backspace,
            9 => Key::Tab,
            13 => Key::Enter,
            27 => Key::Escape,
            0x6465_6c => Key::Delete,
            0x6c65_6674 => Key::Left,
            0x7267_6874 => Key::Right,
            0x7570 => Key::Up,
            0x646f_776e => Key::Down,
            0x686f_6d65 => Key::Home,
            0x656e_64 => Key::End,
            0x7067_7570 => Key::PageUp,
            0x7067_646e => Key::PageDown,
            0x696e_73 => Key::Insert,
            c if c >= 32 => Key::Char(char::from_u32(c)?),
            _ => return None,
        };
        Some(key)
    }
}

/// The kind of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventType {
    /// Pointer moved.
    #[default]
    MouseMove,
    /// A button was pressed.
    MouseDown,
    /// A button was released.
    MouseUp,
    /// Wheel turned.
    MouseWheel,
    /// A key was pressed.
    KeyPress,
    /// Files were dropped from the host.
    DropFile,
}

/// Which widget, if any, handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Handled {
    /// Not handled.
    #[default]
    No,
    /// Handled without naming a widget.
    Anonymous,
    /// Handled by a widget.
    By(WidgetId),
}

/// A discrete input event.
#[derive(Debug, Clone, Default)]
pub struct Event {
    /// Event kind.
    pub kind: EventType,
    /// Pointer x, window-relative.
    pub x: f64,
    /// Pointer y, window-relative.
    pub y: f64,
    /// Button that changed for `MouseDown`/`MouseUp`.
    pub button: MouseButtons,
    /// Buttons held.
    pub buttons: MouseButtons,
    /// Vertical wheel delta.
    pub wheel: f64,
    /// Horizontal wheel delta.
    pub hwheel: f64,
    /// Key for `KeyPress`.
    pub key: Option<Key>,
    /// Modifiers held.
    pub modifiers: Modifiers,
    /// Paths for `DropFile`.
    pub files: Vec<String>,
    /// Tick time the event belongs to.
    pub time: f64,
    /// Synthesized by the toolkit rather than from host input.
    pub simulated: bool,
    handled: Handled,
}

impl Event {
    /// A fresh event of `kind`.
    pub fn new(kind: EventType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Reset for a new occurrence, keeping allocations.
    pub fn reset(&mut self, kind: EventType) {
        self.kind = kind;
        self.button = MouseButtons::empty();
        self.wheel = 0.0;
        self.hwheel = 0.0;
        self.key = None;
        self.files.clear();
        self.simulated = false;
        self.handled = Handled::No;
    }

    /// Whether the event is pointer related.
    pub fn is_mouse_event(&self) -> bool {
        !matches!(self.kind, EventType::KeyPress)
    }

    /// Mark the event handled, by a widget or anonymously.
    pub fn set_handled(&mut self, by: Option<WidgetId>) {
        self.handled = match by {
            Some(id) => Handled::By(id),
            None => Handled::Anonymous,
        };
    }

    /// Whether any widget handled the event.
    pub fn is_handled(&self) -> bool {
        self.handled != Handled::No
    }

    /// Who handled the event.
    pub fn handled(&self) -> Handled {
        self.handled
    }
}

/// What the host reports for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    /// Pointer x, window-relative.
    pub mouse_x: f64,
    /// Pointer y, window-relative.
    pub mouse_y: f64,
    /// Buttons held.
    pub buttons: MouseButtons,
    /// Vertical wheel delta since the last frame.
    pub wheel: f64,
    /// Horizontal wheel delta since the last frame.
    pub hwheel: f64,
    /// Key pressed this frame.
    pub key: Option<Key>,
    /// Modifiers held.
    pub modifiers: Modifiers,
    /// Files dropped this frame.
    pub dropped_files: Vec<String>,
}

impl InputState {
    /// Pointer at a position, nothing held.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            mouse_x: x,
            mouse_y: y,
            ..Self::default()
        }
    }

    /// Same snapshot with buttons held.
    pub fn with_buttons(mut self, buttons: MouseButtons) -> Self {
        self.buttons = buttons;
        self
    }

    /// Same snapshot with a key pressed.
    pub fn with_key(mut self, key: Key, modifiers: Modifiers) -> Self {
        self.key = Some(key);
        self.modifiers = modifiers;
        self
    }
}

/// One synthesized occurrence, before it is written into the shared event.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Occurrence {
    Move,
    Down(MouseButtons),
    Up(MouseButtons),
    Wheel,
    Key(Key),
    Files,
}

/// Diffs consecutive input snapshots into event occurrences.
#[derive(Debug, Default)]
pub struct EventSynth {
    last: Option<InputState>,
}

impl EventSynth {
    /// A synthesizer with no previous snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The previous snapshot.
    pub fn last(&self) -> Option<&InputState> {
        self.last.as_ref()
    }

    pub(crate) fn diff(&mut self, input: &InputState) -> Vec<Occurrence> {
        let mut out = Vec::new();
        let (moved, held) = match &self.last {
            Some(last) => (
                last.mouse_x != input.mouse_x || last.mouse_y != input.mouse_y,
                last.buttons,
            ),
            None => (true, MouseButtons::empty()),
        };
        if moved {
            out.push(Occurrence::Move);
        }
        for button in [MouseButtons::LEFT, MouseButtons::RIGHT, MouseButtons::MIDDLE] {
            let now = input.buttons.contains(button);
            let before = held.contains(button);
            if now && !before {
                out.push(Occurrence::Down(button));
            } else if !now && before {
                out.push(Occurrence::Up(button));
            }
        }
        if input.wheel != 0.0 || input.hwheel != 0.0 {
            out.push(Occurrence::Wheel);
        }
        if let Some(key) = input.key {
            out.push(Occurrence::Key(key));
        }
        if !input.dropped_files.is_empty() {
            out.push(Occurrence::Files);
        }
        self.last = Some(input.clone());
        out
    }

    /// Write an occurrence into the reusable event.
    pub(crate) fn fill(event: &mut Event, occurrence: &Occurrence, input: &InputState, time: f64) {
        let kind = match occurrence {
            Occurrence::Move => EventType::MouseMove,
            Occurrence::Down(_) => EventType::MouseDown,
            Occurrence::Up(_) => EventType::MouseUp,
            Occurrence::Wheel => EventType::MouseWheel,
            Occurrence::Key(_) => EventType::KeyPress,
            Occurrence::Files => EventType::DropFile,
        };
        event.reset(kind);
        event.x = input.mouse_x;
        event.y = input.mouse_y;
        event.buttons = input.buttons;
        event.modifiers = input.modifiers;
        event.time = time;
        match occurrence {
            Occurrence::Down(b) | Occurrence::Up(b) => event.button = *b,
            Occurrence::Wheel => {
                event.wheel = input.wheel;
                event.hwheel = input.hwheel;
            }
            Occurrence::Key(k) => event.key = Some(*k),
            Occurrence::Files => event.files.extend(input.dropped_files.iter().cloned()),
            Occurrence::Move => {}
        }
    }
}
