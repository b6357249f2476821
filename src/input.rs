//! Polled key state with edge detection
//!
//! Front ends translate whatever their windowing or terminal layer reports into
//! a `KeySnapshot` once per tick; the tracker keeps the previous snapshot so
//! presses can be told apart from holds.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Up,
    Down,
    Left,
    Right,
    Space,
    Shift,
    P,
    R,
}

impl Key {
    pub const ALL: [Key; 9] = [
        Key::Escape,
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Space,
        Key::Shift,
        Key::P,
        Key::R,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Set of keys held down at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeySnapshot {
    held: u16,
}

impl KeySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: Key) -> Self {
        self.press(key);
        self
    }

    pub fn press(&mut self, key: Key) {
        self.held |= key.bit();
    }

    pub fn release(&mut self, key: Key) {
        self.held &= !key.bit();
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.held == 0
    }
}

impl FromIterator<Key> for KeySnapshot {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut snapshot = KeySnapshot::new();
        for key in iter {
            snapshot.press(key);
        }
        snapshot
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputTracker {
    current: KeySnapshot,
    previous: KeySnapshot,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tick with freshly polled state
    pub fn begin_tick(&mut self, snapshot: KeySnapshot) {
        self.previous = self.current;
        self.current = snapshot;
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.current.is_down(key)
    }

    /// Down now but not on the previous tick
    pub fn was_just_pressed(&self, key: Key) -> bool {
        self.current.is_down(key) && !self.previous.is_down(key)
    }

    pub fn current(&self) -> KeySnapshot {
        self.current
    }
}
