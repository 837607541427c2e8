#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Keyboard multiplexing for the overworld character.
//!
//! Hosts forward raw press and release notifications as [`KeyEvent`] values.
//! Movement keys feed an ordered stack so that the most recently pressed,
//! still-held direction wins; the fire key is latched on its press edge and
//! consumed once by the projectile system.

use std::collections::BTreeMap;

use tropical_trouble_core::{Direction, Event, InputAction};

/// Ordered set of held movement directions, most recent first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputMultiplexer {
    held: Vec<Direction>,
}

impl InputMultiplexer {
    /// Creates an empty multiplexer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a press, returning whether the stack changed.
    ///
    /// A direction that is already held keeps its place, so key auto-repeat
    /// never reorders the stack.
    pub fn press(&mut self, direction: Direction) -> bool {
        if self.held.contains(&direction) {
            return false;
        }
        self.held.insert(0, direction);
        true
    }

    /// Records a release, returning whether the direction was held.
    pub fn release(&mut self, direction: Direction) -> bool {
        let before = self.held.len();
        self.held.retain(|held| *held != direction);
        self.held.len() != before
    }

    /// Direction that currently drives movement.
    #[must_use]
    pub fn current(&self) -> Option<Direction> {
        self.held.first().copied()
    }

    /// Held directions, most recent first.
    #[must_use]
    pub fn held(&self) -> &[Direction] {
        &self.held
    }
}

/// Transition reported by the host for a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// The key went down (including auto-repeat).
    Pressed,
    /// The key went up.
    Released,
}

/// Raw key notification forwarded by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Host key identifier such as `ArrowLeft` or `Space`.
    pub key: String,
    /// Whether the key went down or up.
    pub state: KeyState,
}

impl KeyEvent {
    /// Creates a press notification.
    #[must_use]
    pub fn pressed(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: KeyState::Pressed,
        }
    }

    /// Creates a release notification.
    #[must_use]
    pub fn released(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: KeyState::Released,
        }
    }
}

/// Mapping from host key identifiers to actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBindings {
    actions: BTreeMap<String, InputAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let actions = [
            ("ArrowUp", InputAction::Move(Direction::Up)),
            ("ArrowDown", InputAction::Move(Direction::Down)),
            ("ArrowLeft", InputAction::Move(Direction::Left)),
            ("ArrowRight", InputAction::Move(Direction::Right)),
            ("Space", InputAction::Fire),
        ]
        .into_iter()
        .map(|(key, action)| (key.to_owned(), action))
        .collect();
        Self { actions }
    }
}

impl KeyBindings {
    /// Default bindings with the provided overrides layered on top.
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<String, InputAction>) -> Self {
        let mut bindings = Self::default();
        for (key, action) in overrides {
            bindings.bind(key.clone(), *action);
        }
        bindings
    }

    /// Binds a key, replacing any previous action.
    pub fn bind(&mut self, key: impl Into<String>, action: InputAction) {
        let _ = self.actions.insert(key.into(), action);
    }

    /// Action bound to the key, if any.
    #[must_use]
    pub fn action(&self, key: &str) -> Option<InputAction> {
        self.actions.get(key).copied()
    }
}

/// Stateful input system translating key notifications into a heading and a fire latch.
#[derive(Clone, Debug, Default)]
pub struct Input {
    bindings: KeyBindings,
    multiplexer: InputMultiplexer,
    fire_held: bool,
    fire_latched: bool,
}

impl Input {
    /// Creates an input system using the provided bindings.
    #[must_use]
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// Applies a host key notification. Unbound keys are ignored.
    pub fn handle_key(&mut self, key: &KeyEvent) {
        let Some(action) = self.bindings.action(&key.key) else {
            return;
        };
        match (action, key.state) {
            (InputAction::Move(direction), KeyState::Pressed) => {
                let _ = self.multiplexer.press(direction);
            }
            (InputAction::Move(direction), KeyState::Released) => {
                let _ = self.multiplexer.release(direction);
            }
            (InputAction::Fire, KeyState::Pressed) => {
                if !self.fire_held {
                    self.fire_held = true;
                    self.fire_latched = true;
                }
            }
            (InputAction::Fire, KeyState::Released) => self.fire_held = false,
        }
    }

    /// Drops a pending shot when a new scene is entered.
    pub fn handle(&mut self, events: &[Event]) {
        if events
            .iter()
            .any(|event| matches!(event, Event::SceneEntered { .. }))
        {
            self.fire_latched = false;
        }
    }

    /// Direction that currently drives movement.
    #[must_use]
    pub fn heading(&self) -> Option<Direction> {
        self.multiplexer.current()
    }

    /// Consumes the fire latch, returning whether a shot was requested.
    pub fn take_fire(&mut self) -> bool {
        std::mem::take(&mut self.fire_latched)
    }
}
