//! Input handling with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Uses a polling-based approach that doesn't rely on key release events,
//! which are unreliable on Linux terminals. Release events are still honored
//! when the terminal reports them.

use crate::game::Action;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);
/// Terminals wait this long (250-600 ms) before auto-repeat starts, so a
/// held accelerate key gets more slack until its first repeat arrives
const FIRST_REPEAT_TIMEOUT: Duration = Duration::from_millis(600);

/// Input handler with DAS/ARR support
pub struct InputHandler {
    /// Held horizontal movement keys (for DAS)
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    /// Held accelerate key
    accelerate_state: Option<KeyPressState>,
    /// Key bindings
    bindings: KeyBindings,
    /// DAS duration
    das: Duration,
    /// ARR duration
    arr: Duration,
}

#[derive(Debug, Clone)]
struct KeyPressState {
    first_press: Instant,
    last_seen: Instant,
    das_triggered: bool,
    last_arr: Option<Instant>,
}

impl KeyPressState {
    fn new(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_triggered: false,
            last_arr: None,
        }
    }

    /// No key event for longer than the release timeout
    fn released(&self, now: Instant, timeout: Duration) -> bool {
        now.duration_since(self.last_seen) > timeout
    }

    fn repeated(&self) -> bool {
        self.last_seen > self.first_press
    }
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub place: Vec<KeyCode>,
    pub accelerate: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let key = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
            "ctrl" | "control" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
            "alt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        tracing::warn!("unknown key name {:?} in bindings", s);
                        return None;
                    }
                }
            }
        };
        Some(key)
    }

    /// Parse a list of key strings into KeyCodes, skipping unknown names
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().filter_map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            rotate: Self::parse_keys(&settings.keys.rotate),
            place: Self::parse_keys(&settings.keys.place),
            accelerate: Self::parse_keys(&settings.keys.accelerate),
            pause: Self::parse_keys(&settings.keys.pause),
            restart: Self::parse_keys(&settings.keys.restart),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            left_state: None,
            right_state: None,
            accelerate_state: None,
            bindings: KeyBindings::from_settings(settings),
            das: Duration::from_millis(settings.gameplay.das_ms),
            arr: Duration::from_millis(settings.gameplay.arr_ms),
        }
    }

    /// Handle a key press event - returns immediate actions
    pub fn key_down(&mut self, key: KeyEvent) -> Vec<Action> {
        self.key_down_at(key, Instant::now())
    }

    pub fn key_down_at(&mut self, key: KeyEvent, now: Instant) -> Vec<Action> {
        let mut actions = Vec::new();

        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            actions.push(Action::Quit);
            return actions;
        }

        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            match &mut self.left_state {
                Some(state) => state.last_seen = now,
                None => {
                    // New press - immediate action
                    actions.push(Action::MoveLeft);
                    self.left_state = Some(KeyPressState::new(now));
                }
            }
            // Cancel opposite direction
            self.right_state = None;
        } else if self.bindings.move_right.contains(&code) {
            match &mut self.right_state {
                Some(state) => state.last_seen = now,
                None => {
                    actions.push(Action::MoveRight);
                    self.right_state = Some(KeyPressState::new(now));
                }
            }
            self.left_state = None;
        } else if self.bindings.accelerate.contains(&code) {
            match &mut self.accelerate_state {
                Some(state) => state.last_seen = now,
                None => {
                    actions.push(Action::Accelerate(true));
                    self.accelerate_state = Some(KeyPressState::new(now));
                }
            }
        } else if self.bindings.rotate.contains(&code) {
            actions.push(Action::Rotate);
        } else if self.bindings.place.contains(&code) {
            actions.push(Action::Place);
        } else if self.bindings.pause.contains(&code) {
            actions.push(Action::Pause);
        } else if self.bindings.restart.contains(&code) {
            actions.push(Action::Restart);
        } else if self.bindings.quit.contains(&code) {
            actions.push(Action::Quit);
        }

        actions
    }

    /// Handle a key release event (may not be called on Linux)
    pub fn key_up(&mut self, key: KeyEvent) -> Vec<Action> {
        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            self.left_state = None;
        } else if self.bindings.move_right.contains(&code) {
            self.right_state = None;
        } else if self.bindings.accelerate.contains(&code) && self.accelerate_state.take().is_some() {
            return vec![Action::Accelerate(false)];
        }
        Vec::new()
    }

    /// Update held keys and return repeat actions (call every frame)
    pub fn update(&mut self) -> Vec<Action> {
        self.update_at(Instant::now())
    }

    pub fn update_at(&mut self, now: Instant) -> Vec<Action> {
        let mut actions = Vec::new();

        // Check for timed-out keys (no recent key event = released)
        let timed_out = |state: &Option<KeyPressState>| {
            state.as_ref().is_some_and(|s| s.released(now, KEY_TIMEOUT))
        };
        if timed_out(&self.left_state) {
            self.left_state = None;
        }
        if timed_out(&self.right_state) {
            self.right_state = None;
        }
        if self.accelerate_state.as_ref().is_some_and(|s| {
            let timeout = if s.repeated() { KEY_TIMEOUT } else { FIRST_REPEAT_TIMEOUT };
            s.released(now, timeout)
        }) {
            self.accelerate_state = None;
            actions.push(Action::Accelerate(false));
        }

        // Copy DAS/ARR values to avoid borrow issues
        let das = self.das;
        let arr = self.arr;

        if let Some(state) = &mut self.left_state {
            if process_das_arr(state, now, das, arr) {
                actions.push(Action::MoveLeft);
            }
        }

        if let Some(state) = &mut self.right_state {
            if process_das_arr(state, now, das, arr) {
                actions.push(Action::MoveRight);
            }
        }

        actions
    }

    /// Clear all held keys (useful for pause/resume and restarts).
    ///
    /// Returns `Accelerate(false)` if the accelerate key was held.
    pub fn clear(&mut self) -> Vec<Action> {
        self.left_state = None;
        self.right_state = None;
        match self.accelerate_state.take() {
            Some(_) => vec![Action::Accelerate(false)],
            None => Vec::new(),
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Process DAS/ARR logic for a key state, returns true if should trigger action
fn process_das_arr(state: &mut KeyPressState, now: Instant, das: Duration, arr: Duration) -> bool {
    let held_duration = now.duration_since(state.first_press);

    if held_duration >= das {
        if !state.das_triggered {
            // First trigger after DAS
            state.das_triggered = true;
            state.last_arr = Some(now);
            return true;
        } else if let Some(last) = state.last_arr {
            // Subsequent ARR triggers
            if now.duration_since(last) >= arr {
                state.last_arr = Some(now);
                return true;
            }
        }
    }

    false
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_default_bindings() {
        let mut input = InputHandler::new();
        let now = Instant::now();
        assert_eq!(input.key_down_at(press(KeyCode::Up), now), vec![Action::Rotate]);
        assert_eq!(input.key_down_at(press(KeyCode::Down), now), vec![Action::Place]);
        assert_eq!(input.key_down_at(press(KeyCode::Char('P')), now), vec![Action::Pause]);
        assert_eq!(input.key_down_at(press(KeyCode::Char('r')), now), vec![Action::Restart]);
        assert_eq!(input.key_down_at(press(KeyCode::Char('q')), now), vec![Action::Quit]);
        assert!(input.key_down_at(press(KeyCode::Char('z')), now).is_empty());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut input = InputHandler::new();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input.key_down(key), vec![Action::Quit]);
    }

    #[test]
    fn test_held_move_repeats_after_das() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        assert_eq!(input.key_down_at(press(KeyCode::Left), start), vec![Action::MoveLeft]);

        // Terminal auto-repeat keeps the key alive without new actions
        for step in 1..=4 {
            let t = start + ms(50 * step);
            assert!(input.key_down_at(press(KeyCode::Left), t).is_empty());
            assert!(input.update_at(t).is_empty());
        }
        let t = start + ms(200);
        assert!(input.key_down_at(press(KeyCode::Left), t).is_empty());
        assert_eq!(input.update_at(t), vec![Action::MoveLeft]);
    }

    #[test]
    fn test_opposite_direction_cancels() {
        let mut input = InputHandler::new();
        let now = Instant::now();
        input.key_down_at(press(KeyCode::Left), now);
        assert_eq!(input.key_down_at(press(KeyCode::Right), now), vec![Action::MoveRight]);
        assert_eq!(input.key_down_at(press(KeyCode::Left), now), vec![Action::MoveLeft]);
    }

    #[test]
    fn test_accelerate_released_on_timeout() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        assert_eq!(
            input.key_down_at(press(KeyCode::Char(' ')), start),
            vec![Action::Accelerate(true)]
        );
        assert!(input.key_down_at(press(KeyCode::Char(' ')), start + ms(30)).is_empty());
        assert!(input.update_at(start + ms(100)).is_empty());
        assert_eq!(input.update_at(start + ms(200)), vec![Action::Accelerate(false)]);
        assert!(input.update_at(start + ms(300)).is_empty());
    }

    #[test]
    fn test_accelerate_survives_terminal_repeat_delay() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        input.key_down_at(press(KeyCode::Char(' ')), start);

        // No repeat yet: the terminal has not started auto-repeat
        assert!(input.update_at(start + ms(400)).is_empty());
        assert!(input.key_down_at(press(KeyCode::Char(' ')), start + ms(450)).is_empty());
        assert!(input.update_at(start + ms(530)).is_empty());
        assert_eq!(input.update_at(start + ms(560)), vec![Action::Accelerate(false)]);
    }

    #[test]
    fn test_accelerate_tap_times_out() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        input.key_down_at(press(KeyCode::Char(' ')), start);
        assert!(input.update_at(start + ms(600)).is_empty());
        assert_eq!(input.update_at(start + ms(601)), vec![Action::Accelerate(false)]);
    }

    #[test]
    fn test_accelerate_released_on_key_up() {
        let mut input = InputHandler::new();
        input.key_down(press(KeyCode::Char(' ')));
        assert_eq!(input.key_up(press(KeyCode::Char(' '))), vec![Action::Accelerate(false)]);
        assert!(input.key_up(press(KeyCode::Char(' '))).is_empty());
    }

    #[test]
    fn test_clear_releases_accelerate() {
        let mut input = InputHandler::new();
        input.key_down(press(KeyCode::Char(' ')));
        assert_eq!(input.clear(), vec![Action::Accelerate(false)]);
        assert!(input.clear().is_empty());
    }

    #[test]
    fn test_custom_bindings() {
        let mut settings = Settings::default();
        settings.keys.rotate = vec!["x".to_string(), "bogus".to_string()];
        let bindings = KeyBindings::from_settings(&settings);
        assert_eq!(bindings.rotate, vec![KeyCode::Char('x')]);
    }
}
