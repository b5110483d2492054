use std::collections::HashSet;
use glam::Vec2;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

/// Input state sampled once per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Last known cursor position in window pixels, origin top-left.
    pub pointer_position: Option<Vec2>,
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
    /// Wheel lines since the previous snapshot, positive away from the user.
    pub scroll_delta: f32,
    /// Cursor movement while the middle button was held, since the previous snapshot.
    pub drag_delta: Vec2,
    pub keys: HashSet<KeyCode>,
}

/// Accumulates winit window events between frames.
#[derive(Debug, Default)]
pub struct InputManager {
    current: InputSnapshot,
}

impl InputManager {
    pub fn new() -> InputManager {
        InputManager::default()
    }

    pub fn manage_input(&mut self, event: &WindowEvent, event_loop: &ActiveEventLoop) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if *code == KeyCode::Escape && key_state.is_pressed() {
                    event_loop.exit();
                }
                self.on_key(*code, key_state.is_pressed());
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.current.pointer_position = None,
            WindowEvent::MouseInput { state, button, .. } => self.on_button(*button, *state),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                self.on_scroll(lines);
            }
            _ => {}
        }
    }

    pub fn on_cursor_moved(&mut self, position: Vec2) {
        if self.current.middle {
            if let Some(previous) = self.current.pointer_position {
                self.current.drag_delta += position - previous;
            }
        }
        self.current.pointer_position = Some(position);
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let pressed = state.is_pressed();
        match button {
            MouseButton::Left => self.current.primary = pressed,
            MouseButton::Right => self.current.secondary = pressed,
            MouseButton::Middle => self.current.middle = pressed,
            _ => {}
        }
    }

    pub fn on_scroll(&mut self, lines: f32) {
        self.current.scroll_delta += lines;
    }

    pub fn on_key(&mut self, code: KeyCode, pressed: bool) {
        if pressed {
            self.current.keys.insert(code);
        } else {
            self.current.keys.remove(&code);
        }
    }

    /// Returns the state for this frame and starts accumulating the next
    /// frame's scroll and drag from zero. Held buttons and keys carry over.
    pub fn take_snapshot(&mut self) -> InputSnapshot {
        let snapshot = self.current.clone();
        self.current.scroll_delta = 0.0;
        self.current.drag_delta = Vec2::ZERO;
        snapshot
    }
}
