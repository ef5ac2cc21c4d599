//! Keyboard input and the per-window context that replaces GLFW's global
//! "should close" flag and key callback.
//!
//! The window layer translates platform events into [`KeyInput`] and hands
//! them to [`WindowContext::dispatch_key`], which runs the registered
//! callback synchronously against the context's [`WindowState`].

use std::fmt;

use winit::keyboard::{KeyCode, PhysicalKey};

/// What happened to the key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// The key went down.
    Press,
    /// The key is held and the platform emitted an auto-repeat.
    Repeat,
    /// The key went up.
    Release,
}

/// Modifier keys held during a key event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Either shift key.
    pub shift: bool,
    /// Either control key.
    pub control: bool,
    /// Either alt / option key.
    pub alt: bool,
    /// Either super / command / windows key.
    pub super_key: bool,
}

impl From<winit::keyboard::ModifiersState> for Modifiers {
    fn from(state: winit::keyboard::ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            control: state.control_key(),
            alt: state.alt_key(),
            super_key: state.super_key(),
        }
    }
}

/// One key event: `(key, scancode, action, mods)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyInput {
    /// Layout-independent key.
    pub key: PhysicalKey,
    /// Platform scancode, when the platform exposes one.
    pub scancode: Option<u32>,
    /// Press, repeat or release.
    pub action: Action,
    /// Modifiers held at the time.
    pub mods: Modifiers,
}

impl KeyInput {
    /// A key event with no scancode and no modifiers.
    pub fn new(key: KeyCode, action: Action) -> Self {
        Self {
            key: PhysicalKey::Code(key),
            scancode: None,
            action,
            mods: Modifiers::default(),
        }
    }

    /// Whether this event is `key` going down (repeats excluded).
    pub fn is_press_of(&self, key: KeyCode) -> bool {
        self.action == Action::Press && self.key == PhysicalKey::Code(key)
    }
}

/// State a key callback is allowed to touch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowState {
    should_close: bool,
}

impl WindowState {
    /// Whether the window has been asked to close.
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Set or clear the close request.
    pub fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }
}

/// Callback invoked for every key event.
pub type KeyCallback = Box<dyn FnMut(&mut WindowState, &KeyInput)>;

/// Explicit window context: the close flag, a pending framebuffer resize,
/// and the key callback.
#[derive(Default)]
pub struct WindowContext {
    state: WindowState,
    pending_resize: Option<(u32, u32)>,
    key_callback: Option<KeyCallback>,
}

impl WindowContext {
    /// A context with the close flag cleared and no callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the key callback, replacing any previous one.
    pub fn set_key_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut WindowState, &KeyInput) + 'static,
    {
        self.key_callback = Some(Box::new(callback));
    }

    /// Run the key callback, if any, for `input`.
    pub fn dispatch_key(&mut self, input: &KeyInput) {
        if let Some(callback) = self.key_callback.as_mut() {
            callback(&mut self.state, input);
        }
    }

    /// Whether the window has been asked to close.
    pub fn should_close(&self) -> bool {
        self.state.should_close()
    }

    /// Set or clear the close request.
    pub fn set_should_close(&mut self, value: bool) {
        self.state.set_should_close(value);
    }

    /// Record a new framebuffer size. Zero-sized (minimized) frames are
    /// ignored.
    pub fn notify_resize(&mut self, width: u32, height: u32) {
        if width != 0 && height != 0 {
            self.pending_resize = Some((width, height));
        }
    }

    /// Take the most recent unhandled framebuffer size.
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.pending_resize.take()
    }
}

impl fmt::Debug for WindowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowContext")
            .field("state", &self.state)
            .field("pending_resize", &self.pending_resize)
            .field("key_callback", &self.key_callback.is_some())
            .finish()
    }
}

/// The default key callback: log the key, and request close on Escape.
pub fn close_on_escape(state: &mut WindowState, input: &KeyInput) {
    log::debug!("key pressed: {:?} ({:?})", input.key, input.action);
    if input.is_press_of(KeyCode::Escape) {
        state.set_should_close(true);
    }
}
