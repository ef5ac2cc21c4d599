//! The OS window and its OpenGL context.
//!
//! `winit` owns the window and event loop; `glutin` creates a core-profile
//! context and a window surface for it. Instead of handing control to
//! `EventLoop::run_app`, the loop is pumped once per frame with a zero
//! timeout, so the render loop stays a plain `while` loop.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context as _, Result};
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{
    GlSurface, Surface as GlutinSurface, SurfaceAttributesBuilder, SwapInterval, WindowSurface,
};
use glutin_winit::{DisplayBuilder, GlWindow as _};
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::ModifiersState;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::platform::scancode::PhysicalKeyExtScancode;
use winit::window::{Window, WindowId};

use crate::app::Surface;
use crate::config::WindowConfig;
use crate::input::{Action, KeyInput, WindowContext};

/// A window with a current OpenGL context.
pub struct AppWindow {
    // Declaration order is drop order: GL objects go before the window.
    gl_surface: GlutinSurface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
    event_loop: EventLoop<()>,
    modifiers: ModifiersState,
}

impl AppWindow {
    /// Create the window, make an OpenGL context current on it, and load
    /// the GL function pointers.
    ///
    /// # Errors
    ///
    /// Fails if the event loop, window, context or surface cannot be
    /// created, or the context cannot be made current.
    ///
    /// # Panics
    ///
    /// Panics if the display offers no GL configuration at all.
    pub fn open(config: &WindowConfig) -> Result<(Self, Arc<glow::Context>)> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        let attributes = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(config.resizable);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(&event_loop, ConfigTemplateBuilder::new(), pick_config)
            .map_err(|err| anyhow!("failed to create window: {err}"))?;
        let window = window.context("display builder returned no window")?;

        let raw_window_handle = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();

        let (major, minor) = config.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();

        // SAFETY: the raw window handle belongs to `window`, which is kept
        // alive in the returned `AppWindow` for as long as the context.
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .with_context(|| format!("failed to create OpenGL {major}.{minor} core context"))?;

        let surface_attributes = window
            .build_surface_attributes(SurfaceAttributesBuilder::<WindowSurface>::new())
            .context("failed to describe window surface")?;
        // SAFETY: as above, the surface never outlives `window`.
        let gl_surface =
            unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
                .context("failed to create window surface")?;

        let gl_context = not_current
            .make_current(&gl_surface)
            .context("failed to make OpenGL context current")?;

        if let Err(err) =
            gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
        {
            log::warn!("could not enable vsync: {err}");
        }

        // SAFETY: the context was made current on this thread just above.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };

        log::debug!(
            "created {}x{} window with {} samples/pixel",
            config.width,
            config.height,
            gl_config.num_samples()
        );

        Ok((
            Self {
                gl_surface,
                gl_context,
                window,
                event_loop,
                modifiers: ModifiersState::empty(),
            },
            Arc::new(gl),
        ))
    }

    /// Framebuffer size in physical pixels.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }
}

impl Surface for AppWindow {
    fn poll_events(&mut self, ctx: &mut WindowContext) {
        let mut sink = EventSink {
            window_id: self.window.id(),
            ctx,
            modifiers: &mut self.modifiers,
            gl_surface: &self.gl_surface,
            gl_context: &self.gl_context,
        };

        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut sink)
        {
            log::debug!("event loop exited with code {code}");
            sink.ctx.set_should_close(true);
        }
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.window.pre_present_notify();
        self.gl_surface
            .swap_buffers(&self.gl_context)
            .context("failed to swap buffers")
    }
}

/// Pick the config with the most MSAA samples.
///
/// glutin requires the picker to return a config, so an empty list can only
/// panic here. This is the one panic on the window-creation path; every other
/// failure is returned from [`AppWindow::open`].
#[allow(
    clippy::expect_used,
    reason = "glutin's config picker cannot return an error"
)]
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| {
            if config.num_samples() > best.num_samples() {
                config
            } else {
                best
            }
        })
        .expect("display offered no OpenGL configs")
}

/// Routes one pump's worth of window events into the [`WindowContext`].
struct EventSink<'a> {
    window_id: WindowId,
    ctx: &'a mut WindowContext,
    modifiers: &'a mut ModifiersState,
    gl_surface: &'a GlutinSurface<WindowSurface>,
    gl_context: &'a PossiblyCurrentContext,
}

impl ApplicationHandler for EventSink<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if window_id != self.window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.ctx.set_should_close(true),
            WindowEvent::Resized(size) => {
                // Some platforms (EGL: Wayland, macOS) need the surface
                // resized explicitly; elsewhere this is a no-op.
                if let (Some(width), Some(height)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                {
                    self.gl_surface.resize(self.gl_context, width, height);
                }
                self.ctx.notify_resize(size.width, size.height);
            }
            WindowEvent::ModifiersChanged(modifiers) => *self.modifiers = modifiers.state(),
            WindowEvent::KeyboardInput { event, .. } => {
                let input = translate_key(&event, *self.modifiers);
                self.ctx.dispatch_key(&input);
            }
            _ => {}
        }
    }
}

fn translate_key(event: &KeyEvent, modifiers: ModifiersState) -> KeyInput {
    let action = match (event.state, event.repeat) {
        (ElementState::Released, _) => Action::Release,
        (ElementState::Pressed, true) => Action::Repeat,
        (ElementState::Pressed, false) => Action::Press,
    };

    KeyInput {
        key: event.physical_key,
        scancode: event.physical_key.to_scancode(),
        action,
        mods: modifiers.into(),
    }
}
