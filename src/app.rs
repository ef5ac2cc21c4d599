//! The render loop and the program entry point shared by both binaries.

use anyhow::{Context as _, Result};

use crate::backend::{GlowBackend, GraphicsBackend};
use crate::config::AppConfig;
use crate::input::{close_on_escape, WindowContext};
use crate::render::Renderer;
use crate::window::AppWindow;

/// The window side of the loop: event polling and presentation.
pub trait Surface {
    /// Drain pending platform events into `ctx`. Key callbacks run inline.
    fn poll_events(&mut self, ctx: &mut WindowContext);

    /// Present the frame just rendered.
    ///
    /// # Errors
    ///
    /// Fails if the platform cannot present (lost surface, lost context).
    fn swap_buffers(&mut self) -> Result<()>;
}

/// The two states of the render loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Frames are being produced.
    Running,
    /// The close flag was observed; no further frames.
    Terminating,
}

impl LoopState {
    /// The state implied by the context's close flag.
    pub fn observe(ctx: &WindowContext) -> Self {
        if ctx.should_close() {
            Self::Terminating
        } else {
            Self::Running
        }
    }
}

/// Run frames until the close flag is set. Returns the number of frames
/// presented.
///
/// The flag is checked once per iteration, before polling, so a close
/// requested during polling still lets the current frame finish.
///
/// # Errors
///
/// Propagates a failed buffer swap; the loop stops at that frame.
pub fn run_loop<B, S>(
    surface: &mut S,
    ctx: &mut WindowContext,
    renderer: &Renderer<B>,
) -> Result<u64>
where
    B: GraphicsBackend,
    S: Surface,
{
    let mut frames = 0;

    while LoopState::observe(ctx) == LoopState::Running {
        surface.poll_events(ctx);

        if let Some((width, height)) = ctx.take_resize() {
            log::debug!("framebuffer resized to {width}x{height}");
            renderer.resize(width, height);
        }

        renderer.render_frame();
        surface.swap_buffers()?;
        frames += 1;
    }

    Ok(frames)
}

/// Open the window, set up GL resources, run until closed, and release
/// everything.
///
/// # Errors
///
/// Window/context creation, shader or geometry setup, and buffer swap
/// failures, each with context attached.
pub fn launch(config: &AppConfig) -> Result<()> {
    let (mut window, gl) = AppWindow::open(&config.window).context("failed to open window")?;

    // SAFETY: `AppWindow::open` made the context current on this thread, and
    // `window` outlives every use of the backend below.
    let backend = unsafe { GlowBackend::new(gl) };
    let renderer = Renderer::new(backend, config).context("failed to set up GL resources")?;

    let (width, height) = window.framebuffer_size();
    renderer.resize(width, height);

    let mut ctx = WindowContext::new();
    ctx.set_key_callback(close_on_escape);

    log::info!(
        "rendering {} triangle at {width}x{height}",
        if renderer.mesh().is_indexed() {
            "indexed"
        } else {
            "non-indexed"
        }
    );

    let result = run_loop(&mut window, &mut ctx, &renderer);
    renderer.destroy();

    let frames = result?;
    log::info!("closed after {frames} frames");
    Ok(())
}
