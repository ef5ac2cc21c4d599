//! Start-up configuration.
//!
//! Everything here is a compile-time default; the binaries only flip the
//! geometry variant and a couple of switches.

use crate::backend::Primitive;
use crate::geometry::Geometry;
use crate::shaders::ShaderSource;

/// Window width in screen coordinates.
pub const WIDTH: u32 = 800;
/// Window height in screen coordinates.
pub const HEIGHT: u32 = 600;
/// Window title.
pub const TITLE: &str = "LearnOpenGL";

/// Window creation parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// Title bar text.
    pub title: String,
    /// Inner width, logical pixels.
    pub width: u32,
    /// Inner height, logical pixels.
    pub height: u32,
    /// Whether the user may resize the window.
    pub resizable: bool,
    /// Requested OpenGL version (core profile).
    pub gl_version: (u8, u8),
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: TITLE.to_owned(),
            width: WIDTH,
            height: HEIGHT,
            resizable: false,
            gl_version: (3, 3),
        }
    }
}

/// Per-frame constants.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameConfig {
    /// `glClearColor` value.
    pub clear_color: [f32; 4],
    /// Value uploaded to [`offset_uniform`](Self::offset_uniform) each frame.
    pub offset: f32,
    /// Name of the float uniform receiving [`offset`](Self::offset).
    pub offset_uniform: String,
    /// Primitive assembly mode.
    pub primitive: Primitive,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.3, 0.3, 1.0],
            offset: 0.5,
            offset_uniform: "Offset".to_owned(),
            primitive: Primitive::Triangles,
        }
    }
}

/// Everything [`launch`](crate::app::launch) needs.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Window parameters.
    pub window: WindowConfig,
    /// Frame constants.
    pub frame: FrameConfig,
    /// Geometry to upload.
    pub geometry: Geometry,
    /// Shader source location.
    pub shaders: ShaderSource,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            frame: FrameConfig::default(),
            geometry: Geometry::triangle(),
            shaders: ShaderSource::Embedded,
        }
    }
}

impl AppConfig {
    /// The indexed variant: same triangle, drawn through an element buffer.
    pub fn indexed() -> Self {
        Self {
            geometry: Geometry::indexed_triangle(),
            ..Self::default()
        }
    }

    /// Apply the command-line switches shared by both binaries.
    ///
    /// `--line-loop` draws the outline only; `--shaders-from-disk` reads
    /// `shaders/shader.{vert,frag}` from the working directory instead of
    /// the embedded copies. Unknown arguments are logged and ignored.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            match arg.as_ref() {
                "--line-loop" => self.frame.primitive = Primitive::LineLoop,
                "--shaders-from-disk" => self.shaders = ShaderSource::files_in("shaders"),
                other => log::warn!("ignoring unknown argument {other:?}"),
            }
        }
        self
    }
}
