//! A single-triangle OpenGL program, using [glow] for GL calls and
//! [glutin] + [winit] for the window and context.
//!
//! The program uploads one interleaved position+color triangle to a vertex
//! buffer (optionally with an element buffer), then redraws it every frame
//! until Escape is pressed or the window is closed.
//!
//! # Layers
//!
//! - [`backend`]: the GL calls used here, as the [`GraphicsBackend`] trait,
//!   implemented for a real context by [`GlowBackend`].
//! - [`mesh`] and [`shaders`]: GPU resource setup, generic over the backend.
//! - [`render`]: the per-frame command sequence.
//! - [`app`]: the render loop, driven through the [`app::Surface`] trait,
//!   and [`app::launch`], which wires in the real window from [`window`].
//!
//! Everything below [`window`] can run against a test double, so the setup
//! and frame sequences are unit-tested without a GPU.
//!
//! # Safety
//!
//! Constructing a [`GlowBackend`] requires a current OpenGL context and is
//! `unsafe`; all other APIs are safe.
//!
//! [glow]: https://docs.rs/glow
//! [glutin]: https://docs.rs/glutin
//! [winit]: https://docs.rs/winit

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod mesh;
pub mod render;
pub mod shaders;
pub mod types;
pub mod window;

#[cfg(test)]
mod mock;

pub use backend::{GlowBackend, GraphicsBackend};
pub use error::{GeometryError, GraphicsError};
