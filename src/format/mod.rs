//! Layout computation and document rendering.

mod layout;
mod render;

pub use render::render;
