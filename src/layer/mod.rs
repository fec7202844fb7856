mod renderer;
mod scene;
mod viewport;

pub use renderer::{LayerHandle, LayerRenderer};
pub use scene::{Scene, SceneViewport, ViewBounds};
pub use viewport::{LayerId, Viewport};

#[cfg(test)]
pub(crate) use viewport::recording;
