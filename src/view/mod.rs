// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;
pub mod mesh;
pub mod texture;

pub use render::{CubeRenderer, RenderState};
pub use gpu_init::GpuContext;
pub use texture::TextureImage;
