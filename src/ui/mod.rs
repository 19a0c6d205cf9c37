pub mod framebuffer;
pub mod input;
pub mod renderer;
pub mod sprites;
pub mod tilesheet;
