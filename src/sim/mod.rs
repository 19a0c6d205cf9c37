pub mod event;
pub mod level;
pub mod plane;
pub mod runs;
pub mod step;
pub mod world;
