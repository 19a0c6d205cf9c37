pub mod ai;
pub mod collision;
pub mod entity;
pub mod geometry;
pub mod physics;
pub mod tile;
