//! Minesweeper on boards nested inside each other through portals, zoomable without end.

pub use board::*;
pub use builder::*;
pub use cell::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use input::*;
pub use level::*;
pub use neighbors::*;
pub use portal::*;
pub use rect::*;
pub use root::*;
pub use transform::*;
pub use types::*;
pub use visibility::*;

pub use glam::Vec2;

mod board;
mod builder;
mod cell;
mod config;
mod engine;
mod error;
mod generator;
mod input;
mod level;
mod neighbors;
mod portal;
mod rect;
mod root;
mod transform;
mod types;
mod visibility;
