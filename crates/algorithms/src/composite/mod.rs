//! Same-date tile grouping and mosaicking

mod group;
mod mosaic;

pub use group::{group_by_date, TileGroup};
pub use mosaic::{mosaic, Mosaic};
