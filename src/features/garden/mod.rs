//! # Garden Planner Feature
//!
//! An 8x8 layout board seeded with the user's plants. Plants are dragged from
//! a palette onto cells, moved between cells, or thrown away, and the layout
//! can be sent off for companion-planting advice. Nothing here is persisted.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

pub mod grid;
pub mod planner;

pub use grid::{CellPos, DragItem, GardenGrid, GRID_SIZE};
pub use planner::{GardenPlanner, EMPTY_GARDEN_MESSAGE, SUGGESTIONS_FAILED_MESSAGE};
