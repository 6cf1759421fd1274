//! Fixed-size garden grid and drag-and-drop semantics

use anyhow::{bail, Result};

pub const GRID_SIZE: usize = 8;

/// 0-based cell coordinates, always inside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPos {
    row: usize,
    col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            bail!("Cell ({row}, {col}) is outside the {GRID_SIZE}x{GRID_SIZE} grid");
        }
        Ok(Self { row, col })
    }

    pub fn row(self) -> usize {
        self.row
    }

    pub fn col(self) -> usize {
        self.col
    }
}

/// What is being dragged: a plant from the palette, or the contents of a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragItem {
    Palette(String),
    Cell { plant: String, from: CellPos },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GardenGrid {
    cells: [[Option<String>; GRID_SIZE]; GRID_SIZE],
}

impl GardenGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: CellPos) -> Option<&str> {
        self.cells[pos.row][pos.col].as_deref()
    }

    /// Start dragging whatever occupies `pos`
    pub fn pick_up(&self, pos: CellPos) -> Option<DragItem> {
        self.get(pos).map(|plant| DragItem::Cell {
            plant: plant.to_string(),
            from: pos,
        })
    }

    /// Drop onto a cell, overwriting it; a dragged cell is cleared first
    pub fn drop_on_cell(&mut self, item: DragItem, target: CellPos) {
        let plant = match item {
            DragItem::Palette(plant) => plant,
            DragItem::Cell { plant, from } => {
                self.cells[from.row][from.col] = None;
                plant
            }
        };
        self.cells[target.row][target.col] = Some(plant);
    }

    /// Drop onto the trash; palette items are left alone
    pub fn drop_on_trash(&mut self, item: DragItem) {
        if let DragItem::Cell { from, .. } = item {
            self.cells[from.row][from.col] = None;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    /// Distinct plants on the grid in row-major first-seen order
    pub fn plants(&self) -> Vec<String> {
        let mut plants: Vec<String> = Vec::new();
        for plant in self.cells.iter().flatten().flatten() {
            if !plants.contains(plant) {
                plants.push(plant.clone());
            }
        }
        plants
    }

    /// Row-per-line layout with `empty` for vacant cells
    pub fn layout_text(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_deref().unwrap_or("empty"))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Compact board for the terminal, using the first letters of each plant
    pub fn render(&self) -> String {
        let mut out = String::from("    ");
        for col in 0..GRID_SIZE {
            out.push_str(&format!("{:<4}", col + 1));
        }
        out.push('\n');

        for (r, row) in self.cells.iter().enumerate() {
            out.push_str(&format!("{:<4}", r + 1));
            for cell in row {
                let label = match cell {
                    Some(plant) => plant.chars().take(3).collect::<String>(),
                    None => ".".to_string(),
                };
                out.push_str(&format!("{label:<4}"));
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}
