//! Garden planner session: palette, grid and the advice prompt

use anyhow::{bail, Result};

use super::grid::{CellPos, DragItem, GardenGrid};

pub const EMPTY_GARDEN_MESSAGE: &str =
    "Your garden is empty! Drag some plants from the palette onto the grid to get started.";
pub const SUGGESTIONS_FAILED_MESSAGE: &str =
    "Sorry, I couldn't generate suggestions at this time. Please try again.";

#[derive(Debug, Clone, Default)]
pub struct GardenPlanner {
    pub grid: GardenGrid,
    palette: Vec<String>,
    /// Last advice shown, cleared whenever new advice is requested
    pub suggestions: Option<String>,
}

impl GardenPlanner {
    /// Fresh planner with an empty grid and the given palette
    pub fn open(palette: Vec<String>) -> Self {
        Self {
            grid: GardenGrid::new(),
            palette,
            suggestions: None,
        }
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Add a plant to the palette; blank and duplicate names are ignored
    pub fn add_plant(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.palette.iter().any(|p| p == name) {
            return false;
        }
        self.palette.push(name.to_string());
        true
    }

    fn palette_item(&self, name: &str) -> Result<DragItem> {
        let name = name.trim();
        match self.palette.iter().find(|p| p.eq_ignore_ascii_case(name)) {
            Some(plant) => Ok(DragItem::Palette(plant.clone())),
            None => bail!("'{name}' is not in the palette. Add it with /garden add {name}"),
        }
    }

    /// Drop a palette plant onto a cell
    pub fn place(&mut self, name: &str, target: CellPos) -> Result<()> {
        let item = self.palette_item(name)?;
        self.grid.drop_on_cell(item, target);
        Ok(())
    }

    /// Drag a planted cell onto another cell
    pub fn move_cell(&mut self, from: CellPos, to: CellPos) -> Result<()> {
        let Some(item) = self.grid.pick_up(from) else {
            bail!("Nothing is planted at row {}, column {}", from.row() + 1, from.col() + 1);
        };
        self.grid.drop_on_cell(item, to);
        Ok(())
    }

    /// Drag a planted cell onto the trash
    pub fn trash(&mut self, from: CellPos) -> Result<()> {
        let Some(item) = self.grid.pick_up(from) else {
            bail!("Nothing is planted at row {}, column {}", from.row() + 1, from.col() + 1);
        };
        self.grid.drop_on_trash(item);
        Ok(())
    }

    /// Prompt asking for layout advice, or `None` when nothing is planted
    pub fn suggestion_prompt(&self) -> Option<String> {
        let plants = self.grid.plants();
        if plants.is_empty() {
            return None;
        }

        Some(format!(
            "You are an expert garden designer. I have created a garden layout on an 8x8 grid.\n\
             Please provide suggestions to improve it. Consider companion planting (good and bad neighbors),\n\
             and general placement advice. Assume the top of the grid is North.\n\n\
             My current plant list: {}\n\n\
             My current layout:\n{}\n\n\
             Provide actionable advice in a friendly tone. Use markdown for formatting (headings, lists, bold text).",
            plants.join(", "),
            self.grid.layout_text()
        ))
    }
}
