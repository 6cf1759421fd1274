//! Garden planner command handler
//!
//! Handles: garden (open, add, place, move, trash, show, suggest)

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandReply, SlashCommandHandler};
use crate::commands::invocation::CommandInvocation;
use crate::commands::render::render_garden;
use crate::features::garden::{CellPos, GRID_SIZE};

const USAGE: &str = "/garden open | add <plant> | place <row> <col> <plant> | move <row> <col> <row> <col> | trash <row> <col> | show | suggest";

/// Parse a 1-based `<row> <col>` pair starting at argument `at`
fn cell_at(invocation: &CommandInvocation, at: usize) -> Result<CellPos> {
    let coordinate = |i: usize| -> Result<usize> {
        invocation
            .arg(i)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| (1..=GRID_SIZE).contains(n))
            .map(|n| n - 1)
            .ok_or_else(|| anyhow!("Rows and columns are numbers from 1 to {GRID_SIZE}"))
    };
    CellPos::new(coordinate(at)?, coordinate(at + 1)?)
}

pub struct GardenHandler;

#[async_trait]
impl SlashCommandHandler for GardenHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["garden"]
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("/garden open", "Open the 8x8 garden planner with your plants"),
            ("/garden add <plant>", "Add a plant to the palette"),
            ("/garden place <row> <col> <plant>", "Plant a palette plant in a cell"),
            ("/garden move <row> <col> <row> <col>", "Move a planted cell"),
            ("/garden trash <row> <col>", "Clear a cell"),
            ("/garden show | suggest", "Show the board or ask for layout advice"),
        ]
    }

    async fn handle(&self, ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
        let assistant = &ctx.assistant;
        let subcommand = invocation.arg(0).ok_or_else(|| anyhow!("Usage: {USAGE}"))?;

        let planner = match subcommand {
            "open" => assistant.open_garden().await,
            "show" => assistant
                .garden()
                .await
                .ok_or_else(|| anyhow!("The garden planner is not open. Start with /garden open"))?,
            "add" => {
                let name = invocation.rest(1).ok_or_else(|| anyhow!("Usage: /garden add <plant>"))?;
                let (added, planner) = assistant.with_garden(|p| Ok(p.add_plant(&name))).await?;
                if !added {
                    return Ok(CommandReply::text(format!("{name} is already in the palette.")));
                }
                planner
            }
            "place" => {
                let cell = cell_at(invocation, 1)?;
                let name = invocation
                    .rest(3)
                    .ok_or_else(|| anyhow!("Usage: /garden place <row> <col> <plant>"))?;
                assistant.with_garden(|p| p.place(&name, cell)).await?.1
            }
            "move" => {
                let from = cell_at(invocation, 1)?;
                let to = cell_at(invocation, 3)?;
                assistant.with_garden(|p| p.move_cell(from, to)).await?.1
            }
            "trash" => {
                let cell = cell_at(invocation, 1)?;
                assistant.with_garden(|p| p.trash(cell)).await?.1
            }
            "suggest" => {
                let advice = assistant.garden_suggestions().await?;
                return Ok(CommandReply::text(format!("💡 {advice}")));
            }
            other => return Err(anyhow!("Unknown garden action '{other}'. Usage: {USAGE}")),
        };

        Ok(CommandReply::text(render_garden(&planner)))
    }
}
