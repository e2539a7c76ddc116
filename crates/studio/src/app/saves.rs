use std::io::{self, Write};

use sprite_engine::{GameBundle, GameStore, SavedGame, POSE_COUNT};

use crate::cli::SavesCommand;

use super::StudioError;

const DESCRIPTION_PREVIEW_CHARS: usize = 60;

/// Runs a `saves` subcommand. `saves play` hands the game back to be opened in a window.
pub(crate) fn run_saves(
    store: &GameStore,
    command: SavesCommand,
    out: &mut impl Write,
) -> Result<Option<GameBundle>, StudioError> {
    match command {
        SavesCommand::List => {
            write_listing(out, &store.list())?;
            Ok(None)
        }
        SavesCommand::Show { id } => {
            let game = find(store, &id)?;
            write_details(out, &game)?;
            Ok(None)
        }
        SavesCommand::Delete { id } => {
            if !store.delete(&id)? {
                return Err(StudioError::SavedGameNotFound { id });
            }
            writeln!(out, "deleted {id}")?;
            Ok(None)
        }
        SavesCommand::Play { id } => Ok(Some(find(store, &id)?.to_bundle())),
    }
}

fn find(store: &GameStore, id: &str) -> Result<SavedGame, StudioError> {
    store
        .get(id)
        .ok_or_else(|| StudioError::SavedGameNotFound { id: id.to_string() })
}

fn write_listing(out: &mut impl Write, games: &[SavedGame]) -> io::Result<()> {
    if games.is_empty() {
        return writeln!(out, "no saved games");
    }
    for game in games {
        writeln!(
            out,
            "{}  {}  {}  {}",
            game.id,
            game.created_at,
            game.name,
            preview(&game.description)
        )?;
    }
    Ok(())
}

fn write_details(out: &mut impl Write, game: &SavedGame) -> io::Result<()> {
    let background = game.background_image.buffer();
    writeln!(out, "id:          {}", game.id)?;
    writeln!(out, "name:        {}", game.name)?;
    writeln!(out, "created:     {}", game.created_at)?;
    writeln!(out, "description: {}", game.description)?;
    writeln!(
        out,
        "background:  {}x{}",
        background.width(),
        background.height()
    )?;
    writeln!(out, "poses:       {}/{POSE_COUNT}", game.pose_set.len())?;
    for (pose, asset) in game.pose_set.iter() {
        let buffer = asset.buffer();
        writeln!(out, "  {pose}: {}x{}", buffer.width(), buffer.height())?;
    }
    Ok(())
}

fn preview(description: &str) -> String {
    let mut chars = description.chars();
    let head: String = chars.by_ref().take(DESCRIPTION_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
