use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub(crate) const DEFAULT_DESCRIPTION: &str = "A sunny meadow with rolling green hills";

#[derive(Parser, Debug)]
#[command(
    name = "spritecraft",
    about = "Pixel sprite editor with a side-scrolling world to test the sprites in",
    version
)]
pub(crate) struct Cli {
    /// Optional JSON file overriding world physics and layout constants
    #[arg(long, global = true)]
    pub world_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Open an image in the sprite editor
    Edit {
        /// PNG or JPEG to cut poses from
        image: PathBuf,

        /// World description used when the first background is generated
        #[arg(long, default_value = DEFAULT_DESCRIPTION)]
        description: String,

        /// Replace the image with a generated character sheet before editing
        #[arg(long)]
        sheet: bool,
    },
    /// Play a game exported with F6
    Play {
        /// Exported game JSON
        export: PathBuf,
    },
    /// Inspect and manage the saved-game store
    Saves {
        #[command(subcommand)]
        command: SavesCommand,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum SavesCommand {
    /// List saved games, newest last
    List,
    /// Print one saved game's metadata
    Show { id: String },
    /// Remove a saved game
    Delete { id: String },
    /// Play a saved game
    Play { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_defaults_description_and_sheet_flag() {
        let cli = Cli::try_parse_from(["spritecraft", "edit", "hero.png"]).expect("parse");
        match cli.command {
            Command::Edit {
                image,
                description,
                sheet,
            } => {
                assert_eq!(image, PathBuf::from("hero.png"));
                assert_eq!(description, DEFAULT_DESCRIPTION);
                assert!(!sheet);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.world_config.is_none());
    }

    #[test]
    fn world_config_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "spritecraft",
            "saves",
            "play",
            "1700000000000",
            "--world-config",
            "world.json",
        ])
        .expect("parse");
        assert_eq!(cli.world_config, Some(PathBuf::from("world.json")));
        assert!(matches!(
            cli.command,
            Command::Saves {
                command: SavesCommand::Play { ref id }
            } if id == "1700000000000"
        ));
    }

    #[test]
    fn saves_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["spritecraft", "saves"]).is_err());
        assert!(Cli::try_parse_from(["spritecraft", "saves", "delete"]).is_err());
    }
}
