use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::app::atelier::Choice;
use crate::core::taste::{ArtisticStyle, AspectRatio, MoodProfile};

/// `Sentience` - learns your visual taste one A/B round at a time.
#[derive(Parser, Debug)]
#[command(name = "sentience")]
#[command(version)]
#[command(about = "Adaptive A/B quote-image studio.", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the next A/B pair as JSON without generating anything
    Suggest {
        /// Seed the strategy draw for a reproducible pair
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate both options, pick one, and learn from it
    Round {
        /// Quote to set on both options
        #[arg(short, long)]
        quote: Option<String>,

        /// Scene description for the background
        #[arg(short, long)]
        scene: Option<String>,

        /// Subject to place in the image
        #[arg(long)]
        subject: Option<String>,

        /// Output frame (1:1, 16:9, 9:16)
        #[arg(short, long)]
        aspect: Option<AspectRatio>,

        /// Atmosphere preset (solace, lustre, intimacy, vanguard, noir, spirit, drift)
        #[arg(short, long)]
        mood: Option<MoodProfile>,

        /// Pick without prompting
        #[arg(short, long, value_enum)]
        choice: Option<Choice>,

        /// Seed the strategy draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Make a single image in a chosen style and keep it, without learning
    Create {
        /// Look of the image (obsidian, ethereal, raw, moody_atmosphere, lofi_still)
        #[arg(long, default_value_t = ArtisticStyle::default())]
        style: ArtisticStyle,

        /// Atmosphere preset (solace, lustre, intimacy, vanguard, noir, spirit, drift)
        #[arg(short, long, default_value_t = MoodProfile::default())]
        mood: MoodProfile,

        /// Subject to place in the image
        #[arg(long)]
        subject: Option<String>,

        /// Quote to lay over the image; drafted when omitted
        #[arg(short, long)]
        quote: Option<String>,

        /// Output frame (1:1, 16:9, 9:16)
        #[arg(short, long, default_value_t = AspectRatio::default())]
        aspect: AspectRatio,
    },

    /// Show learned preferences
    Status,

    /// Manage kept images
    Gallery {
        #[command(subcommand)]
        gallery_command: GalleryCommands,
    },

    /// Draft a quote for a scene
    Draft {
        /// Scene to write about
        scene: String,
    },

    /// Polish text into a short quote
    Refine {
        /// Text to refine
        text: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum GalleryCommands {
    /// List kept images, newest first
    List,
    /// Forget a kept image
    Remove {
        /// Entry id
        id: Uuid,
    },
}
