use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use glyphs_kerning::{Font, SourceSet};

pub mod kerning;
pub mod metrics;
pub mod race;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log per-glyph and per-master progress.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a value to every kerning pair involving the glyphs' groups.
    Adjust {
        /// UFO or Designspace to edit.
        #[arg(required = true)]
        font_path: PathBuf,

        /// Master name or id (default: the first master).
        #[arg(short, long)]
        master: Option<String>,

        /// Glyph names, separated by spaces or commas.
        #[arg(short, long)]
        glyphs: String,

        /// The value to add, e.g. 5 or -10.
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        /// Report what would change without saving.
        #[arg(long)]
        dry_run: bool,
    },
    /// Copy the kerning of one group name onto another.
    CopyGroups {
        /// UFO or Designspace to edit.
        #[arg(required = true)]
        font_path: PathBuf,

        /// `SOURCE=TARGET` group names, repeatable.
        #[arg(short, long = "pair", required = true)]
        pairs: Vec<String>,

        /// Master names or ids (default: all masters).
        #[arg(short, long)]
        master: Vec<String>,

        /// Report what would change without saving.
        #[arg(long)]
        dry_run: bool,
    },
    /// List base glyph anchors nothing attaches to.
    LostAnchors {
        #[arg(required = true)]
        font_path: PathBuf,
    },
    /// Copy sidebearings of the first master from one font to another.
    CopySidebearings {
        #[arg(required = true)]
        source_path: PathBuf,

        #[arg(required = true)]
        destination_path: PathBuf,

        /// Only these glyphs (default: all glyphs of the source).
        #[arg(short, long)]
        glyphs: Option<String>,

        /// Report what would change without saving.
        #[arg(long)]
        dry_run: bool,
    },
    /// Time glyph work from selection changes read one per line on stdin.
    /// Totals are stored in the glyph libs and carry over to the next round.
    Race {
        #[arg(required = true)]
        font_path: PathBuf,

        /// Start a new round: clear all stored glyph timers first.
        #[arg(long)]
        reset: bool,

        /// Do not store the totals.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Adjust {
            font_path,
            master,
            glyphs,
            value,
            dry_run,
        } => kerning::command_adjust(&font_path, master.as_deref(), &glyphs, &value, dry_run),
        Commands::CopyGroups {
            font_path,
            pairs,
            master,
            dry_run,
        } => kerning::command_copy_groups(&font_path, &pairs, &master, dry_run),
        Commands::LostAnchors { font_path } => metrics::command_lost_anchors(&font_path),
        Commands::CopySidebearings {
            source_path,
            destination_path,
            glyphs,
            dry_run,
        } => metrics::command_copy_sidebearings(
            &source_path,
            &destination_path,
            glyphs.as_deref(),
            dry_run,
        ),
        Commands::Race {
            font_path,
            reset,
            dry_run,
        } => race::command_race(&font_path, reset, dry_run),
    }
}

/// Load the UFO sources at `path` and the font model built from them.
fn load_font(path: &Path) -> anyhow::Result<(SourceSet, Font)> {
    let sources = SourceSet::load(path)
        .with_context(|| format!("Failed to load sources from {}", path.display()))?;
    let font = sources.font();
    log::info!(
        "{}: {} masters, {} glyphs",
        path.display(),
        font.font_master.len(),
        font.glyphs.len()
    );
    Ok((sources, font))
}

/// Write `font` back into `sources` and save them.
fn save_font(mut sources: SourceSet, font: &Font, path: &Path) -> anyhow::Result<()> {
    sources
        .apply(font)
        .with_context(|| format!("Failed to write changes into {}", path.display()))?;
    sources
        .save()
        .with_context(|| format!("Failed to save {}", path.display()))
}
