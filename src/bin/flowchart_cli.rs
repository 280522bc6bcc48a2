//! Flowchart CLI - generate and export flowcharts from the terminal
//!
//! Drives the same studio the desktop app uses: the input goes to the
//! generation service, the result lands on a headless canvas, and the
//! requested formats are exported from there.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::{style, Emoji};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;

use flowchart_studio::export::json;
use flowchart_studio::{
    Command, ExportFormat, InputMode, Notice, Orientation, Studio, StudioConfig,
};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "+ ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");
static ARROW: Emoji<'_, '_> = Emoji("→ ", "-> ");
static INFO: Emoji<'_, '_> = Emoji("ℹ ", "i ");

#[derive(Parser)]
#[command(name = "flowchart-cli")]
#[command(author = "e421")]
#[command(version)]
#[command(about = "Flowchart CLI - Generate flowcharts from text, prompts or images")]
#[command(long_about = r#"
Flowchart CLI sends input to the flowchart generation service and exports
the resulting diagram.

Examples:
  flowchart-cli text "Start -> Process -> Decision -> End"
  flowchart-cli prompt "Create a user login process flowchart" -f png -f pdf
  flowchart-cli image whiteboard.jpg --orientation horizontal -f svg
  flowchart-cli render flowchart.json -f png --out ./diagrams
  flowchart-cli config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ~/.config/flowchart-studio/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Generation service URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(clap::Args)]
pub struct ExportArgs {
    /// Formats to export (repeatable)
    #[arg(short, long = "format", value_enum, default_values_t = [ExportFormat::Json])]
    pub formats: Vec<ExportFormat>,

    /// Output directory (default: configured export directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Re-layout before exporting: vertical or horizontal
    #[arg(long)]
    pub orientation: Option<Orientation>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate from structured text, e.g. "A -> B -> C"
    Text {
        text: String,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Generate from a natural-language description
    Prompt {
        prompt: String,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Generate from an image or PDF of a diagram
    Image {
        file: PathBuf,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Export a previously saved flowchart.json to other formats
    Render {
        file: PathBuf,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => StudioConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StudioConfig::load(),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    match cli.command {
        Commands::Text { text, export } => {
            cmd_generate(&config, InputMode::Text, Input::Text(text), &export)
        }
        Commands::Prompt { prompt, export } => {
            cmd_generate(&config, InputMode::Prompt, Input::Text(prompt), &export)
        }
        Commands::Image { file, export } => {
            cmd_generate(&config, InputMode::Image, Input::File(file), &export)
        }
        Commands::Render { file, export } => cmd_render(&config, &file, &export),
        Commands::Config => cmd_config(&config),
    }
}

enum Input {
    Text(String),
    File(PathBuf),
}

fn open_studio(config: &StudioConfig, export: &ExportArgs) -> Result<Studio> {
    let mut config = config.clone();
    if let Some(out) = &export.out {
        config.export.output_dir = out.clone();
    }
    Studio::from_config(&config).context("Failed to set up generation client")
}

fn cmd_generate(
    config: &StudioConfig,
    mode: InputMode,
    input: Input,
    export: &ExportArgs,
) -> Result<()> {
    let mut studio = open_studio(config, export)?;

    studio.submit(Command::SelectMode(mode));
    match input {
        Input::Text(text) => {
            studio.process();
            studio.input_mut().set_text(text);
        }
        Input::File(path) => {
            if !path.is_file() {
                bail!("{} is not a file", path.display());
            }
            studio.submit(Command::SelectFile(path));
            studio.process();
        }
    }

    if !studio.input().can_generate() {
        bail!("Nothing to generate from: input is empty");
    }

    println!(
        "{} Generating via {}",
        ARROW,
        style(&config.api.base_url).cyan()
    );

    studio.submit(Command::Generate);
    report(studio.process())?;

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for the generation service...");
    pb.enable_steady_tick(Duration::from_millis(100));
    studio.wait();
    pb.finish_and_clear();
    report(studio.process())?;

    export_graph(&mut studio, export)
}

fn cmd_render(config: &StudioConfig, file: &Path, export: &ExportArgs) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let graph = json::decode(&bytes)
        .with_context(|| format!("Invalid flowchart {}", file.display()))?;

    let mut studio = open_studio(config, export)?;
    // An imported graph takes the same path as a fresh generation result
    studio.submit(Command::GenerationFinished(Ok(graph)));
    report(studio.process())?;

    export_graph(&mut studio, export)
}

fn export_graph(studio: &mut Studio, export: &ExportArgs) -> Result<()> {
    if let Some(orientation) = export.orientation {
        if studio.canvas().orientation() != orientation {
            studio.submit(Command::ToggleOrientation);
        } else {
            // Already the current orientation; still apply its positions
            studio.submit_all([Command::ToggleOrientation, Command::ToggleOrientation]);
        }
        report(studio.process())?;
    }

    studio.submit_all(export.formats.iter().copied().map(Command::Export));
    report(studio.process())
}

/// Print notices; an alert fails the command
fn report(notices: Vec<Notice>) -> Result<()> {
    for notice in notices {
        match notice {
            Notice::Status(message) => println!("{} {}", INFO, message),
            Notice::Exported(path) => {
                println!("{} {}", CHECK, style(path.display()).green())
            }
            Notice::Alert(message) => {
                eprintln!("{} {}", CROSS, style(&message).red());
                bail!(message);
            }
        }
    }
    Ok(())
}

fn cmd_config(config: &StudioConfig) -> Result<()> {
    println!();
    println!(
        "{} {}",
        INFO,
        style(StudioConfig::config_path().display()).dim()
    );
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
