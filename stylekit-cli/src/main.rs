//! stylekit CLI
//!
//! Renders resolved box styles, as a layout engine would hand them over,
//! into CSS declaration blocks. Useful for checking export output without
//! running a full report export.
//!
//! - stylekit render boxes.json            # one `selector: css` line per box
//! - stylekit render --pretty boxes.json   # `selector { ... }` blocks
//! - stylekit keys                         # list the built-in style keys

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Deserialize;
use stylekit_common::warning::clear_warnings;
use stylekit_css::{
    DefaultStyleBuilder, ExportConfig, KeyRegistry, ResolvedStyle, StyleBuilder,
    StyleBuilderFactory,
};

/// stylekit: style-key cascade and CSS serialization for HTML export
#[derive(Parser, Debug)]
#[command(name = "stylekit")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Render every box on one line
    stylekit render boxes.json

    # Pretty blocks, whole-point lengths for Safari
    stylekit render --pretty --safari-length-hack boxes.json

    # Read flags from an exported property store
    stylekit render --config report.properties.json boxes.json
"#)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON array of boxes as CSS
    Render(RenderArgs),
    /// List the registered style keys
    Keys,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// JSON file with `[{ "selector", "style", "inherit" }, ...]`
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// One declaration per line inside `selector { ... }` blocks
    #[arg(long)]
    pretty: bool,

    /// Round every non-zero box length to a whole point
    #[arg(long)]
    safari_length_hack: bool,

    /// Emit `pre-wrap` instead of `pre` for preserved whitespace
    #[arg(long)]
    pre_wrap: bool,

    /// Emit rounded border corners
    #[arg(long)]
    round_corners: bool,

    /// JSON object of `stylekit.html.*` properties; flags above override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// One box of the input document.
#[derive(Debug, Deserialize)]
struct BoxInput {
    selector: String,
    #[serde(default)]
    style: ResolvedStyle,
    /// Drop inherited declarations the previous box already carries.
    #[serde(default)]
    inherit: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render(args) => render(&args),
        Command::Keys => {
            list_keys();
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Merge the property file with command-line flags.
fn load_config(args: &RenderArgs) -> Result<ExportConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let properties: HashMap<String, String> = serde_json::from_str(&text)
                .with_context(|| format!("config {} is not a JSON object of strings", path.display()))?;
            ExportConfig::from_properties(&properties)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ExportConfig::default(),
    };
    config.safari_length_hack |= args.safari_length_hack;
    config.use_whitespace_pre_wrap |= args.pre_wrap;
    config.enable_round_border_corner |= args.round_corners;
    log::debug!("export config: {config:?}");
    Ok(config)
}

fn load_boxes(path: &Path) -> Result<Vec<BoxInput>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn render(args: &RenderArgs) -> Result<()> {
    let config = load_config(args)?;
    let boxes = load_boxes(&args.input)?;
    let registry = KeyRegistry::shared();
    let factory = StyleBuilderFactory::new(config);

    let color = io::stdout().is_terminal();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    // Unfiltered rendering of the previous box, reused across boxes.
    let mut previous: DefaultStyleBuilder = factory.create_builder(Arc::clone(&registry));
    let mut has_previous = false;

    for input in &boxes {
        let parent = (input.inherit && has_previous).then(|| previous.to_array());
        let mut builder = factory.create_filtered_builder(Arc::clone(&registry), parent);
        factory.produce(&mut builder, &input.style);

        write_selector(&mut out, &input.selector, color)?;
        if args.pretty {
            write!(out, " {{")?;
            builder.print(&mut out, false)?;
            writeln!(out, "\n}}")?;
        } else {
            write!(out, ": ")?;
            builder.print(&mut out, true)?;
            writeln!(out)?;
        }

        previous.clear();
        factory.produce(&mut previous, &input.style);
        has_previous = true;
    }

    out.flush().context("failed to flush output")?;
    log::info!("rendered {} boxes", boxes.len());
    clear_warnings();
    Ok(())
}

fn write_selector(out: &mut impl Write, selector: &str, color: bool) -> io::Result<()> {
    if color {
        write!(out, "{}", selector.cyan().bold())
    } else {
        write!(out, "{selector}")
    }
}

fn list_keys() {
    let color = io::stdout().is_terminal();
    let registry = KeyRegistry::shared();
    for key in registry.all_keys() {
        let mut flags = Vec::new();
        if key.is_inherited() {
            flags.push("inherited");
        }
        if key.is_transient() {
            flags.push("transient");
        }
        let flags = flags.join(", ");
        if color {
            println!("{:>3}  {}  {}", key.index().0, key.name(), flags.dimmed());
        } else {
            println!("{:>3}  {}  {flags}", key.index().0, key.name());
        }
    }
}
