use std::io::Write;
use std::path::{Path, PathBuf};

use abstractor_core::ElementDocument;
use abstractor_core::config_file::{self, ConfigFile};
use abstractor_core::document::{load_element_document, load_raw_document, write_json};
use abstractor_layout::{LayoutConfig, LayoutConfigBuilder, Normalizer, build_signature_catalog};
use abstractor_parsing::{AbstractParser, ParsingConfigBuilder};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};

mod output;

use output::ColorMode;

/// Abstract book extractor - Turn positioned PDF tokens into structured abstracts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Style profile / config TOML (replaces the config file cascade)
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
struct Io {
    /// Input JSON document
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON document
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a raw token dump into signature-tagged spans in reading order
    Normalize {
        #[command(flatten)]
        io: Io,

        /// Keep every token as its own span
        #[arg(long)]
        no_merge: bool,

        /// Vertical tolerance for merging consecutive runs
        #[arg(long)]
        y_tolerance: Option<f64>,
    },

    /// Tag elements from their signature and text alone
    Pass1 {
        #[command(flatten)]
        io: Io,
    },

    /// Drop running headers and page footers
    Clean {
        #[command(flatten)]
        io: Io,
    },

    /// Classify title, authors, institutions and sections per abstract
    Pass2 {
        #[command(flatten)]
        io: Io,
    },

    /// Aggregate classified elements into abstract records
    Pass3 {
        #[command(flatten)]
        io: Io,
    },

    /// Run every stage from a raw token dump to abstract records
    Run {
        #[command(flatten)]
        io: Io,

        /// Drop headers and footers before the contextual pass
        #[arg(long)]
        strip_headers: bool,

        /// Write each intermediate document into this directory
        #[arg(long)]
        keep_intermediate: Option<PathBuf>,
    },

    /// Show the most frequent typographic signatures of a normalized document
    Signatures {
        /// Normalized JSON document
        #[arg(short, long)]
        input: PathBuf,

        /// Number of signatures to list
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the platform config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let color = ColorMode(!cli.no_color);
    let settings = load_settings(cli.profile)?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Normalize {
            io,
            no_merge,
            y_tolerance,
        } => {
            let layout = layout_config(&settings, no_merge, y_tolerance)?;
            let raw = load_raw_document(&io.input)
                .with_context(|| format!("reading {}", io.input.display()))?;
            let normalized = Normalizer::with_config(layout).normalize(raw);
            save(&io.output, &normalized.document)?;
            output::print_normalize_summary(&mut out, &normalized.stats, color)?;
        }
        Command::Pass1 { io } => {
            let parser = parser(&settings)?;
            let mut doc = load_elements(&io.input)?;
            let stats = parser.classify_deterministic(&mut doc);
            save(&io.output, &doc)?;
            output::print_deterministic_summary(&mut out, &stats, color)?;
        }
        Command::Clean { io } => {
            let parser = parser(&settings)?;
            let mut doc = load_elements(&io.input)?;
            let removed = parser.strip_headers_footers(&mut doc);
            save(&io.output, &doc)?;
            output::print_clean_summary(&mut out, removed, doc.elements.len(), color)?;
        }
        Command::Pass2 { io } => {
            let parser = parser(&settings)?;
            let mut doc = load_elements(&io.input)?;
            let report = parser
                .classify_contextual(&mut doc)
                .with_context(|| format!("contextual pass on {}", io.input.display()))?;
            save(&io.output, &doc)?;
            output::print_contextual_summary(&mut out, &report, color)?;
        }
        Command::Pass3 { io } => {
            let parser = parser(&settings)?;
            let doc = load_elements(&io.input)?;
            let abstracts = parser
                .aggregate(&doc)
                .with_context(|| format!("aggregating {}", io.input.display()))?;
            save(&io.output, &abstracts)?;
            output::print_aggregate_summary(&mut out, &abstracts, color)?;
        }
        Command::Run {
            io,
            strip_headers,
            keep_intermediate,
        } => {
            run_all(
                &settings,
                &io,
                strip_headers,
                keep_intermediate.as_deref(),
                &mut out,
                color,
            )?;
        }
        Command::Signatures { input, limit } => {
            let doc = load_elements(&input)?;
            let catalog = if doc.signature_catalog.is_empty() {
                build_signature_catalog(&doc.elements)
            } else {
                doc.signature_catalog
            };
            output::print_signatures(&mut out, &catalog, limit, color)?;
        }
        Command::Config { save } => {
            write!(out, "{}", config_file::to_toml(&settings)?)?;
            if save {
                let path = config_file::save_config(&settings)?;
                eprintln!("Saved configuration to {}", path.display());
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve configuration: --profile > ABSTRACTOR_PROFILE > config file cascade.
fn load_settings(profile: Option<PathBuf>) -> anyhow::Result<ConfigFile> {
    let profile =
        profile.or_else(|| std::env::var("ABSTRACTOR_PROFILE").ok().map(PathBuf::from));
    match profile {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Style profile not found at {}", path.display());
            }
            tracing::debug!(path = %path.display(), "using style profile");
            config_file::load_from_path(&path)
                .with_context(|| format!("loading style profile {}", path.display()))
        }
        None => {
            tracing::debug!("using config file cascade");
            Ok(config_file::load_config())
        }
    }
}

fn layout_config(
    settings: &ConfigFile,
    no_merge: bool,
    y_tolerance: Option<f64>,
) -> anyhow::Result<LayoutConfig> {
    let mut builder = LayoutConfigBuilder::new();
    if let Some(section) = &settings.layout {
        builder = builder.apply_file(section);
    }
    if no_merge {
        builder = builder.merge_consecutive(false);
    }
    if let Some(tolerance) = y_tolerance {
        builder = builder.merge_y_tolerance(tolerance);
    }
    builder.build().context("invalid layout configuration")
}

fn parser(settings: &ConfigFile) -> anyhow::Result<AbstractParser> {
    let config = ParsingConfigBuilder::new()
        .apply_file(settings.profile.as_ref(), settings.heuristics.as_ref())
        .build()
        .context("invalid style profile")?;
    Ok(AbstractParser::with_config(config))
}

fn load_elements(path: &Path) -> anyhow::Result<ElementDocument> {
    load_element_document(path).with_context(|| format!("reading {}", path.display()))
}

fn save<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    write_json(path, value).with_context(|| format!("writing {}", path.display()))
}

fn run_all(
    settings: &ConfigFile,
    io: &Io,
    strip_headers: bool,
    keep_intermediate: Option<&Path>,
    out: &mut dyn Write,
    color: ColorMode,
) -> anyhow::Result<()> {
    let layout = layout_config(settings, false, None)?;
    let parser = parser(settings)?;
    let keep = |name: &str, doc: &ElementDocument| -> anyhow::Result<()> {
        match keep_intermediate {
            Some(dir) => save(&dir.join(name), doc),
            None => Ok(()),
        }
    };

    let raw = load_raw_document(&io.input)
        .with_context(|| format!("reading {}", io.input.display()))?;
    let normalized = Normalizer::with_config(layout).normalize(raw);
    output::print_normalize_summary(out, &normalized.stats, color)?;
    let mut doc = normalized.document;
    keep("neutral.json", &doc)?;

    let stats = parser.classify_deterministic(&mut doc);
    output::print_deterministic_summary(out, &stats, color)?;
    keep("pass1.json", &doc)?;

    if strip_headers {
        let removed = parser.strip_headers_footers(&mut doc);
        output::print_clean_summary(out, removed, doc.elements.len(), color)?;
        keep("cleaned.json", &doc)?;
    }

    let report = parser
        .classify_contextual(&mut doc)
        .context("contextual pass")?;
    output::print_contextual_summary(out, &report, color)?;
    keep("pass2.json", &doc)?;

    let abstracts = parser.aggregate(&doc).context("aggregation")?;
    save(&io.output, &abstracts)?;
    output::print_aggregate_summary(out, &abstracts, color)?;
    Ok(())
}
