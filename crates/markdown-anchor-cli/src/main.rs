use anyhow::{Context, Result, bail};
use clap::Parser;
use markdown_anchor_config::Config;
use markdown_anchor_engine::{Pipeline, format_tree};
use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

#[derive(Parser, Debug)]
#[command(name = "markdown-anchor")]
#[command(about = "Rewrites `[](){#id}` placeholder links into anchors and re-renders Markdown")]
#[command(version)]
struct Args {
    /// Markdown file to read; `-` or nothing reads stdin
    input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file (default: ~/.config/markdown-anchor/config.toml)
    #[arg(short, long, env = "MARKDOWN_ANCHOR_CONFIG")]
    config: Option<PathBuf>,

    /// Exit with status 1 if the output differs from the input; writes nothing
    #[arg(long, conflicts_with = "output")]
    check: bool,

    /// Print the transformed syntax tree instead of Markdown
    #[arg(long, conflicts_with = "check")]
    tree: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Use RUST_LOG when set, otherwise pick a level from --verbose
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        let level = if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }

    if run(&args)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Returns false when `--check` found a difference.
fn run(args: &Args) -> Result<bool> {
    let config = load_config(args.config.as_deref())?;
    let pipeline = Pipeline::new(config.into())
        .context("Invalid settings")?
        .with_default_plugins();

    let source = read_input(args.input.as_deref())?;
    let rendered = render(&pipeline, &source, args.tree)?;

    if args.check {
        if rendered != source {
            log::warn!("{} would be rewritten", input_name(args.input.as_deref()));
        }
        return Ok(rendered == source);
    }

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => io::stdout()
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?,
    }
    Ok(true)
}

/// An explicit path must exist; the default location is optional.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let Some(path) = explicit else {
        log::debug!("Config path: {}", Config::config_path().display());
        return Ok(Config::load()?.unwrap_or_default());
    };

    let path = Config::expand_path(path).unwrap_or_else(|| path.to_path_buf());
    match Config::load_from_path(&path)? {
        Some(config) => Ok(config),
        None => bail!("Config file not found: {}", path.display()),
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            Ok(source)
        }
    }
}

fn render(pipeline: &Pipeline, source: &str, tree: bool) -> Result<String> {
    if tree {
        let mut root = pipeline.parse(source);
        pipeline.run(&mut root, source);
        return Ok(format_tree(&root));
    }
    Ok(pipeline.process(source)?)
}

fn input_name(input: Option<&Path>) -> String {
    match input {
        Some(path) if path != Path::new("-") => path.display().to_string(),
        _ => "stdin".to_string(),
    }
}
