use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use finder_tags_lib::actions::{ActionKind, ActionRouter, ActionSettings};
use finder_tags_lib::config::TaggerConfig;
use finder_tags_lib::input_validation::validate_path_argument;
use finder_tags_lib::reconciler::ApplyReport;
use finder_tags_lib::store::{MemoryBackend, TagBackend, XattrBackend};
use finder_tags_lib::system_integration::finder_selection;
use finder_tags_lib::tags::{Color, Tag};
use finder_tags_lib::{build_router, build_router_with, logging, TagError};

#[derive(Parser)]
#[command(name = "finder-tags", version)]
#[command(about = "Toggle, cycle and clear Finder tags on the selected files", long_about = None)]
struct Cli {
    /// Increase log output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Compute the new tags without writing them
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the tags shared by the selection
    Show { paths: Vec<PathBuf> },
    /// Remove every tag
    Clear { paths: Vec<PathBuf> },
    /// Add or remove a color tag
    Toggle { color: String, paths: Vec<PathBuf> },
    /// Add or remove a named tag
    Custom {
        #[arg(long)]
        tag: String,
        #[arg(long, default_value = "Custom")]
        color: String,
        paths: Vec<PathBuf>,
    },
    /// Replace the current color with the next one on the color wheel
    Cycle {
        /// Comma-separated colors, e.g. red,orange,yellow
        #[arg(long, value_delimiter = ',')]
        palette: Vec<String>,
        paths: Vec<PathBuf>,
    },
    /// Handle a raw host action identifier with its settings payload
    Dispatch {
        action: String,
        #[arg(long, value_name = "JSON")]
        settings: Option<String>,
        paths: Vec<PathBuf>,
    },
    /// Print the button title for an action
    Title {
        action: String,
        #[arg(long, value_name = "JSON")]
        settings: Option<String>,
    },
}

struct Request {
    action: String,
    settings: ActionSettings,
    paths: Vec<PathBuf>,
}

fn parse_settings(settings: Option<&str>) -> anyhow::Result<ActionSettings> {
    match settings {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).context("--settings is not valid JSON")?;
            Ok(ActionSettings::from_json(&value))
        }
        None => Ok(ActionSettings::default()),
    }
}

fn resolve_selection(paths: Vec<PathBuf>) -> anyhow::Result<Vec<PathBuf>> {
    if paths.is_empty() {
        return Ok(finder_selection());
    }
    for path in &paths {
        let raw = path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid path: contains non-UTF-8 characters"))?;
        validate_path_argument(raw)?;
    }
    Ok(paths)
}

fn format_tags(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "(no tags)".to_string();
    }
    tags.iter()
        .map(|tag| match tag.color {
            Color::Custom => tag.name.clone(),
            color if tag.name == color.name() => tag.name.clone(),
            color => format!("{} ({})", tag.name, color),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_report(report: &ApplyReport, json: bool, dry_run: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
        return Ok(());
    }

    let verb = if dry_run { "Would tag" } else { "Tagged" };
    println!("🏷  {} {} item(s): {}", verb, report.written.len(), format_tags(&report.tags));
    for entry in &report.failed {
        eprintln!("   ⚠️  {}: {}", entry.path.display(), entry.error);
    }
    Ok(())
}

fn run_action<B: TagBackend>(
    router: &ActionRouter<B>,
    request: &Request,
    cli: &Cli,
) -> anyhow::Result<()> {
    match router.dispatch(&request.action, &request.settings, &request.paths) {
        Ok(Some(report)) => {
            print_report(&report, cli.json, cli.dry_run)?;
            if !report.is_success() {
                std::process::exit(1);
            }
        }
        Ok(None) => {
            if !cli.json {
                println!("Nothing to do.");
            }
        }
        Err(TagError::Validation(message)) => {
            eprintln!("❌ {message}");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Copies the current raw tags of the selection into memory so a dry run
/// sees the same starting state without touching the files.
fn snapshot(paths: &[PathBuf]) -> MemoryBackend {
    let backend = MemoryBackend::new();
    for path in paths {
        if let Ok(Some(data)) = XattrBackend.read_raw(path) {
            backend.insert_raw(path.clone(), data);
        }
    }
    backend
}

fn show(config: &TaggerConfig, paths: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let router = build_router(config);
    let tags = router.reconciler().common_tags(paths);

    if json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }

    println!("Selection: {} item(s)", paths.len());
    for path in paths {
        println!(
            "   {} - {}",
            path.display(),
            format_tags(&router.reconciler().tags_of(path))
        );
    }
    println!("Common tags: {}", format_tags(&tags));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = TaggerConfig::load(cli.config.as_deref())?;

    let request = match &cli.command {
        Command::Show { paths } => {
            let paths = resolve_selection(paths.clone())?;
            return show(&config, &paths, cli.json);
        }
        Command::Title { action, settings } => {
            let settings = parse_settings(settings.as_deref())?;
            let router = build_router(&config);
            if let Some(title) = router.title(action, &settings) {
                println!("{title}");
            }
            return Ok(());
        }
        Command::Clear { paths } => Request {
            action: ActionKind::ClearTags.identifier(),
            settings: ActionSettings::default(),
            paths: paths.clone(),
        },
        Command::Toggle { color, paths } => {
            let color = Color::palette_color(color)
                .ok_or_else(|| anyhow::anyhow!("Unknown color: {color}"))?;
            Request {
                action: ActionKind::ColorTag(color).identifier(),
                settings: ActionSettings::default(),
                paths: paths.clone(),
            }
        }
        Command::Custom { tag, color, paths } => Request {
            action: ActionKind::CustomTag.identifier(),
            settings: ActionSettings::custom(tag.as_str(), color.as_str()),
            paths: paths.clone(),
        },
        Command::Cycle { palette, paths } => {
            let slots: Vec<(&str, bool)> = palette.iter().map(|c| (c.trim(), true)).collect();
            let settings = if slots.is_empty() {
                ActionSettings::default()
            } else {
                ActionSettings::wheel(&slots)
            };
            Request {
                action: ActionKind::ColorWheel.identifier(),
                settings,
                paths: paths.clone(),
            }
        }
        Command::Dispatch {
            action,
            settings,
            paths,
        } => Request {
            action: action.clone(),
            settings: parse_settings(settings.as_deref())?,
            paths: paths.clone(),
        },
    };

    let request = Request {
        paths: resolve_selection(request.paths)?,
        ..request
    };

    if cli.dry_run {
        let backend = snapshot(&request.paths);
        let router = build_router_with(backend, &config, config.localization_table());
        run_action(&router, &request, &cli)
    } else {
        run_action(&build_router(&config), &request, &cli)
    }
}
