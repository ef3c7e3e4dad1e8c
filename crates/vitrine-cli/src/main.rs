//! Vitrine - Main entry point
//!
//! Resolves the templates for a configured device, composes its display, and
//! prints the candidate lists, selection menu, and mounted widget tree.

mod config;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vitrine_compose::{
    render_tree, ComposerState, ConstructorArgs, DeviceCatalog, DisplayComposer, PanelLoader, SelectionMenu,
    TemplateLoader,
};
use vitrine_core::{Device, Macros, TemplateLists, TemplateRegistry, View};

#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "Device display template resolution and composition")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "vitrine.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Name of a configured device to display (defaults to the first one)
    #[arg(short, long)]
    device: Option<String>,

    /// Build the device from a configured type instead of by name
    #[arg(long = "type", conflicts_with = "device")]
    device_type: Option<String>,

    /// Constructor argument for --type, as key=value
    #[arg(long = "arg", value_parser = parse_key_val, requires = "device_type")]
    args: Vec<(String, String)>,

    /// View to compose (embedded, detailed, engineering)
    #[arg(short, long)]
    view: Option<View>,

    /// Force a template, bypassing the registry
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Macro passed to the template, as key=value
    #[arg(short, long = "macro", value_parser = parse_key_val)]
    macros: Vec<(String, String)>,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Write an example configuration file and exit
    #[arg(long)]
    init: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

#[derive(Serialize)]
struct Report<'a> {
    device: String,
    device_class: String,
    view: View,
    forced_template: Option<&'a std::path::Path>,
    current_template: Option<&'a std::path::Path>,
    templates: &'a TemplateLists,
    menu: SelectionMenu,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Vitrine v{}", env!("CARGO_PKG_VERSION"));

    if args.init {
        config::save_default_config(&args.config)
            .with_context(|| format!("writing {}", args.config.display()))?;
        println!("Wrote example configuration to {}", args.config.display());
        return Ok(());
    }

    let config = config::load_config(&args.config)?;
    let search = config.search.clone().with_env_path();
    info!(
        directories = search.directories.len(),
        extensions = ?search.extensions,
        "Template search configured"
    );

    let registry = TemplateRegistry::new(&search);
    let loader: Rc<dyn TemplateLoader> = Rc::new(PanelLoader::new());
    let template = args.template.clone().or_else(|| config.display.template.clone());
    let macros: Option<Macros> = if args.macros.is_empty() {
        None
    } else {
        Some(args.macros.iter().cloned().collect())
    };

    let mut composer = if let Some(type_name) = &args.device_type {
        let catalog: DeviceCatalog = config.device_types().collect();
        let ctor_args: ConstructorArgs = args.args.iter().cloned().collect();
        DisplayComposer::from_type(
            registry,
            loader,
            &catalog,
            type_name,
            template.as_deref(),
            macros,
            &ctor_args,
        )
        .ok_or_else(|| anyhow!("could not build a device of type {}", type_name))?
    } else {
        let device = match &args.device {
            Some(name) => config
                .device(name)
                .ok_or_else(|| anyhow!("no device named '{}' in {}", name, args.config.display()))?,
            None => match config.devices.first() {
                Some(device) => device,
                None => bail!(
                    "no devices configured in {}; run with --init to create an example",
                    args.config.display()
                ),
            },
        };
        let device: Rc<dyn Device> = Rc::new(device.clone());
        DisplayComposer::from_device(registry, loader, device, template.as_deref(), macros)
    };

    composer.set_view(args.view.unwrap_or(config.display.view));

    if args.json {
        let report = Report {
            device: composer.device_name(),
            device_class: composer.device_class(),
            view: composer.view(),
            forced_template: composer.forced_override(),
            current_template: composer.current_template(),
            templates: composer.template_lists(),
            menu: composer.build_selection_menu(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Device: {} ({})", composer.device_name(), composer.device_class());
    println!("View: {}", composer.view().title());
    println!();
    println!("Templates:");
    print!("{}", indent(&composer.build_selection_menu().render()));
    println!();
    match composer.state() {
        ComposerState::Composed(path) => println!("Composed from {}:", path.display()),
        ComposerState::Fallback(reason) => println!("Fallback ({:?}):", reason),
        state => println!("{:?}:", state),
    }
    print!("{}", indent(&render_tree(composer.display().root())));

    Ok(())
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("  {}\n", line)).collect()
}
