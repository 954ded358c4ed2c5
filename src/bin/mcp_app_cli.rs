//! MCP-APP CLI - Bridge interface for hosts
//!
//! Commands: validate, validate-product, render, dispatch
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation failure, 1 on any other error

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mcp_app_core::render::PRODUCT_CARD_KIND;
use mcp_app_core::{AppConfig, DisplayMode, Engine, EngineSettings, LifecycleContext, RenderContext};

#[derive(Parser)]
#[command(name = "mcp-app-cli")]
#[command(about = "MCP-APP CLI - Validate and render interactive resources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to an engine settings JSON file
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Log at info level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an app configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Validate a single product card
    ValidateProduct {
        /// JSON payload (product card)
        #[arg(short, long)]
        payload: String,
    },

    /// Render one resource
    Render {
        /// Resource kind (survey, visualization, productCard)
        kind: String,

        /// Resource ID
        id: String,

        #[arg(short, long)]
        config: PathBuf,

        /// Runtime event name
        #[arg(short, long)]
        event: Option<String>,

        /// JSON object exposed to conditions and data sources
        #[arg(short, long)]
        data: Option<String>,

        /// Product card display mode (card, list, compact)
        #[arg(long)]
        display_mode: Option<String>,
    },

    /// List lifecycle actions for an event
    Dispatch {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        event: String,

        #[arg(short, long)]
        data: Option<String>,
    },
}

enum Failure {
    Invalid(Value),
    Error(String),
}

impl Failure {
    fn report(self) -> ExitCode {
        match self {
            Failure::Invalid(output) => {
                print_json(&output);
                ExitCode::from(2)
            }
            Failure::Error(message) => {
                print_json(&json!({"success": false, "error": message}));
                ExitCode::FAILURE
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json(path: &Path) -> Result<Value, Failure> {
    let content = fs::read_to_string(path)
        .map_err(|e| Failure::Error(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content).map_err(|e| Failure::Error(format!("Invalid JSON in {}: {}", path.display(), e)))
}

fn parse_data(data: Option<&str>) -> Result<Option<Map<String, Value>>, Failure> {
    data.map(|raw| match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Failure::Error("--data must be a JSON object".to_string())),
        Err(e) => Err(Failure::Error(format!("Invalid --data: {}", e))),
    })
    .transpose()
}

fn load_config(engine: &Engine, path: &Path) -> Result<AppConfig, Failure> {
    let raw = read_json(path)?;
    let result = engine.validate_config(&raw);
    if !result.success {
        return Err(Failure::Invalid(json!({"success": false, "errors": result.errors})));
    }
    result
        .into_result()
        .map_err(|e| Failure::Error(e.to_string()))
}

fn run(engine: &Engine, command: Commands) -> Result<Value, Failure> {
    match command {
        Commands::Validate { config } => {
            let result = engine.validate_config(&read_json(&config)?);
            let output = json!({"success": result.success, "errors": result.errors});
            if result.success {
                Ok(output)
            } else {
                Err(Failure::Invalid(output))
            }
        }

        Commands::ValidateProduct { payload } => {
            let raw: Value =
                serde_json::from_str(&payload).map_err(|e| Failure::Error(format!("Invalid payload: {}", e)))?;
            let result = engine.validate_product_card(&raw);
            let output = serde_json::to_value(&result).map_err(|e| Failure::Error(e.to_string()))?;
            if result.success {
                Ok(output)
            } else {
                Err(Failure::Invalid(output))
            }
        }

        Commands::Render { kind, id, config, event, data, display_mode } => {
            let config = load_config(engine, &config)?;
            let mut context = RenderContext {
                event,
                ..RenderContext::default()
            };
            context.data = parse_data(data.as_deref())?;
            let context = (context != RenderContext::default()).then_some(context);

            let rendered = match display_mode.filter(|_| kind == PRODUCT_CARD_KIND) {
                Some(mode) => {
                    let mode = DisplayMode::parse(&mode)
                        .ok_or_else(|| Failure::Error(format!("Unknown display mode: {}", mode)))?;
                    engine.render_product_card_as(&config, &id, context.as_ref(), mode)
                }
                None => engine.render(&kind, &config, &id, context.as_ref()),
            }
            .map_err(|e| Failure::Error(e.to_string()))?;

            Ok(json!({"success": true, "resource": rendered}))
        }

        Commands::Dispatch { config, event, data } => {
            let config = load_config(engine, &config)?;
            let mut context = LifecycleContext::new(event);
            context.data = parse_data(data.as_deref())?;
            Ok(json!({"success": true, "actions": engine.dispatch_lifecycle(&config, &context)}))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match cli.settings.as_deref().map(EngineSettings::load_from_file).transpose() {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => return Failure::Error(e.to_string()).report(),
    };
    let engine = Engine::new(settings);

    match run(&engine, cli.command) {
        Ok(output) => {
            print_json(&output);
            ExitCode::SUCCESS
        }
        Err(failure) => failure.report(),
    }
}
