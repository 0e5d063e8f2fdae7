//! CLI for FotoGen - AI photo generation and editing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use fotogen::gemini::API_KEY_ENV;
use fotogen::{
    ActiveView, AspectRatio, EnvCredentialHost, GeminiClient, ModelTier, Studio, StudioError,
    Tool, ToolKind,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "fotogen")]
#[command(about = "Generate and edit photos via the Gemini image API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tool once and save the resulting image
    Run(RunArgs),

    /// List available tools
    Tools,

    /// List available models
    Models,
}

#[derive(Args)]
struct RunArgs {
    /// The text prompt (editing tools fall back to their suggested prompt)
    prompt: Option<String>,

    /// Tool to run
    #[arg(short, long, value_enum, default_value = "generate")]
    tool: ToolArg,

    /// Model tier to use
    #[arg(short, long, value_enum, default_value = "flash")]
    model: ModelArg,

    /// Aspect ratio of the result
    #[arg(long, value_enum)]
    aspect_ratio: Option<AspectRatioArg>,

    /// Source photo (required by editing tools)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file path (defaults to the tool's suggested filename)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ToolArg {
    Generate,
    Portrait,
    Avatar,
    Photoshoot,
    Edit,
    Enhance,
}

impl From<ToolArg> for Tool {
    fn from(arg: ToolArg) -> Self {
        match arg {
            ToolArg::Generate => Tool::Generate,
            ToolArg::Portrait => Tool::Portrait,
            ToolArg::Avatar => Tool::Avatar,
            ToolArg::Photoshoot => Tool::Photoshoot,
            ToolArg::Edit => Tool::Edit,
            ToolArg::Enhance => Tool::Enhance,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Flash,
    Pro,
}

impl From<ModelArg> for ModelTier {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => ModelTier::Flash,
            ModelArg::Pro => ModelTier::Pro,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
    #[value(name = "4:3")]
    Standard,
    #[value(name = "3:4")]
    StandardPortrait,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
            AspectRatioArg::Standard => AspectRatio::Standard,
            AspectRatioArg::StandardPortrait => AspectRatio::StandardPortrait,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            run_tool(args, cli.json).await?;
        }
        Commands::Tools => {
            list_tools(cli.json)?;
        }
        Commands::Models => {
            list_models(cli.json)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn validate_run_args(tool: Tool, args: &RunArgs) -> anyhow::Result<()> {
    match tool.kind() {
        ToolKind::Editing => {
            if args.input.is_none() {
                anyhow::bail!("the {} tool needs --input with a source photo", tool.label());
            }
        }
        ToolKind::Generation => {
            if args.input.is_some() {
                anyhow::bail!("--input is only used by editing tools");
            }
        }
    }
    Ok(())
}

fn failure_message(err: &StudioError) -> String {
    if err.is_local() {
        err.to_string()
    } else {
        format!("request failed: {err}")
    }
}

async fn run_tool(args: RunArgs, json_output: bool) -> anyhow::Result<()> {
    let tool = Tool::from(args.tool);
    let model = ModelTier::from(args.model);
    validate_run_args(tool, &args)?;

    let mut studio =
        Studio::with_credential_host(GeminiClient::new(), Arc::new(EnvCredentialHost));
    studio.select_tool(tool);
    studio.select_model(model);

    if studio.active_view() == ActiveView::KeyGate {
        anyhow::bail!(
            "{} requires a selected API key. Set {} and try again.",
            model.display_name(),
            API_KEY_ENV
        );
    }

    if let Some(ref input) = args.input {
        studio.upload_file(input)?;
    }
    if let Some(prompt) = args.prompt {
        studio.set_prompt(prompt);
    }
    if let Some(aspect_ratio) = args.aspect_ratio {
        studio.set_aspect_ratio(aspect_ratio.into());
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(tool.kind().download_filename()));

    let image = match studio.submit().await {
        Ok(image) => image,
        Err(err) => anyhow::bail!(failure_message(&err)),
    };
    image.save(&output)?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "tool": tool.label(),
            "model": image.metadata.model,
            "output": output.display().to_string(),
            "size_bytes": image.size(),
            "format": image.format.extension(),
            "duration_ms": image.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Saved {} ({} bytes) via {}",
            output.display(),
            image.size(),
            image.metadata.model
        );
        if let Some(duration) = image.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}

fn list_tools(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ToolInfo {
        name: String,
        label: &'static str,
        kind: &'static str,
        needs_photo: bool,
        suggested_prompt: &'static str,
    }

    let tools: Vec<ToolInfo> = ToolArg::value_variants()
        .iter()
        .map(|arg| {
            let tool = Tool::from(*arg);
            ToolInfo {
                name: arg
                    .to_possible_value()
                    .map(|v| v.get_name().to_string())
                    .unwrap_or_default(),
                label: tool.label(),
                kind: tool.kind().as_str(),
                needs_photo: tool.kind() == ToolKind::Editing,
                suggested_prompt: tool.placeholder(),
            }
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&tools)?);
    } else {
        println!("Available tools:\n");
        println!("GENERATION:");
        for t in tools.iter().filter(|t| !t.needs_photo) {
            println!("  {} - {}", t.name, t.label);
        }
        println!("\nEDITING (needs --input):");
        for t in tools.iter().filter(|t| t.needs_photo) {
            println!("  {} - {}", t.name, t.label);
        }
    }

    Ok(())
}

fn list_models(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ModelInfo {
        id: &'static str,
        name: &'static str,
        requires_selected_key: bool,
    }

    let models: Vec<ModelInfo> = ModelTier::ALL
        .iter()
        .map(|m| ModelInfo {
            id: m.as_str(),
            name: m.display_name(),
            requires_selected_key: m.requires_selected_key(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        println!("Available models:\n");
        for m in &models {
            println!("  {} ({})", m.name, m.id);
            if m.requires_selected_key {
                println!("    requires a selected API key");
            }
        }
        println!("\nAPI key: {}", API_KEY_ENV);
    }

    Ok(())
}
