//! CLI command definitions for strategy-brain.
//!
//! Runs the strategy pipeline, single stages, and the JSON extraction engine
//! from the command line.

use crate::agents::{BarrierResult, BigIdea, WhatAnalysis, WhoAnalysis};
use crate::brief::Brief;
use crate::llm::{ProviderConfig, ProviderKind, TextGenerator};
use crate::pipeline::{PipelineConfig, ProgressStatus, StageId, StrategyOrchestrator};
use crate::utils::json_extraction::extract_structured;
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Marketing strategy pipeline driven by an LLM.
#[derive(Parser)]
#[command(name = "strategy-brain")]
#[command(about = "Turn a product brief into a marketing strategy with an LLM")]
#[command(version)]
#[command(
    long_about = "strategy-brain runs a staged marketing strategy pipeline over a product brief: barrier analysis, WHO/WHAT analysis, a BIG IDEA, copy and ad plans, plus an independent alternative perspective.\n\nExample usage:\n  strategy-brain run --brief brief.yaml --output strategy.json\n  strategy-brain stream --product-name \"Oat milk\" --objectives \"Grow trial\"\n  strategy-brain stage who --brief brief.json --skip-barriers"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// LLM provider to use (openai, anthropic). Overrides LLM_PROVIDER.
    #[arg(long, global = true)]
    pub provider: Option<ProviderKind>,

    /// Model to use with the active provider.
    #[arg(short, long, global = true)]
    pub model: Option<String>,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the full pipeline and print the composite result as JSON.
    Run(RunArgs),

    /// Run the full pipeline and print progress events as JSON lines.
    Stream(StreamArgs),

    /// Run one stage, computing the stages it depends on first.
    Stage(StageArgs),

    /// Recover a JSON object from LLM output text.
    Extract(ExtractArgs),

    /// Show which providers are configured.
    Providers(ProvidersArgs),
}

/// Brief input, from a file, flags, or both (flags win).
#[derive(clap::Args, Debug, Default)]
pub struct BriefArgs {
    /// Brief file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(short = 'b', long)]
    pub brief: Option<PathBuf>,

    /// Product or service name.
    #[arg(long)]
    pub product_name: Option<String>,

    /// Product or service description.
    #[arg(long)]
    pub description: Option<String>,

    /// Target market.
    #[arg(long)]
    pub target_market: Option<String>,

    /// Current situation of the brand.
    #[arg(long)]
    pub current_situation: Option<String>,

    /// Objectives to achieve.
    #[arg(long)]
    pub objectives: Option<String>,

    /// Main competitors.
    #[arg(long)]
    pub competitors: Option<String>,

    /// Additional free-text information.
    #[arg(long)]
    pub additional_info: Option<String>,
}

impl BriefArgs {
    /// Build and validate the brief.
    pub fn into_brief(self) -> anyhow::Result<Brief> {
        let mut brief = match &self.brief {
            Some(path) => Brief::from_file(path)?,
            None => Brief::default(),
        };

        let overrides = [
            (self.product_name, &mut brief.product_name),
            (self.description, &mut brief.product_description),
            (self.target_market, &mut brief.target_market),
            (self.current_situation, &mut brief.current_situation),
            (self.objectives, &mut brief.objectives),
            (self.competitors, &mut brief.competitors),
            (self.additional_info, &mut brief.additional_info),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        brief.validate().map_err(|e| {
            anyhow::anyhow!("{}. Provide --brief <file> or --product-name.", e)
        })?;
        Ok(brief)
    }
}

/// Arguments for `strategy-brain run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub brief: BriefArgs,

    /// Write the composite result to this file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Also write the barrier map as a Mermaid file.
    #[arg(long)]
    pub mermaid: Option<PathBuf>,
}

/// Arguments for `strategy-brain stream`.
#[derive(Parser, Debug)]
pub struct StreamArgs {
    #[command(flatten)]
    pub brief: BriefArgs,
}

/// Arguments for `strategy-brain stage`.
#[derive(Parser, Debug)]
pub struct StageArgs {
    /// Stage to run (barrierAnalysis, alternativePerspective, who, what,
    /// bigIdea, copy, adPlan).
    pub stage: StageId,

    #[command(flatten)]
    pub brief: BriefArgs,

    /// Run WHO and WHAT without barrier analysis input.
    #[arg(long)]
    pub skip_barriers: bool,

    /// Write the stage result to this file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `strategy-brain extract`.
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// File holding the raw text. Reads stdin when omitted.
    pub input: Option<PathBuf>,
}

/// Arguments for `strategy-brain providers`.
#[derive(Parser, Debug)]
pub struct ProvidersArgs {
    /// Output JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let settings = ProviderOverrides {
        provider: cli.provider,
        model: cli.model,
    };
    match cli.command {
        Commands::Run(args) => run_pipeline_command(args, &settings).await,
        Commands::Stream(args) => run_stream_command(args, &settings).await,
        Commands::Stage(args) => run_stage_command(args, &settings).await,
        Commands::Extract(args) => run_extract_command(args),
        Commands::Providers(args) => run_providers_command(args, &settings),
    }
}

// ============================================================================
// Setup
// ============================================================================

struct ProviderOverrides {
    provider: Option<ProviderKind>,
    model: Option<String>,
}

fn provider_config(overrides: &ProviderOverrides) -> anyhow::Result<ProviderConfig> {
    let mut config = ProviderConfig::from_env()?;
    if let Some(kind) = overrides.provider {
        config = config.with_provider(kind);
    }
    if let Some(model) = &overrides.model {
        config = config.with_model(model.clone());
    }
    Ok(config)
}

fn build_orchestrator(overrides: &ProviderOverrides) -> anyhow::Result<StrategyOrchestrator> {
    let providers = provider_config(overrides)?;
    let pipeline = PipelineConfig::from_env()?;
    pipeline.validate()?;

    let provider = providers.build_provider().map_err(|e| {
        anyhow::anyhow!(
            "Failed to initialize LLM provider: {}. Set {} or choose another --provider.",
            e,
            providers.provider.api_key_var()
        )
    })?;

    info!(provider = %providers.provider, model = %providers.model(), "Using LLM provider");
    Ok(StrategyOrchestrator::new(
        TextGenerator::new(provider, providers.model()),
        pipeline,
    ))
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pipeline");
            token.cancel();
        }
    });
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
            info!(path = %path.display(), "Wrote result");
        }
        None => println!("{}", json),
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

async fn run_pipeline_command(args: RunArgs, overrides: &ProviderOverrides) -> anyhow::Result<()> {
    let brief = args.brief.into_brief()?;
    let orchestrator = build_orchestrator(overrides)?;

    let token = CancellationToken::new();
    cancel_on_interrupt(token.clone());

    let result = orchestrator
        .run_all_with_cancellation(&brief, &token)
        .await?;

    if let Some(path) = &args.mermaid {
        fs::write(path, &result.barrier_analysis.mermaid_diagram)?;
        info!(path = %path.display(), "Wrote barrier map");
    }
    write_json(&result, args.output.as_deref())
}

async fn run_stream_command(args: StreamArgs, overrides: &ProviderOverrides) -> anyhow::Result<()> {
    let brief = args.brief.into_brief()?;
    let orchestrator = build_orchestrator(overrides)?;

    let mut stream = orchestrator.run_streaming(&brief);
    let mut failure: Option<String> = None;

    loop {
        tokio::select! {
            event = stream.recv() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string(&event)?);
                if event.status == ProgressStatus::Error {
                    failure = Some(format!("{}: {}", event.stage, event.message));
                }
            }
            _ = tokio::signal::ctrl_c(), if !stream.is_cancelled() => {
                warn!("Interrupted, cancelling pipeline");
                stream.cancel();
            }
        }
    }

    match failure {
        Some(message) => Err(anyhow::anyhow!("Pipeline failed at {}", message)),
        None => Ok(()),
    }
}

async fn run_stage_command(args: StageArgs, overrides: &ProviderOverrides) -> anyhow::Result<()> {
    let brief = args.brief.into_brief()?;
    let orchestrator = build_orchestrator(overrides)?;
    info!(stage = %args.stage, "Running single stage");

    let result = run_single_stage(&orchestrator, args.stage, &brief, args.skip_barriers).await?;
    write_json(&result, args.output.as_deref())
}

/// Run `stage` and everything it depends on, returning its result as JSON.
async fn run_single_stage(
    orchestrator: &StrategyOrchestrator,
    stage: StageId,
    brief: &Brief,
    skip_barriers: bool,
) -> anyhow::Result<Value> {
    let value = match stage {
        StageId::BarrierAnalysis => serde_json::to_value(orchestrator.analyze_barriers(brief).await?)?,
        StageId::AlternativePerspective => {
            serde_json::to_value(orchestrator.analyze_alternative_perspective(brief).await?)?
        }
        StageId::Who => {
            let barriers = barriers_for(orchestrator, brief, skip_barriers).await?;
            serde_json::to_value(orchestrator.analyze_who(brief, barriers.as_ref()).await?)?
        }
        StageId::What => {
            let barriers = barriers_for(orchestrator, brief, skip_barriers).await?;
            serde_json::to_value(orchestrator.analyze_what(brief, barriers.as_ref()).await?)?
        }
        StageId::BigIdea => {
            let (_, _, big_idea) = through_big_idea(orchestrator, brief, skip_barriers).await?;
            serde_json::to_value(big_idea)?
        }
        StageId::Copy => {
            let (who, what, big_idea) = through_big_idea(orchestrator, brief, skip_barriers).await?;
            serde_json::to_value(orchestrator.generate_copy(&big_idea, &who, &what).await?)?
        }
        StageId::AdPlan => {
            let (who, what, big_idea) = through_big_idea(orchestrator, brief, skip_barriers).await?;
            serde_json::to_value(
                orchestrator
                    .generate_ad_plan(brief, &who, &what, &big_idea)
                    .await?,
            )?
        }
    };
    Ok(value)
}

async fn barriers_for(
    orchestrator: &StrategyOrchestrator,
    brief: &Brief,
    skip_barriers: bool,
) -> anyhow::Result<Option<BarrierResult>> {
    if skip_barriers {
        return Ok(None);
    }
    Ok(Some(orchestrator.analyze_barriers(brief).await?))
}

async fn through_big_idea(
    orchestrator: &StrategyOrchestrator,
    brief: &Brief,
    skip_barriers: bool,
) -> anyhow::Result<(WhoAnalysis, WhatAnalysis, BigIdea)> {
    let barriers = barriers_for(orchestrator, brief, skip_barriers).await?;
    let (who, what) = tokio::try_join!(
        orchestrator.analyze_who(brief, barriers.as_ref()),
        orchestrator.analyze_what(brief, barriers.as_ref()),
    )?;
    let big_idea = orchestrator.generate_big_idea(&who, &what).await?;
    Ok((who, what, big_idea))
}

fn run_extract_command(args: ExtractArgs) -> anyhow::Result<()> {
    let text = match &args.input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let map = extract_structured(&text)?;
    println!("{}", serde_json::to_string_pretty(&Value::Object(map))?);
    Ok(())
}

fn run_providers_command(args: ProvidersArgs, overrides: &ProviderOverrides) -> anyhow::Result<()> {
    let config = provider_config(overrides)?;
    let statuses = config.statuses();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    println!("=== LLM Providers ===");
    for status in &statuses {
        println!(
            "{} {:<10} {:<14} model: {}",
            if status.active { "*" } else { " " },
            status.name,
            if status.configured { "configured" } else { "not configured" },
            status.model
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stage_command() {
        let cli = Cli::try_parse_from([
            "strategy-brain",
            "--provider",
            "anthropic",
            "stage",
            "big_idea",
            "--product-name",
            "Oat milk",
            "--skip-barriers",
        ])
        .unwrap();

        assert_eq!(cli.provider, Some(ProviderKind::Anthropic));
        match cli.command {
            Commands::Stage(args) => {
                assert_eq!(args.stage, StageId::BigIdea);
                assert!(args.skip_barriers);
                assert_eq!(args.brief.product_name.as_deref(), Some("Oat milk"));
            }
            _ => panic!("expected stage command"),
        }
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let result = Cli::try_parse_from(["strategy-brain", "--provider", "vertex", "providers"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_brief_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.json");
        fs::write(
            &path,
            r#"{"productName": "Oat milk", "objectives": "Grow trial"}"#,
        )
        .unwrap();

        let brief = BriefArgs {
            brief: Some(path),
            objectives: Some("Win cafes".to_string()),
            ..Default::default()
        }
        .into_brief()
        .unwrap();
        assert_eq!(brief.product_name, "Oat milk");
        assert_eq!(brief.objectives, "Win cafes");
    }

    #[test]
    fn test_brief_requires_product_name() {
        let err = BriefArgs::default().into_brief().unwrap_err();
        assert!(err.to_string().contains("--product-name"));
    }
}
