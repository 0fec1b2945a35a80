//! cv-pipeline: PDF resumes to candidate profiles to job matches

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use cv_pipeline::cli::{self, Cli, Commands, ConfigAction};
use cv_pipeline::config::{Config, OutputFormat};
use cv_pipeline::input::PdfReaderTool;
use cv_pipeline::llm::OpenAiModel;
use cv_pipeline::output::formatter::ReportGenerator;
use cv_pipeline::output::report::RunSummary;
use cv_pipeline::Pipeline;
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    // Credentials may live in .env next to the stage directories
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading configuration from {}", path.display())),
        None => Config::load().context("reading default configuration"),
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            root,
            output,
            detailed,
            no_progress,
        } => {
            if let Some(root) = &root {
                config.paths = config.paths.rooted_at(root);
            }
            if let Some(output) = output {
                config.output.format = cli::parse_output_format(&output).map_err(anyhow::Error::msg)?;
            }
            config.output.detailed |= detailed;
            config.output.show_progress &= !no_progress;

            let api_key = config.api_key()?;
            let model = OpenAiModel::new(api_key, &config.agent).context("creating model client")?;

            let pipeline = Pipeline::new(model, config.clone()).context("loading job descriptions")?;

            println!("🚀 CV pipeline");
            println!("🤖 Model: {}", config.agent.model);
            println!(
                "📚 Knowledge: {} ({} job description(s))",
                pipeline.paths().knowledge_dir.display(),
                pipeline.knowledge().len()
            );

            let summary = pipeline.run().await?;
            print_summary(&summary, &config)?;
        }

        Commands::Extract { file, output_dir } => {
            let tool = PdfReaderTool::new();
            debug!("{}: {}", tool.name(), tool.description());
            println!("{}", tool.run(&file, output_dir.as_deref()).await);
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", path.display());
                    let rendered = toml::to_string_pretty(&config).context("rendering configuration")?;
                    println!("{}", rendered);
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default().save_to(&path)?;
                    println!("✅ Configuration reset: {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, config: &Config) -> anyhow::Result<()> {
    let succeeded = summary.extractions.iter().filter(|e| e.succeeded()).count();
    println!("\n📊 Run summary");
    println!("  • Resumes extracted: {}/{}", succeeded, summary.extractions.len());
    for failed in summary.failed_extractions() {
        println!("    {} {}: {}", "✗".red(), failed.source.display(), failed.message);
    }
    println!("  • Profiles written: {}", summary.profiles.len());
    println!("  • Report: {}", summary.report_path.display());
    if let Some(rendered) = &summary.rendered_report_path {
        println!("  • Rendered report: {}", rendered.display());
    }
    println!("  • Processing time: {}ms", summary.processing_time_ms);

    if config.output.format == OutputFormat::Console || config.output.detailed {
        let generator = ReportGenerator::with_options(config.output.color_output, config.output.detailed, true);
        println!("{}", generator.generate_report(&summary.report, &OutputFormat::Console)?);
    }

    println!("✅ Pipeline complete");
    Ok(())
}
