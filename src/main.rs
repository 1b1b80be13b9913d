// briefly/src/main.rs
use std::process::ExitCode;
use std::sync::Arc;

use briefly::cli::{load_config, render_report, Cli, Command};
use briefly::monitoring::{init_tracing, LoggingConfig};
use briefly::{AppConfig, HfInferenceClient, PipelineOptions, SummarizePipeline};
use clap::Parser;
use tracing::error;

/// Exit code when at least one chunk failed and the summary is partial.
const EXIT_PARTIAL: u8 = 2;

#[actix_web::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // An explicit env file replaces ./.env rather than sitting under it
    if let Some(path) = &cli.env_file {
        dotenvy::from_path_override(path).ok();
    } else {
        dotenvy::dotenv().ok();
    }

    // Keep the guard alive for the life of the process
    let _log_guard = match init_tracing(&LoggingConfig::from_env()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("⚠️ Failed to initialize file logging: {}", e);
            None
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "briefly failed");
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_pipeline(
    config: &AppConfig,
    options: PipelineOptions,
) -> Result<SummarizePipeline, Box<dyn std::error::Error>> {
    let chunker = config.chunking.build_chunker()?;
    let summarizer = HfInferenceClient::from_config(&config.inference)?;
    Ok(SummarizePipeline::new(chunker, Arc::new(summarizer), options))
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Summarize(args) => {
            args.chunking.apply(&mut config.chunking);
            let text = args.input.read()?;
            if briefly::chunker::normalize_input(&text).is_empty() {
                eprintln!("⚠️ {}", briefly::PipelineError::EmptyInput);
                return Ok(ExitCode::FAILURE);
            }

            let options = PipelineOptions {
                bounds: args.bounds(config.summary)?,
                condense: config.condense && !args.no_condense,
            };
            let pipeline = build_pipeline(&config, options)?;
            let report = pipeline.run(&text).await?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
            Ok(if report.partial {
                ExitCode::from(EXIT_PARTIAL)
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Chunk(args) => {
            args.chunking.apply(&mut config.chunking);
            let text = args.input.read()?;
            let chunks = config.chunking.build_chunker()?.chunk(&text)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&chunks)?);
            } else {
                println!("{} chunks", chunks.len());
                for chunk in &chunks {
                    println!("--- chunk {} ({} words)", chunk.index + 1, chunk.word_count());
                    println!("{}", chunk.text);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve => {
            let options = PipelineOptions {
                bounds: config.summary,
                condense: config.condense,
            };
            let pipeline = build_pipeline(&config, options)?;
            println!("🚀 Starting API server on http://{} ...", config.bind_addr());
            briefly::api::start_api_server(&config, pipeline).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
