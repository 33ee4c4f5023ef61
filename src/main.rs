use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use casestudy_bootstrap::{
    config::{Config, LogFormat},
    kernel::KernelClient,
    metadata::{KernelMetadataStore, MetadataParser},
    openai::{OpenAiClient, OpenAiProvisioner},
    workflow::{BootstrapRequest, BootstrapWorkflow, ProgressReporter},
};

/// Bootstrap the research context, conversation and agent of a case-study run.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Case study: climate-monitoring, sentinel-5p or swissgrid
    #[arg(long)]
    case_study: String,

    /// Tracer id of the run
    #[arg(long)]
    tracer_id: String,

    /// Job id of the run
    #[arg(long)]
    job_id: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        case_study = %cli.case_study,
        tracer_id = %cli.tracer_id,
        job_id = cli.job_id,
        "Case study bootstrap starting..."
    );

    let kernel = match KernelClient::new(&config.kernel, config.request.clone()) {
        Ok(c) => {
            info!(base_url = %config.kernel.base_url, "Kernel client initialized");
            Arc::new(c)
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize kernel client");
            return Err(e.into());
        }
    };

    let openai = match OpenAiClient::new(&config.openai, config.request.clone()) {
        Ok(c) => {
            info!(base_url = %config.openai.base_url, model = %config.openai.model, "OpenAI client initialized");
            c
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize OpenAI client");
            return Err(e.into());
        }
    };

    let parser = MetadataParser::new(config.metadata.clone(), kernel.clone());
    let metadata_store = Arc::new(KernelMetadataStore::new(kernel.clone(), parser));
    let provisioner = Arc::new(OpenAiProvisioner::new(
        openai,
        kernel.clone(),
        config.openai.model.clone(),
    ));

    let workflow = BootstrapWorkflow::new(
        kernel.clone(),
        kernel.clone(),
        metadata_store,
        kernel,
        provisioner,
    );

    // Stream events to stdout as JSON lines
    let (reporter, mut events) = ProgressReporter::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => error!(error = %e, "Failed to serialize event"),
            }
        }
    });

    let request = BootstrapRequest::new(cli.case_study, cli.tracer_id, cli.job_id);
    let outcome = workflow.execute(request, &reporter).await;

    // Closing the channel lets the printer drain and exit
    drop(reporter);
    let _ = printer.await;

    match outcome {
        Ok(success) => {
            info!(
                research_context = %success.research_context.title,
                conversation_id = success.conversation.id,
                "Bootstrap finished"
            );
            Ok(())
        }
        Err(_) => std::process::exit(1),
    }
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
