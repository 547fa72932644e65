mod commands;

use std::path::PathBuf;

use cicd_core::config::DEFAULT_CONFIG_FILE;
use cicd_core::{RunOptions, WorkflowConfig};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cicd",
    about = "Tag, push and deploy container images with GCR, Docker Hub and Helm"
)]
#[command(version)]
struct Cli {
    /// Workflow configuration file
    #[arg(long, global = true, env = "CICD_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose logging; passed to external tools as their debug flag
    #[arg(long, global = true)]
    debug: bool,

    /// Log commands instead of pushing; deploy runs helm with --dry-run
    #[arg(long, global = true)]
    dryrun: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag a built image and push the tags to the active registry
    Push {
        /// Branch name for tagging
        #[arg(long, short = 'b')]
        branch: Option<String>,
        /// Build event type: push, pull_request
        #[arg(long, short = 'e', default_value = "push")]
        event: String,
        /// Built image used as basis for tagging (required)
        #[arg(long, short = 'i')]
        image: Option<String>,
        /// Pull request number (required when event type is pull_request)
        #[arg(long)]
        pr: Option<String>,
    },
    /// Render Helm values and upgrade the service release
    Deploy {
        /// Branch name, used in the release name
        #[arg(long, short = 'b')]
        branch: Option<String>,
        /// Path to the Helm chart
        #[arg(long)]
        chart: Option<PathBuf>,
        /// Container repository URL
        #[arg(long, short = 'r')]
        repo: Option<String>,
        /// Kubernetes namespace for the service
        #[arg(long, short = 'n')]
        namespace: Option<String>,
        /// App/service name
        #[arg(long, short = 's')]
        service: Option<String>,
        /// Image tag to deploy (required)
        #[arg(long, short = 't')]
        tag: Option<String>,
        /// Helm values template with {{.Repo}} / {{.Tag}} placeholders
        #[arg(long)]
        template: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Before parsing, so `.env` can supply `CICD_CONFIG`.
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    let cli = Cli::parse();

    let config = WorkflowConfig::load(&cli.config)?;
    let options = RunOptions::resolve(cli.debug, cli.dryrun, &config);

    let default_level = if options.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
    tracing::debug!(
        dotenv = dotenv_loaded,
        config = %cli.config.display(),
        ?options,
        "cicd starting"
    );

    match cli.command {
        Commands::Push {
            branch,
            event,
            image,
            pr,
        } => {
            let request = cicd_workflow::PushRequest {
                image: image.unwrap_or_default(),
                branch: branch.unwrap_or_default(),
                event,
                pr,
            };
            commands::push(&config, options, &request).await?
        }
        Commands::Deploy {
            branch,
            chart,
            repo,
            namespace,
            service,
            tag,
            template,
        } => {
            let request = cicd_workflow::DeployRequest {
                branch: branch.unwrap_or_default(),
                tag: tag.unwrap_or_default(),
                repo,
                namespace,
                service,
                chart,
                values_template: template,
            };
            commands::deploy(&config, options, &request).await?
        }
    }

    Ok(())
}
