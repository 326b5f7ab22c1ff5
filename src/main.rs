//! failover-gen CLI

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use failover_gen::config::DEFAULT_CONFIG_FILE;
use failover_gen::error::Result;
use failover_gen::output::DEFAULT_WORKFLOW_FILE;
use failover_gen::pipeline::{generate, render_file};
use failover_gen::publish::{
    publish_file, publish_via_pull_request, PublishRequest, PullRequestOptions,
};
use failover_gen::settings::DEFAULT_BRANCH;
use failover_gen::store::BranchStatus;
use failover_gen::{FailoverConfig, FixSuggestion, GitHubSettings, GitHubStore};

#[derive(Parser)]
#[command(name = "failover-gen")]
#[command(about = "Generate and publish failover CI workflows")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArg {
    /// Path to the failover config
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file (parse only)
    Validate {
        #[command(flatten)]
        config: ConfigArg,
    },

    /// Render the workflow to stdout
    Render {
        #[command(flatten)]
        config: ConfigArg,
    },

    /// Render the workflow and write it to disk
    Generate {
        #[command(flatten)]
        config: ConfigArg,

        /// Where to write the workflow
        #[arg(short, long, default_value = DEFAULT_WORKFLOW_FILE)]
        output: PathBuf,
    },

    /// Generate, write, and publish the workflow to GitHub
    Publish {
        #[command(flatten)]
        config: ConfigArg,

        /// Where to write the workflow
        #[arg(short, long, default_value = DEFAULT_WORKFLOW_FILE)]
        output: PathBuf,

        /// Path of the workflow inside the repository
        #[arg(long, default_value = DEFAULT_WORKFLOW_FILE)]
        remote_path: String,

        /// Target repository (owner/name), overrides GITHUB_REPOSITORY
        #[arg(long)]
        repo: Option<String>,

        /// Target branch (base branch with --pull-request)
        #[arg(short, long, default_value = DEFAULT_BRANCH)]
        branch: String,

        /// Commit to a side branch and open a pull request
        #[arg(long)]
        pull_request: bool,

        /// Stop after writing the file
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(cli.verbose, rust_log.as_deref()))
        .init();

    let result = match cli.command {
        Commands::Validate { config } => validate(&config.config),
        Commands::Render { config } => render(&config.config),
        Commands::Generate { config, output } => generate_cmd(&config.config, &output),
        Commands::Publish {
            config,
            output,
            remote_path,
            repo,
            branch,
            pull_request,
            dry_run,
        } => {
            let target = PublishTarget {
                remote_path,
                repo,
                branch,
                pull_request,
                dry_run,
            };
            publish(&config.config, &output, target).await
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

/// RUST_LOG replaces the default level; --verbose always adds debug
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    match rust_log.filter(|s| !s.trim().is_empty()) {
        Some(directives) => {
            let filter = EnvFilter::new(directives);
            if verbose {
                filter.add_directive(tracing::Level::DEBUG.into())
            } else {
                filter
            }
        }
        None if verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("info"),
    }
}

fn validate(config_path: &Path) -> Result<()> {
    let config = FailoverConfig::from_file(config_path)?;

    println!("{} Config '{}' is valid", "✓".green(), config_path.display());
    println!("  Tasks: {}", config.len());
    for task in &config.tasks {
        println!(
            "  - {} [{}] -> {}",
            task.id,
            task.task_type,
            task.task_type.reusable_workflow()
        );
    }
    Ok(())
}

fn render(config_path: &Path) -> Result<()> {
    let (_, content) = render_file(config_path)?;
    print!("{}", content);
    Ok(())
}

fn generate_cmd(config_path: &Path, output: &Path) -> Result<()> {
    let generated = generate(config_path, output)?;
    println!(
        "{} Wrote {} ({} tasks)",
        "✓".green(),
        generated.path.display(),
        generated.config.len()
    );
    Ok(())
}

struct PublishTarget {
    remote_path: String,
    repo: Option<String>,
    branch: String,
    pull_request: bool,
    dry_run: bool,
}

async fn publish(config_path: &Path, output: &Path, target: PublishTarget) -> Result<()> {
    let generated = generate(config_path, output)?;
    println!(
        "{} Wrote {} ({} tasks)",
        "✓".green(),
        generated.path.display(),
        generated.config.len()
    );

    if target.dry_run {
        println!(
            "{} Dry run: would publish {} to branch '{}'",
            "→".cyan(),
            target.remote_path,
            target.branch
        );
        return Ok(());
    }

    // Read back what was written, as that is what gets published
    let content = std::fs::read_to_string(&generated.path)?;

    let settings = GitHubSettings::from_env(target.repo.as_deref())?;
    let repository = settings.repository.to_string();
    let store = GitHubStore::new(settings)?;
    let request = PublishRequest {
        path: target.remote_path,
        content,
        branch: target.branch,
    };

    if target.pull_request {
        let outcome =
            publish_via_pull_request(&store, &request, &PullRequestOptions::default()).await?;
        if outcome.branch_status == BranchStatus::AlreadyExists {
            println!(
                "{} Reusing branch '{}'",
                "→".cyan(),
                outcome.file.branch
            );
        }
        println!(
            "{} {} {} on {}@{}",
            "✓".green(),
            capitalize(&outcome.file.action.to_string()),
            outcome.file.path,
            repository,
            outcome.file.branch
        );
        println!(
            "{} Pull request #{}: {}",
            "✓".green(),
            outcome.pull_request.number,
            outcome.pull_request.html_url.cyan()
        );
    } else {
        let outcome = publish_file(&store, &request).await?;
        println!(
            "{} {} {} on {}@{}",
            "✓".green(),
            capitalize(&outcome.action.to_string()),
            outcome.path,
            repository,
            outcome.branch
        );
    }

    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
