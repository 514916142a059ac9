mod audit;
mod cache;
mod correct;
mod enrich;
mod selection;
mod times;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cocotte_core::CocotteConfig;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "cocotte")]
#[command(about = "Recipe graph tooling", long_about = None)]
struct Cli {
    /// Directory of {slug}.recipe.json files (default: $COCOTTE_RECIPES_DIR or ./recipes)
    #[arg(long, global = true)]
    recipes_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report every data-quality issue across the recipe directory
    Audit {
        /// Emit the full report as JSON instead of markdown
        #[arg(long)]
        json: bool,
        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check that recipes construct; fails if any has a blocking issue
    Validate {
        /// Recipe slugs (default: all)
        slugs: Vec<String>,
    },
    /// Compute critical-path preparation times
    Times {
        /// Recipe slugs (default: all)
        slugs: Vec<String>,
        /// Minutes assumed for steps without a duration
        #[arg(long)]
        fallback_minutes: Option<f64>,
        /// Write the times back into each recipe
        #[arg(long)]
        write: bool,
    },
    /// Compute diets, seasons and times, and optionally nutrition
    Enrich {
        /// Recipe slugs (default: all)
        slugs: Vec<String>,
        /// Also estimate nutrition per serving
        #[arg(long)]
        nutrition: bool,
        /// Nutrition provider (default: $COCOTTE_NUTRITION_PROVIDER). Supported: fake
        #[arg(long)]
        provider: Option<String>,
        /// Enrichment cache file (default: $COCOTTE_CACHE_PATH or ~/.cocotte/enrichment-cache.json)
        #[arg(long)]
        cache: Option<PathBuf>,
        /// Print results without writing recipes
        #[arg(long)]
        dry_run: bool,
    },
    /// Repair step references that are a few edits away from a known id
    Correct {
        /// Recipe slugs (default: all)
        slugs: Vec<String>,
        /// Largest edit distance to accept
        #[arg(long)]
        max_distance: Option<usize>,
        /// Print corrections without writing recipes
        #[arg(long)]
        dry_run: bool,
    },
    /// Show entry counts of the enrichment cache
    CacheStats {
        /// Enrichment cache file (default: $COCOTTE_CACHE_PATH or ~/.cocotte/enrichment-cache.json)
        #[arg(long)]
        cache: Option<PathBuf>,
        /// Remove every cached entry
        #[arg(long)]
        clear: bool,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = CocotteConfig::from_env().context("Invalid configuration")?;
    if let Some(dir) = cli.recipes_dir {
        config.recipes_dir = dir;
    }

    match cli.command {
        Commands::Audit { json, output } => {
            audit::audit(&config.recipes_dir, json, output.as_deref())?;
        }
        Commands::Validate { slugs } => {
            let summary = audit::validate(&config.recipes_dir, &slugs)?;
            if summary.blocked > 0 {
                anyhow::bail!(
                    "{} of {} recipes failed validation",
                    summary.blocked,
                    summary.checked
                );
            }
        }
        Commands::Times {
            slugs,
            fallback_minutes,
            write,
        } => {
            if let Some(minutes) = fallback_minutes {
                anyhow::ensure!(
                    minutes.is_finite() && minutes >= 0.0,
                    "--fallback-minutes must be a non-negative number, got {}",
                    minutes
                );
                config.fallback_step_minutes = minutes;
            }
            times::times(&config.recipes_dir, &slugs, &config.timing_options(), write)?;
        }
        Commands::Enrich {
            slugs,
            nutrition,
            provider,
            cache: cache_path,
            dry_run,
        } => {
            if let Some(path) = cache_path {
                config.cache_path = path;
            }
            if provider.is_some() {
                config.nutrition_provider = provider;
            }
            enrich::enrich(&config, &slugs, nutrition, dry_run).await?;
        }
        Commands::Correct {
            slugs,
            max_distance,
            dry_run,
        } => {
            if let Some(distance) = max_distance {
                config.max_reference_distance = distance;
            }
            correct::correct(
                &config.recipes_dir,
                &slugs,
                config.max_reference_distance,
                dry_run,
            )?;
        }
        Commands::CacheStats { cache: path, clear } => {
            let path = path.unwrap_or(config.cache_path);
            cache::cache_stats(&path, clear)?;
        }
    }

    Ok(())
}
