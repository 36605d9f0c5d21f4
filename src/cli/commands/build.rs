//! Build command implementation
//!
//! Implements `image-builder build`: reads a build plan, runs the builder on
//! it and reports progress on standard error.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::HumanDuration;

use crate::core::global_config::GlobalConfig;
use crate::core::image_types::ImageTypes;
use crate::core::progress::ProgressBar;
use crate::infra::dirs::AppDirs;
use crate::infra::plan::PlanSource;
use crate::infra::supervisor::{BuildJob, BuildSupervisor};

/// Build options
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Plan file, or `-` for standard input
    pub plan: String,
    /// Requested image types
    pub types: Vec<String>,
    /// Progress backend name
    pub progress: Option<String>,
    /// Object store override
    pub store: Option<PathBuf>,
    /// Output directory override
    pub output: Option<PathBuf>,
    /// Extra builder environment entries
    pub env: Vec<String>,
    /// Builder program override
    pub builder: Option<String>,
}

/// Effective settings for one build, after config and flags are merged
#[derive(Debug)]
struct BuildSettings {
    progress: String,
    supervisor: BuildSupervisor,
    store: PathBuf,
    output: PathBuf,
    env: Vec<String>,
}

impl BuildSettings {
    fn resolve(config: &GlobalConfig, options: &BuildOptions) -> Self {
        let progress = options
            .progress
            .clone()
            .unwrap_or_else(|| config.progress_kind().to_string());
        let supervisor = match &options.builder {
            Some(program) => BuildSupervisor::new(program.clone()),
            None => BuildSupervisor::from_command(&config.builder_command()),
        };
        let mut env = config.builder.env.clone();
        env.extend(options.env.iter().cloned());

        Self {
            progress,
            supervisor,
            store: options.store.clone().unwrap_or_else(|| config.store()),
            output: options
                .output
                .clone()
                .unwrap_or_else(|| config.output_directory()),
            env,
        }
    }
}

/// Execute the build command
pub async fn execute(options: BuildOptions) -> Result<()> {
    let config = GlobalConfig::load(&AppDirs::new())?;
    let settings = BuildSettings::resolve(&config, &options);
    let image_types = ImageTypes::new(&options.types)?;

    let pb = ProgressBar::new(&settings.progress)?;
    pb.start();
    let result = build(&options, &settings, &image_types, &pb).await;
    pb.stop().await;
    result
}

async fn build(
    options: &BuildOptions,
    settings: &BuildSettings,
    image_types: &ImageTypes,
    pb: &ProgressBar,
) -> Result<()> {
    let started = Instant::now();

    pb.set_pulse("Manifest generation step");
    let source = PlanSource::from_arg(&options.plan);
    let plan = source.read().await?;

    pb.set_pulse("Image generation step");
    tracing::info!(
        "Building {} with {}",
        image_types.names().join(", "),
        settings.supervisor.program()
    );
    let job = BuildJob::new(plan, &settings.store, &settings.output)
        .with_exports(image_types.exports())
        .with_env_entries(settings.env.iter().cloned());
    settings
        .supervisor
        .run(&job, pb)
        .await
        .context("Failed to build image")?;

    pb.set_pulse("Build complete");
    pb.set_status(format!(
        "Build finished in {}, results in {}",
        HumanDuration(started.elapsed()),
        settings.output.display()
    ));
    tracing::info!("Build finished");
    Ok(())
}
