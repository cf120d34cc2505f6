use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use resample::{
    load_grayscale_square, present, CompareConfig, Comparison, Downscale, ExecutionModel,
    ProcessingContext,
};

#[derive(Parser, Debug)]
#[command(name = "resample")]
#[command(about = "Lanczos-3 downscale of a square grayscale image, timed under each execution model")]
struct Cli {
    /// Square source image (PNG, JPEG or TIFF)
    input: Option<PathBuf>,

    /// YAML file with comparison settings; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target side in pixels
    #[arg(short = 's', long, conflicts_with = "factor")]
    output_side: Option<u32>,

    /// Integer downscale factor
    #[arg(short, long)]
    factor: Option<u32>,

    /// Execution models to run, comma separated
    #[arg(short, long, value_enum, value_delimiter = ',')]
    models: Option<Vec<ExecutionModel>>,

    /// Directory receiving the input and output images
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Base log level, overridden by RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<CompareConfig> {
        let mut config = match &self.config {
            Some(path) => CompareConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => CompareConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = Some(input);
        }
        if let Some(side) = self.output_side {
            config.output_side = Some(side);
        }
        if let Some(factor) = self.factor {
            config.factor = Some(factor);
            config.output_side = None;
        }
        if let Some(models) = self.models {
            config.models = models;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = Some(dir);
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;

    common::setup_logging(&config.log_level, config.log_dir.as_deref());
    config.validate().context("Invalid settings")?;
    tracing::debug!("effective config:\n{}", config.to_yaml()?);

    let input_path = config
        .input
        .as_deref()
        .context("No input image given")?;
    let input = load_grayscale_square(input_path)
        .with_context(|| format!("Failed to load {}", input_path.display()))?;
    present("in", &input, &config.output_dir)?;

    let output_side = config.resolve_output_side(input.width())?;
    let op = Downscale::new(output_side);
    tracing::info!(
        "downscaling {}x{} -> {}x{}",
        input.width(),
        input.height(),
        output_side,
        output_side
    );

    let mut ctx = ProcessingContext::for_models(&config.models);

    let comparison = Comparison::run(&mut ctx, &op, &input, &config.models)
        .context("Downscale failed")?;
    comparison.log_summary();

    for run in &comparison.runs {
        present(
            &format!("out {}", run.model.label()),
            &run.output,
            &config.output_dir,
        )?;
    }

    Ok(())
}
