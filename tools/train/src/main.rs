//! Training CLI for the bird-or-forest pipeline.
//!
//! One end-to-end run: load the YAML configuration, discover labeled
//! images, build the seeded train/validation split, fine-tune the
//! classifier, validate, and report metrics plus confusion-matrix
//! artifacts.

use anyhow::{Context, Result};
use bof_core::{setup_cli_logging, PipelineConfig};
use bof_dataset::{build_batches, FolderDataset, LabeledImageFolder, RandomSplitter, SquishResize};
use bof_report::{resolve_repo_root, save_confusion_matrix, MetricsSink};
use bof_training::{evaluate, fine_tune, FineTuneConfig, ImageClassifier};
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::tensor::backend::Backend as _;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// CPU backend for validation and inference.
type DefaultBackend = NdArray;
/// Autodiff backend for fine-tuning.
type TrainingBackend = Autodiff<DefaultBackend>;

/// Fine-tune an image classifier on a labeled image directory.
#[derive(Parser, Debug)]
#[command(
    name = "train",
    about = "Fine-tune an image classifier on a labeled image directory"
)]
struct Args {
    /// Path to the pipeline configuration file (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Validate the configuration and exit
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_cli_logging(args.verbose)?;

    let config = PipelineConfig::load(&args.config).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    print_config_summary(&config);

    if args.dry_run {
        info!("Configuration validated successfully (dry run)");
        return Ok(());
    }

    run_pipeline(&config)
}

fn print_config_summary(config: &PipelineConfig) {
    info!("Configuration:");
    info!("  Data dir: {}", config.data.raw_data_path.display());
    info!("  Seed: {}", config.base.random_state);
    info!("  Validation size: {}", config.data_block.validation_size);
    info!("  Image size: {}", config.data_block.img_resize_value);
    info!("  Batch size: {}", config.data_block.batch_size);
    info!("  Epochs: {}", config.training.epochs);
    info!("  Learning rate: {}", config.training.learning_rate);
    info!("  Save metrics: {}", config.report.save_metrics);
}

fn run_pipeline(config: &PipelineConfig) -> Result<()> {
    let device = NdArrayDevice::default();
    TrainingBackend::seed(config.base.random_state);

    // Discover and split.
    let folder = LabeledImageFolder::scan(&config.data.raw_data_path)
        .context("Failed to load dataset")?;
    let vocab = folder.vocab().clone();
    let num_classes = vocab.len();

    let splitter = RandomSplitter::new(
        config.data_block.validation_size,
        config.base.random_state,
    )?;
    let (train_samples, valid_samples) = splitter.split(folder.samples());
    info!(
        "Split {} samples into {} train / {} validation",
        folder.len(),
        train_samples.len(),
        valid_samples.len()
    );

    // Preprocess and batch.
    let resize = SquishResize::new(config.data_block.img_resize_value)?;
    let train_dataset = FolderDataset::new(train_samples, resize);
    let valid_dataset = FolderDataset::new(valid_samples, resize);

    let spinner = loading_spinner("Loading and batching images");
    let train_batches = build_batches::<TrainingBackend>(
        &train_dataset,
        config.data_block.batch_size,
        &device,
    )
    .context("Failed to build training batches")?;
    let valid_batches = build_batches::<DefaultBackend>(
        &valid_dataset,
        config.data_block.batch_size,
        &device,
    )
    .context("Failed to build validation batches")?;
    spinner.finish_with_message(format!(
        "{} train batches, {} validation batches",
        train_batches.len(),
        valid_batches.len()
    ));

    // Build the model, optionally from pretrained weights.
    let mut model = ImageClassifier::<TrainingBackend>::new(num_classes, &device);
    if let Some(path) = &config.training.pretrained_path {
        info!("Loading pretrained weights from {}", path.display());
        model = model.load_weights(path, &device)?;
    }

    // Fine-tune and validate.
    let fine_tune_config = FineTuneConfig {
        epochs: config.training.epochs,
        learning_rate: config.training.learning_rate,
        weight_decay: config.training.weight_decay,
    };
    let (model, _history) = fine_tune(model, &train_batches, &fine_tune_config)?;

    let outcome = evaluate(&model.valid(), &valid_batches, num_classes)?;

    // Report.
    if config.report.save_metrics {
        let repo_root = resolve_repo_root(config.report.repo_root.as_deref())
            .context("Failed to resolve repository root")?;
        MetricsSink::json_under_root(&repo_root).report(&outcome.metrics)?;

        let reports_dir = repo_root.join("bird_or_forest").join("reports");
        save_confusion_matrix(&outcome.confusion, vocab.names(), &reports_dir)?;
    } else {
        MetricsSink::Console.report(&outcome.metrics)?;
    }

    info!("Training run completed");
    Ok(())
}

fn loading_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    // Tick from a background thread; the batch build blocks this one.
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
