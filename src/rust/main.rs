use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use logoguard::{
    BrandCatalog, LogoDetector, LogoDetectorBuilder, ModelInfo, ModelManager, OutputActivation,
    Verdict,
};

#[derive(Parser)]
#[command(author, version, about = "Detect fake logos by checking them against the claimed brand", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether a logo image really belongs to the expected brand
    Check(CheckArgs),
    /// Download and verify a model (and optionally its catalog) into the models directory
    Fetch(FetchArgs),
    /// List the brands a catalog can recognize
    Catalog {
        /// Catalog JSON file; defaults to the built-in catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Logo image to check (jpg, png, webp, ...)
    #[arg(short, long)]
    image: PathBuf,

    /// Brand the logo claims to be
    #[arg(short, long)]
    brand: String,

    /// Path to an ONNX model file
    #[arg(long, conflicts_with = "model_name")]
    model: Option<PathBuf>,

    /// Name of a model fetched into the models directory
    #[arg(long, default_value = "logos")]
    model_name: String,

    /// Catalog JSON file matching the model's output order
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// The model outputs raw logits instead of probabilities
    #[arg(long)]
    logits: bool,

    /// Print the verdict as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FetchArgs {
    /// Name to store the model under
    #[arg(long, default_value = "logos")]
    model_name: String,

    #[arg(long)]
    model_url: String,

    /// Hex-encoded SHA-256 of the model file
    #[arg(long)]
    model_sha256: String,

    #[arg(long, requires = "catalog_sha256")]
    catalog_url: Option<String>,

    /// Hex-encoded SHA-256 of the catalog file
    #[arg(long, requires = "catalog_url")]
    catalog_sha256: Option<String>,

    /// Force a fresh download of the model files
    #[arg(short, long)]
    fresh: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Check(args) => check(args),
        Command::Fetch(args) => fetch(args).await,
        Command::Catalog { catalog } => list_catalog(catalog),
    }
}

fn check(args: CheckArgs) -> Result<()> {
    if args.brand.trim().is_empty() {
        bail!("Please enter the expected brand name.");
    }

    let start_time = Instant::now();
    let detector = build_detector(&args).context("Failed to load the logo model")?;
    info!("Detector built in {:.2?}", start_time.elapsed());

    let verdict = detector
        .classify_file(&args.image, &args.brand)
        .with_context(|| format!("Prediction error for {}", args.image.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        render(&verdict);
    }
    Ok(())
}

fn build_detector(args: &CheckArgs) -> Result<LogoDetector> {
    let activation = if args.logits {
        OutputActivation::Logits
    } else {
        OutputActivation::Probabilities
    };
    let mut builder = LogoDetectorBuilder::new().with_output_activation(activation);

    if let Some(catalog) = &args.catalog {
        builder = builder.with_catalog_file(catalog)?;
    }

    builder = match &args.model {
        Some(path) => builder.with_model_file(path)?,
        None => {
            let manager = ModelManager::new_default()?;
            builder.with_managed_model(&manager, &args.model_name)?
        }
    };

    Ok(builder.build()?)
}

fn render(verdict: &Verdict) {
    if verdict.is_low_confidence() {
        println!("Warning: model confidence is low. The logo might be fake or unclear.");
    }

    println!("Logo is {}", verdict.outcome);

    if verdict.is_brand_mismatch() {
        println!(
            "Expected brand '{}' does not match predicted '{}'.",
            verdict.expected_brand, verdict.predicted_label
        );
    }

    println!("  Predicted brand: {}", verdict.predicted_label);
    println!("  Confidence:      {:.2}%", verdict.confidence * 100.0);
    if let Some(similarity) = verdict.similarity {
        println!("  Name similarity: {:.2}", similarity);
    }
}

async fn fetch(args: FetchArgs) -> Result<()> {
    let manager = ModelManager::new_default()?;

    let mut model_info = ModelInfo::new(&args.model_name, &args.model_url, &args.model_sha256);
    if let (Some(url), Some(hash)) = (&args.catalog_url, &args.catalog_sha256) {
        model_info = model_info.with_catalog(url, hash);
    }

    if args.fresh {
        info!("Fresh download requested - removing any existing model files...");
        manager.remove_download(&model_info.name)?;
    }

    manager
        .ensure_model_downloaded(&model_info)
        .await
        .with_context(|| format!("Failed to fetch model '{}'", model_info.name))?;

    println!(
        "Model '{}' stored in {}",
        model_info.name,
        manager.get_model_path(&model_info.name).display()
    );
    Ok(())
}

fn list_catalog(path: Option<PathBuf>) -> Result<()> {
    let catalog = match path {
        Some(path) => BrandCatalog::from_file(&path)?,
        None => BrandCatalog::builtin(),
    };

    println!(
        "{} brands (version {})",
        catalog.len(),
        catalog.version().unwrap_or("unversioned")
    );
    for (index, label) in catalog.labels().iter().enumerate() {
        println!("  {:>3}  {}", index, label);
    }
    Ok(())
}
