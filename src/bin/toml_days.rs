use anyhow::Context;
use clap::Parser;
use country_days::core::ConfigProvider;
use country_days::domain::ports::Storage;
use country_days::domain::services::parse_years;
use country_days::utils::error::ErrorSeverity;
use country_days::utils::{logger, validation::Validate};
use country_days::{BoundaryIndex, EtlEngine, LocalStorage, TimelinePipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-days")]
#[command(about = "Per-day country timeline driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "country-days.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the years from the config file
    #[arg(long)]
    years: Option<String>,

    /// Override the preferred country from the config file
    #[arg(long)]
    preferred_country: Option<String>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 初始化日誌
    logger::init(args.verbose || config.verbose(), config.json_logs());
    tracing::info!("🚀 Starting TOML-based country-days run");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(years) = args.years {
        tracing::info!("🔧 Years overridden to: {}", years);
        config.run.years = Some(years);
    }
    if let Some(country) = args.preferred_country {
        tracing::info!("🔧 Preferred country overridden to: {}", country);
        config.run.preferred_country = Some(country);
    }

    config.validate().context("Configuration validation failed")?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, args.dry_run);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return perform_dry_run(&config);
    }

    let storage = LocalStorage::default();
    let boundaries = storage
        .read_file(config.boundaries_path())
        .await
        .with_context(|| format!("Failed to read boundaries '{}'", config.boundaries_path()))?;
    let geocoder = BoundaryIndex::from_slice(&boundaries)?;

    let pipeline = TimelinePipeline::new(storage, config, geocoder);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            println!("✅ Run completed successfully!");
            for (key, countries) in &report.summary.country_counter {
                println!("  {}: {:?}", key, countries);
            }
            println!(
                "  days: {}, missing: {}, guessed: {}",
                report.summary.days_in_year,
                report.summary.days_missing,
                report.summary.days_guessed
            );
            println!("📁 Output saved to: {}", report.output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

fn display_config_summary(config: &TomlConfig, dry_run: bool) {
    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run_name());
    println!("  Years: {}", config.years());
    println!("  Input: {}", config.input_path());
    println!("  Boundaries: {}", config.boundaries_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if let Some(country) = config.preferred_country() {
        println!("  Preferred Country: {}", country);
    }
    if let Some(as_of) = config.as_of() {
        println!("  As Of: {}", as_of);
    }

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let years = parse_years(config.years())?;
    println!("📅 Years ({}):", years.len());
    for year in &years {
        println!("  {}", year);
    }

    println!();
    println!("🗺️ Custom Regions (checked in order):");
    for region in config.custom_regions() {
        println!(
            "  {}: lat {}..{}, lng {}..{}",
            region.name, region.lat1, region.lat2, region.lng1, region.lng2
        );
    }

    if let Some(summary) = config.summary_path() {
        println!();
        println!("💾 Summary: {}", summary);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
