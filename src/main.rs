use clap::Parser;
use country_days::core::ConfigProvider;
use country_days::domain::ports::Storage;
use country_days::utils::error::ErrorSeverity;
use country_days::utils::{logger, validation::Validate};
use country_days::{BoundaryIndex, CliConfig, EtlEngine, LocalStorage, TimelinePipeline, TimelineError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init(config.verbose, config.json_logs);

    tracing::info!("Starting country-days");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let storage = LocalStorage::default();
    let geocoder = match load_boundaries(&storage, config.boundaries_path()).await {
        Ok(geocoder) => geocoder,
        Err(e) => exit_with(&e),
    };
    let pipeline = TimelinePipeline::new(storage, config, geocoder);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            for (key, countries) in &report.summary.country_counter {
                println!("{}: {:?}", key, countries);
            }
            println!(
                "days_in_year: {}, days_missing: {}, days_guessed: {}",
                report.summary.days_in_year,
                report.summary.days_missing,
                report.summary.days_guessed
            );
            println!("✅ Location history saved to {}", report.output_path);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

async fn load_boundaries(storage: &LocalStorage, path: &str) -> country_days::Result<BoundaryIndex> {
    let bytes = storage.read_file(path).await?;
    BoundaryIndex::from_slice(&bytes)
}

fn exit_with(e: &TimelineError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
