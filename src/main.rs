use clap::Parser;
use small_parking::app::{OutcomeStatus, SessionReport};
use small_parking::utils::error::{ErrorSeverity, ParkingError};
use small_parking::utils::{logger, validation::Validate};
use small_parking::{CliConfig, FacilityConfig, ScenarioRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting small-parking");
    tracing::debug!("CLI config: {:?}", args);

    if let Err(e) = args.validate() {
        exit_with(&e);
    }

    tracing::info!("📁 Loading facility from: {}", args.config);
    let config = match load_config(&args.config).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_inventory(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no events will be replayed");
        return Ok(());
    }

    let runner = match ScenarioRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => exit_with(&e),
    };
    let report = runner.run();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_report(&report);
    }

    Ok(())
}

async fn load_config(path: &str) -> small_parking::Result<FacilityConfig> {
    let content = tokio::fs::read_to_string(path).await?;
    FacilityConfig::from_toml_str(&content)
}

fn exit_with(e: &ParkingError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}

fn display_inventory(config: &FacilityConfig) {
    println!("🅿️  Facility: {}", config.facility.name);
    println!("   Fare unit: {}", config.fare_unit());
    for group in &config.slots {
        println!("   - {} x {}", group.count.unwrap_or(1), group.class);
    }
    println!(
        "   Total slots: {}, scripted events: {}",
        config.total_slots(),
        config.events.len()
    );
}

fn display_report(report: &SessionReport) {
    println!();
    for outcome in &report.outcomes {
        let line = match &outcome.status {
            OutcomeStatus::Parked { slot } => format!("parked in slot {}", slot),
            OutcomeStatus::Left { fare } => format!("left, fare {}", fare),
            OutcomeStatus::Rejected { reason } => format!("rejected: {}", reason),
        };
        println!("[t+{:>6}s] {:<10} {}", outcome.at_seconds, outcome.plate, line);
    }

    println!();
    println!(
        "✅ Completed sessions: {}, total revenue: {} (per {})",
        report.completed.len(),
        report.total_revenue,
        report.fare_unit
    );
    if !report.still_parked.is_empty() {
        println!("🚗 Still parked: {}", report.still_parked.join(", "));
    }
    for class in &report.availability {
        println!(
            "   size {}: {}/{} free",
            class.class, class.free, class.total
        );
    }
}
