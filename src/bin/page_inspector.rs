use clap::Parser;
use profile_relay::adapters::http::{build_client, SafeBrowsingClient};
use profile_relay::core::inspector::InspectionReport;
use profile_relay::core::ConfigProvider;
use profile_relay::domain::ports::ThreatLookup;
use profile_relay::utils::{logger, validation::Validate};
use profile_relay::{PageInspector, TomlConfig};

#[derive(Parser)]
#[command(name = "page-inspector")]
#[command(about = "Check a page for HTTPS, mixed content, insecure forms, threats and trackers")]
struct Args {
    /// Page to inspect
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "profile-relay.toml")]
    config: String,

    /// Skip the external threat-list lookup
    #[arg(long)]
    skip_threat_check: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = TomlConfig::from_optional_file(&args.config)?;
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let inspector = PageInspector::new(config.tracker_patterns())?;
    let (relay, _executor) = profile_relay::start_relay(config.relay_timeout())?;

    let threats = match config.safe_browsing() {
        Some(settings) if !args.skip_threat_check => {
            Some(SafeBrowsingClient::new(build_client()?, settings))
        }
        Some(_) => None,
        None => {
            tracing::info!("No threat-list API key configured, skipping reputation check");
            None
        }
    };

    let report = match inspector
        .inspect_url(
            &relay,
            threats.as_ref().map(|t| t as &dyn ThreatLookup),
            &args.url,
        )
        .await
    {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("❌ Inspection failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(2);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &InspectionReport) {
    println!("🔍 {}", report.url);
    println!("{}", report.status.message());
    println!();
    println!("  Level: {:?} ({})", report.status.level, report.status.level.color());
    println!("  Mixed content references: {}", report.signals.mixed_content);
    println!("  Insecure forms: {}", report.signals.insecure_forms);
    println!("  Tracking scripts: {}", report.signals.tracking_scripts);
    println!("  Threat list match: {}", report.flagged);
}
