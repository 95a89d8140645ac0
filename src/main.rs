use clap::Parser;
use profile_relay::config::Command;
use profile_relay::core::render;
use profile_relay::core::ConfigProvider;
use profile_relay::domain::ports::Storage;
use profile_relay::utils::error::ErrorSeverity;
use profile_relay::utils::{logger, validation::Validate};
use profile_relay::{CliConfig, LocalStorage, PlatformId, ProfileViewer, TomlConfig, ViewerError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    let mut config = match TomlConfig::from_optional_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file is valid TOML");
            std::process::exit(1);
        }
    };

    if let Some(path) = &cli.storage_path {
        config.set_storage_path(path.clone());
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let (relay, _executor) = profile_relay::start_relay(config.relay_timeout())?;
    let storage = LocalStorage::new(config.storage_path().to_string());
    let viewer = ProfileViewer::new(config.registry()?, storage, relay);

    // A missing file loads as empty. Any other failure leaves the file
    // unread, so only read-only commands may continue.
    if let Err(e) = viewer.load().await {
        if cli.command.is_mutating() {
            exit_with(e);
        }
        tracing::warn!("Showing empty username lists: {}", e);
    }

    if let Err(e) = run(&viewer, cli.command).await {
        exit_with(e);
    }

    Ok(())
}

async fn run<S: Storage>(viewer: &ProfileViewer<S>, command: Command) -> Result<(), ViewerError> {
    match command {
        Command::Add { platform, username } => {
            let id: PlatformId = platform.parse()?;
            let added = viewer.add_username(id, &username).await?;
            println!("✅ Added {} to {}", added, id.display_name());
            println!();

            let report = viewer.render_platform(id).await?;
            print!("{}", render::render_text(&report));
        }
        Command::Remove { platform, username } => {
            let id: PlatformId = platform.parse()?;
            viewer.remove_username(id, &username).await?;
            println!("🗑️ Removed {} from {}", username.trim(), id.display_name());
        }
        Command::List { platform } => {
            for id in selected_platforms(viewer, platform)? {
                let config = viewer.registry().get(id)?;
                let usernames = viewer.usernames(id).await;
                println!("{} ({})", id.display_name(), usernames.len());
                for link in render::username_links(config, &usernames) {
                    println!("  {} <{}>", link.username, link.url);
                }
            }
        }
        Command::Show { platform, json } => {
            let mut reports = Vec::new();
            for id in selected_platforms(viewer, platform)? {
                reports.push(viewer.render_platform(id).await?);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print!("{}", render::render_text(report));
                    println!();
                }
            }
        }
    }

    Ok(())
}

fn selected_platforms<S: Storage>(
    viewer: &ProfileViewer<S>,
    platform: Option<String>,
) -> Result<Vec<PlatformId>, ViewerError> {
    match platform {
        Some(name) => Ok(vec![name.parse()?]),
        None => Ok(viewer.registry().ids()),
    }
}

fn exit_with(e: ViewerError) -> ! {
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
