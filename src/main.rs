use clap::{Parser, Subcommand};
use lssd_sync::utils::{logger, validation::Validate};
use lssd_sync::{PostgrestStore, RealtimeChannel, RosterData, SupabaseConfig, SyncService};

#[derive(Parser)]
#[command(name = "lssd-sync")]
#[command(about = "Sync tool for the LSSD roster record in Supabase")]
struct Cli {
    #[arg(long, help = "Enable verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify connectivity, creating the table when possible
    Init,
    /// Print the current roster payload as JSON
    Load,
    /// Save a payload read from a JSON file
    Save {
        #[arg(long)]
        file: std::path::PathBuf,
    },
    /// Print each remote change as a JSON line until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config = match SupabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ {e}");
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {e}");
        eprintln!("❌ {e}");
        std::process::exit(1);
    }

    match cli.command {
        Command::Init => {
            let service = SyncService::new(PostgrestStore::new(config));
            if !service.init_database().await {
                std::process::exit(1);
            }
        }
        Command::Load => {
            let service = SyncService::new(PostgrestStore::new(config));
            let data = service.load_data().await;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Save { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let payload: RosterData = serde_json::from_str(&raw)?;

            let service = SyncService::new(PostgrestStore::new(config));
            if !service.save_data(&payload).await {
                eprintln!("❌ Save failed, see log for details");
                std::process::exit(1);
            }
            println!("✅ Saved {}", file.display());
        }
        Command::Watch => {
            let channel = RealtimeChannel::new(config);
            let subscription = channel
                .subscribe(|data| match serde_json::to_string(&data) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!("unprintable payload: {e}"),
                })
                .await?;

            tracing::info!("watching lssd_data for changes (Ctrl-C to stop)");
            tokio::signal::ctrl_c().await?;
            subscription.unsubscribe().await;
        }
    }

    Ok(())
}
