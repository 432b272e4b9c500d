use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;

use wtpc::display::{format_countdown, format_price, format_updated, TerminalListener};
use wtpc::{
    config, AsyncPoller, Credentials, DesktopNotifier, NoopNotifier, Notifier, PollOutcome,
    Region, SettingsStore, Wtpc, WtpcBuilder,
};

#[derive(Parser, Debug)]
#[command(name = "wtpc", version, about = "WoW Token price checker")]
struct Cli {
    /// Directory holding user.toml and app.toml
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout_secs: u64,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save API client credentials and preferences
    Configure {
        #[arg(long)]
        client_id: String,
        #[arg(long)]
        client_secret: String,
        /// One of us, eu, kr, tw
        #[arg(long, value_parser = parse_region)]
        region: Option<Region>,
        /// Raise a desktop notification when the price changes
        #[arg(long)]
        notify: Option<bool>,
    },
    /// Print the stored settings
    Show,
    /// Fetch the current price once
    Check,
    /// Poll continuously until interrupted
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 2)]
        interval_secs: u64,
        /// Never raise desktop notifications
        #[arg(long)]
        no_notify: bool,
    },
    /// Clear all stored settings and the cached token
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    wtpc::logging::init_logging(cli.quiet, cli.log_json);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!(event = "wtpc.cli.failed", error = %e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> wtpc::Result<ExitCode> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(config::default_data_dir);
    let timeout = Duration::from_secs(cli.timeout_secs);

    match cli.command {
        Commands::Configure {
            client_id,
            client_secret,
            region,
            notify,
        } => {
            let mut store = SettingsStore::open(&data_dir)?;
            let current = store.credentials();
            let credentials = Credentials::new(&client_id, &client_secret)
                .with_region(region.unwrap_or(current.region))
                .with_notify_on_change(notify.unwrap_or(current.notify_on_change));
            store.set_credentials(credentials)?;
            println!("Saved settings to {}", store.user_settings_path().display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Show => {
            let store = SettingsStore::open(&data_dir)?;
            print_settings(&store);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            let client = builder(&data_dir, timeout).build()?;
            require_credentials(&client)?;
            let mut poller = client.into_poller();
            match poller.check_now() {
                PollOutcome::Updated(update) => {
                    println!("{} gold", format_price(update.sample.price));
                    println!("{}", format_updated(update.sample.observed_at, &chrono::Local));
                    println!(
                        "Next update {}",
                        format_countdown(update.next_expected_update, chrono::Utc::now())
                    );
                    Ok(ExitCode::SUCCESS)
                }
                PollOutcome::Failed(e) => Err(e),
                PollOutcome::Skipped => Ok(ExitCode::FAILURE),
            }
        }
        Commands::Watch {
            interval_secs,
            no_notify,
        } => {
            let builder = builder(&data_dir, timeout)
                .poll_interval(Duration::from_secs(interval_secs.max(1)));
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(watch(builder, no_notify))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Reset => {
            let mut store = SettingsStore::open(&data_dir)?;
            store.clear()?;
            println!("Cleared settings in {}", data_dir.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn parse_region(value: &str) -> Result<Region, String> {
    value.parse().map_err(|e: wtpc::WtpcError| e.to_string())
}

fn builder(data_dir: &std::path::Path, timeout: Duration) -> WtpcBuilder {
    Wtpc::builder().data_dir(data_dir).timeout(timeout)
}

fn require_credentials(client: &Wtpc) -> wtpc::Result<()> {
    if client.settings().has_credentials() {
        Ok(())
    } else {
        Err(wtpc::WtpcError::InvalidArgument(
            "no credentials stored; run `wtpc configure --client-id <ID> --client-secret <SECRET>` first".into(),
        ))
    }
}

async fn watch(builder: WtpcBuilder, no_notify: bool) -> wtpc::Result<()> {
    let poller = AsyncPoller::build(builder).await?;
    let mut listener = TerminalListener::new(std::io::stdout());
    let notifier: &dyn Notifier = if no_notify {
        &NoopNotifier
    } else {
        &DesktopNotifier
    };

    let result = poller
        .run(&mut listener, notifier, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    poller.close().await?;
    result
}

fn print_settings(store: &SettingsStore) {
    let credentials = store.credentials();
    let token = store.token_state();
    println!("Data directory : {}", store.data_dir.display());
    println!("Client ID      : {}", credentials.client_id);
    println!("Client secret  : {}", credentials.masked_secret());
    println!(
        "Region         : {} ({})",
        credentials.region,
        credentials.region.namespace()
    );
    println!("Notifications  : {}", credentials.notify_on_change);
    match token.expires_at {
        Some(expires_at) if token.is_valid_at(chrono::Utc::now()) => {
            println!("Access token   : cached, expires {}", expires_at)
        }
        Some(expires_at) => println!("Access token   : expired at {}", expires_at),
        None => println!("Access token   : none"),
    }
}
