use std::time::Duration;

use color_eyre::eyre::Result;

use flight_chat::app;
use flight_chat::channel::MpscChannel;
use flight_chat::chat::{ChatViewState, LocalClock};
use flight_chat::cli::Cli;
use flight_chat::config::ConfigManager;
use flight_chat::logging;
use flight_chat::script;
use flight_chat::session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };

    if cli.init_config {
        config.write_default_config()?;
        println!("Wrote {}", config.config_dir().join("config.toml").display());
        return Ok(());
    }

    // CLI flags win over config
    let app_config = config.app_config_mut();
    if let Some(variant) = cli.variant {
        app_config.chat.variant = variant;
    }
    if let Some(delay) = cli.delay_ms {
        app_config.chat.replay_delay_ms = delay;
    }
    if let Some(level) = &cli.log_level {
        app_config.general.log_level = level.clone();
    }
    if let Some(file) = &cli.log_file {
        app_config.general.log_file = Some(file.clone());
    }

    let app_config = config.app_config().clone();
    // The interface owns the terminal, so interactive runs always log to a file.
    let log_file = match (&app_config.general.log_file, cli.tui) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(config.default_log_file()),
        (None, false) => None,
    };
    let _log_guard = logging::init(&app_config.general.log_level, log_file.as_deref())?;

    tracing::info!(variant = %app_config.chat.variant, "Starting flight-chat");

    let (channel, outbound) = MpscChannel::new();
    let view = ChatViewState::new(
        app_config.chat.variant,
        Box::new(channel),
        Box::new(LocalClock::new(app_config.chat.timestamp_format.clone())),
    );
    let mut session = Session::new(view);

    if cli.tui {
        // stdin belongs to the terminal here, so only an explicit script is replayed
        let inputs = match cli.script.clone() {
            Some(path) => {
                let delay = Duration::from_millis(app_config.chat.replay_delay_ms);
                script::spawn_reader(Some(path), delay).await?
            }
            None => tokio::sync::mpsc::unbounded_channel().1,
        };
        let mut app = app::App::new(session)?;
        app.run(inputs, outbound).await?;
    } else {
        let inputs = script::spawn_reader(cli.script.clone(), Duration::ZERO).await?;
        let mut stdout = std::io::stdout();
        app::run_headless(&mut session, inputs, outbound, &mut stdout).await?;
    }

    Ok(())
}
