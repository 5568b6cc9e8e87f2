use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use warpevents_core::commands::WarpCommandListener;
use warpevents_core::config::ServerConfig;
use warpevents_core::events::{WarpCreateEvent, WarpDeleteEvent};
use warpevents_core::permissions::PermissionStore;
use warpevents_plugin::{
    Cancellable, EventBus, EventPriority, Player, PlayerCommandPreprocessEvent,
};

/// Feeds command lines from stdin through the warp listener.
///
/// Each line is `<username> <command>` or just `<command>`, which is then
/// issued by the console user.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file, created with defaults if missing
    #[arg(long, default_value = "Config.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    // Setup logging
    let logfile = tracing_appender::rolling::daily("./logs", "warpevents.log");
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("WARPEVENTS_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(logfile.and(std::io::stdout))
        .with_env_filter(env_filter)
        .init();

    let args = Args::parse();
    let config = ServerConfig::load(&args.config)?;
    let permissions = config
        .permissions
        .as_ref()
        .map(PermissionStore::from_config)
        .transpose()
        .context("Failed to load permissions")?;
    if permissions.is_none() {
        warn!("No permissions configured, every player may manage warps");
    }

    let mut bus = EventBus::new();
    WarpCommandListener::new(permissions).register(&mut bus);
    bus.register::<WarpCreateEvent, _>(EventPriority::Monitor, false, |_, event| {
        info!(
            "{} creates warp {:?} (cancelled: {})",
            event.player().username,
            event.warp_name(),
            event.is_cancelled()
        );
        Ok(())
    });
    bus.register::<WarpDeleteEvent, _>(EventPriority::Monitor, false, |_, event| {
        info!(
            "{} deletes warp {:?} (cancelled: {})",
            event.player().username,
            event.warp_name(),
            event.is_cancelled()
        );
        Ok(())
    });

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        let Some((username, message)) = split_console_line(&line, &config.console_username) else {
            continue;
        };
        if config.log_commands {
            info!("{} issued server command: {}", username, message);
        }

        let player = Arc::new(Player::offline(username));
        let mut event = PlayerCommandPreprocessEvent::new(player, message);
        if let Err(err) = bus.call(&mut event) {
            error!("Could not handle command from {}: {:#}", username, err);
            continue;
        }

        if event.is_cancelled() {
            println!("Cancelled: {}", event.message());
        } else {
            println!("Executing: {}", event.message());
        }
    }
    Ok(())
}

/// Splits a console line into the issuing player and the command line.
fn split_console_line<'a>(line: &'a str, console_username: &'a str) -> Option<(&'a str, String)> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }
    if line.starts_with('/') {
        return Some((console_username, line.to_owned()));
    }

    let (username, command) = line.split_once(' ')?;
    if command.is_empty() {
        return None;
    }
    if command.starts_with('/') {
        Some((username, command.to_owned()))
    } else {
        Some((username, format!("/{}", command)))
    }
}

#[cfg(test)]
mod tests {
    use super::split_console_line;

    #[test]
    fn console_lines() {
        assert_eq!(
            split_console_line("/setwarp home", "Console"),
            Some(("Console", "/setwarp home".to_owned()))
        );
        assert_eq!(
            split_console_line("Steve /delwarp  spawn", "Console"),
            Some(("Steve", "/delwarp  spawn".to_owned()))
        );
        assert_eq!(
            split_console_line("Steve setwarp home", "Console"),
            Some(("Steve", "/setwarp home".to_owned()))
        );
        assert_eq!(split_console_line("Steve", "Console"), None);
        assert_eq!(split_console_line("Steve ", "Console"), None);
        assert_eq!(split_console_line("   ", "Console"), None);
        assert_eq!(
            split_console_line(" /setwarp home", "Console"),
            Some(("Console", "/setwarp home".to_owned()))
        );
        assert_eq!(
            split_console_line("  Steve /delwarp home", "Console"),
            Some(("Steve", "/delwarp home".to_owned()))
        );
    }
}
