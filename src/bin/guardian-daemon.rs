use app_guardian::accessibility::{EventSource as _, LineFeed};
use app_guardian::config::GuardianConfig;
use app_guardian::enforcer::{Outcome, ShellEnforcer};
use app_guardian::ipc::{IpcServer, respond_status};
use clap::Parser;
use color_eyre::eyre::WrapErr as _;
use guardian_core::lifecycle::BootSignal;
use std::path::PathBuf;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "guardian-daemon")]
#[command(about = "Foreground app monitoring daemon", long_about = None)]
struct Args {
    /// Config file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Boot broadcast that triggered this start, if any
    #[arg(long)]
    boot_action: Option<String>,
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("app_guardian=info".parse()?)
                .add_directive("guardian_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    info!("Guardian daemon starting...");

    if let Some(action) = &args.boot_action {
        match BootSignal::parse(action) {
            Some(boot) => info!(?boot, "Device booted - guardian is ready"),
            None => warn!(action = %action, "Unrecognized boot action"),
        }
    }

    let path = args.config.unwrap_or_else(GuardianConfig::config_path);
    let config = match GuardianConfig::load_from(&path) {
        Ok(c) => {
            info!("Configuration loaded from {:?}", path);
            c
        }
        Err(e) => {
            warn!("Failed to load config: {}. Using defaults.", e);
            GuardianConfig::default()
        }
    };

    let ipc_server =
        IpcServer::new(&config.service.socket_path).wrap_err("failed to start IPC server")?;
    let mut ipc_rx = ipc_server.run().wrap_err("failed to run IPC server")?;

    let mut sigterm = signal(SignalKind::terminate()).wrap_err("failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).wrap_err("failed to install SIGINT handler")?;

    let mut enforcer = ShellEnforcer::from_config(&config);

    // Nothing reconnects the service after a reboot except this flag.
    if config.service.autostart {
        enforcer.connect();
    } else {
        info!("Waiting for platform connect signal");
    }

    let mut feed = LineFeed::stdin();
    let mut feed_open = true;

    info!(prefs = ?config.store.path, "Guardian daemon running");

    loop {
        tokio::select! {
            event = feed.next_event(), if feed_open => {
                match event {
                    Ok(Some(event)) => {
                        enforcer.handle_event(&event);
                    }
                    Ok(None) => {
                        info!("Event feed closed");
                        feed_open = false;
                    }
                    Err(e) => {
                        warn!("Event feed failed: {}", e);
                        feed_open = false;
                    }
                }
            }

            Some((msg, stream)) = ipc_rx.recv() => {
                match enforcer.handle_message(msg) {
                    Outcome::Continue => {}
                    Outcome::Status => {
                        // Capability probes shell out; keep them off the event loop.
                        let probe = enforcer.status_probe();
                        tokio::task::spawn_blocking(move || {
                            if let Err(e) = respond_status(stream, probe.report()) {
                                warn!("Failed to answer status request: {}", e);
                            }
                        });
                    }
                    Outcome::Shutdown => break,
                }
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT");
                break;
            }
        }
    }

    info!("Guardian daemon shutting down");
    enforcer.shutdown();
    ipc_server.stop();

    Ok(())
}
