use app_guardian::config::GuardianConfig;
use app_guardian::ipc::{IpcClient, Message, StatusReport, is_daemon_running};
use app_guardian::packages::ShellCatalog;
use app_guardian::permissions::ShellCapabilities;
use app_guardian::presenter::ShellHome;
use app_guardian::store::PrefsFile;
use clap::{Parser, Subcommand, ValueEnum};
use guardian_core::capability::{Capability, CapabilityProvider as _, ServiceStatus, service_status};
use guardian_core::catalog::launchable_apps;
use guardian_core::config::snapshot;
use guardian_core::lifecycle::BootSignal;
use guardian_core::notice::{BlockingNotice, EscapeAction, NoticeContent};
use guardian_core::{Decision, EventKind, ExclusionList, ForegroundEvent, classify};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "guardian")]
#[command(about = "Device-local app blocker", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show monitoring and permission status
    Status,

    /// Show daemon configuration and current block list
    Config,

    /// Dry-run the classifier for one app
    Classify {
        app_id: String,
        /// Event kind token
        #[arg(long, default_value = "window_state_changed")]
        kind: String,
    },

    /// List apps that can be blocked
    Apps,

    /// Open the settings screen for a permission
    Grant { capability: Capability },

    /// Open the settings screen to give up a permission
    Revoke { capability: Capability },

    /// Show the blocking notice for an app
    Notice { app_id: String },

    /// Send a lifecycle signal to the daemon
    Signal { signal: SignalArg },

    /// Handle a boot broadcast
    Boot { action: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SignalArg {
    Connected,
    Interrupt,
    Teardown,
    Shutdown,
}

impl From<SignalArg> for Message {
    fn from(arg: SignalArg) -> Self {
        match arg {
            SignalArg::Connected => Message::Connected,
            SignalArg::Interrupt => Message::Interrupt,
            SignalArg::Teardown => Message::Teardown,
            SignalArg::Shutdown => Message::Shutdown,
        }
    }
}

fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("app_guardian=warn".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli.config.unwrap_or_else(GuardianConfig::config_path);
    let config = GuardianConfig::load_from(&path).unwrap_or_default();

    match cli.command {
        Commands::Status => cmd_status(&config),
        Commands::Config => cmd_config(&config, &path),
        Commands::Classify { app_id, kind } => cmd_classify(&config, app_id, &kind),
        Commands::Apps => cmd_apps(&config)?,
        Commands::Grant { capability } => cmd_grant(&config, capability)?,
        Commands::Revoke { capability } => cmd_revoke(&config, capability)?,
        Commands::Notice { app_id } => cmd_notice(&config, app_id)?,
        Commands::Signal { signal } => cmd_signal(&config, signal.into())?,
        Commands::Boot { action } => cmd_boot(&config, &action)?,
    }

    Ok(())
}

fn yes_no(granted: bool) -> &'static str {
    if granted { "GRANTED" } else { "MISSING" }
}

fn print_capabilities(status: &ServiceStatus) {
    for capability in Capability::ALL {
        println!("  {:<14} {}", capability.name(), yes_no(status.get(capability)));
    }
}

fn cmd_status(config: &GuardianConfig) {
    println!("=== Guardian Status ===\n");

    let client = IpcClient::new(&config.service.socket_path);
    let report = match client.status() {
        Ok(report) => {
            println!("Daemon:     RUNNING");
            report
        }
        Err(_) => {
            println!("Daemon:     STOPPED");
            StatusReport {
                active: false,
                capabilities: service_status(&ShellCapabilities::new(&config.service)),
            }
        }
    };

    println!(
        "Monitoring: {}",
        if report.active { "ACTIVE" } else { "INACTIVE" }
    );

    let prefs = snapshot(&PrefsFile::new(&config.store.path));
    println!(
        "Blocking:   {}",
        if prefs.enabled { "ENABLED" } else { "DISABLED" }
    );
    println!("Blocked apps: {}", prefs.blocked_ids.len());

    println!("\n[Permissions]");
    print_capabilities(&report.capabilities);
}

fn cmd_config(config: &GuardianConfig, path: &std::path::Path) {
    println!("=== Guardian Configuration ===\n");
    println!("Config file: {:?}\n", path);

    println!("[Service]");
    println!("  package: {}", config.service.package);
    println!("  autostart: {}", config.service.autostart);
    println!("  read_timeout: {}ms", config.service.config_read_timeout_ms);
    println!("  socket: {:?}", config.service.socket_path);

    println!("\n[Presenter]");
    println!("  {} -> {}", config.presenter.program, config.presenter.component);

    let prefs_file = PrefsFile::new(&config.store.path);
    println!("\n[Prefs] {:?}", prefs_file.path());
    let prefs = snapshot(&prefs_file);
    println!("  enabled: {}", prefs.enabled);

    let mut blocked: Vec<_> = prefs.blocked_ids.iter().collect();
    blocked.sort();
    for app in blocked {
        println!("  - {}", app);
    }

    println!("\n[Never blocked]");
    let exclusions = ExclusionList::new(&config.service.package);
    let mut excluded: Vec<_> = exclusions.iter().collect();
    excluded.sort();
    for app in excluded {
        println!("  - {}", app);
    }
}

fn cmd_classify(config: &GuardianConfig, app_id: String, kind: &str) {
    let event = ForegroundEvent {
        source_app_id: Some(app_id),
        kind: EventKind::parse(kind),
    };
    let prefs = snapshot(&PrefsFile::new(&config.store.path));
    let exclusions = ExclusionList::new(&config.service.package);

    match classify(&event, &prefs, &exclusions) {
        Decision::Intercept(app) => {
            println!("INTERCEPT {}", app);
            std::process::exit(0);
        }
        Decision::Pass => {
            println!("PASS");
            std::process::exit(1);
        }
    }
}

fn cmd_apps(config: &GuardianConfig) -> color_eyre::eyre::Result<()> {
    let apps = launchable_apps(&ShellCatalog, &config.service.package)?;
    let blocked = snapshot(&PrefsFile::new(&config.store.path)).blocked_ids;

    for app in apps {
        let marker = if blocked.contains(&app.package_name) { "x" } else { " " };
        let system = if app.is_system_app { " (system)" } else { "" };
        println!("[{}] {}{}", marker, app.package_name, system);
    }
    Ok(())
}

fn cmd_grant(config: &GuardianConfig, capability: Capability) -> color_eyre::eyre::Result<()> {
    let capabilities = ShellCapabilities::new(&config.service);

    if capabilities.is_granted(capability) {
        println!("{} is already granted.", capability.name());
        return Ok(());
    }

    capabilities.open_settings(capability)?;
    println!("Opened settings for {}.", capability.name());
    Ok(())
}

fn cmd_revoke(config: &GuardianConfig, capability: Capability) -> color_eyre::eyre::Result<()> {
    let capabilities = ShellCapabilities::new(&config.service);

    if !capabilities.is_granted(capability) {
        println!("{} is not granted.", capability.name());
        return Ok(());
    }

    if let Some(warning) = capability.revoke_warning() {
        println!("{}", warning);
        print!("Type 'yes' to continue: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim() != "yes" {
            println!("Cancelled.");
            return Ok(());
        }
    }

    capabilities.open_settings(capability)?;
    println!("Opened settings for {}.", capability.name());
    Ok(())
}

fn cmd_notice(config: &GuardianConfig, app_id: String) -> color_eyre::eyre::Result<()> {
    let content = NoticeContent::generate(Some(app_id.as_str()), &mut rand::thread_rng());
    let mut notice = BlockingNotice::new(app_id, content);
    let content = notice.content();

    println!("\n=== {} ===\n", content.title());
    println!("{}\n", content.message());
    println!("Expected availability: approximately {}", content.wait_estimate);
    println!("Error: {}\n", content.error_code);
    println!("[ENTER] Back   [t] Try Again Later   [s] Contact Support");
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    let action = match io::stdin().read_line(&mut input) {
        Ok(_) => match input.trim() {
            "t" | "T" => EscapeAction::TryAgain,
            "s" | "S" => EscapeAction::ContactSupport,
            _ => EscapeAction::Back,
        },
        Err(_) => EscapeAction::Back,
    };

    notice.escape(action, &ShellHome::new(&config.presenter));
    Ok(())
}

fn cmd_signal(config: &GuardianConfig, msg: Message) -> color_eyre::eyre::Result<()> {
    IpcClient::new(&config.service.socket_path).send(msg)?;
    println!("Sent {:?}.", msg);
    Ok(())
}

fn cmd_boot(config: &GuardianConfig, action: &str) -> color_eyre::eyre::Result<()> {
    let Some(boot) = BootSignal::parse(action) else {
        println!("Ignoring {}", action);
        return Ok(());
    };

    println!("Device booted ({:?}).", boot);

    if !config.service.autostart {
        println!("Autostart disabled; waiting for the platform to connect.");
        return Ok(());
    }

    if is_daemon_running(&config.service.socket_path) {
        IpcClient::new(&config.service.socket_path).send(Message::Connected)?;
        println!("Monitoring connected.");
    } else {
        println!("Daemon is not running; it connects itself on start.");
    }
    Ok(())
}
