use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn, LevelFilter};
use std::path::PathBuf;
use std::sync::Arc;
use vaultmount::modules::backends::builtin_services;
use vaultmount::{
    available_services, Config, DriveLetterRegistry, MountError, MountHandle, Mounter,
    ProblematicServiceSlot, SystemDriveLetters, SystemEnvironment, VaultSettings,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to the user's config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List mount services and their capabilities
    Services,
    /// List drive letters
    Drives,
    /// Mount a vault and keep it mounted until interrupted
    Mount {
        /// Vault id or display name from the settings file, or a new display name
        vault: String,
        /// Directory to expose
        root: PathBuf,
        /// Mount point (directory or drive letter like X:\)
        #[arg(short = 'm', long = "mount-point")]
        mount_point: Option<PathBuf>,
        /// Mount service id
        #[arg(short = 's', long = "service")]
        service: Option<String>,
        /// Mount read-only
        #[arg(short = 'r', long = "read-only")]
        read_only: bool,
        /// Force unmount on shutdown if the service supports it
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger based on verbose flag
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new().filter_level(log_level).init();

    let config_path = cli
        .config
        .clone()
        .or_else(Config::default_path)
        .ok_or_else(|| anyhow!("No config directory, pass --config"))?;
    let config = Config::load(&config_path)?;

    match cli.command {
        Commands::Services => {
            let available = available_services();
            for service in builtin_services() {
                let supported = available.iter().any(|s| s.id() == service.id());
                println!("{} ({})", service.id(), service.display_name());
                println!("  Supported: {}", supported);
                println!("  Capabilities: {}", service.capabilities());
                let flags = service.default_mount_flags();
                if !flags.is_empty() {
                    println!("  Default flags: {}", flags);
                }
                println!();
            }
        }
        Commands::Drives => {
            let drive_letters = SystemDriveLetters;
            let occupied = drive_letters.occupied();
            let all = drive_letters.all();
            if all.is_empty() {
                println!("No drive letters on this platform");
            }
            for letter in all {
                let state = if occupied.contains(&letter) {
                    "occupied"
                } else {
                    "available"
                };
                println!("{}  {}", letter.display(), state);
            }
        }
        Commands::Mount {
            vault,
            root,
            mount_point,
            service,
            read_only,
            force,
        } => {
            let mut vault_settings = config
                .vault(&vault)
                .cloned()
                .unwrap_or_else(|| VaultSettings::new(vault.clone()));
            if mount_point.is_some() {
                vault_settings.mount_point = mount_point;
            }
            if service.is_some() {
                vault_settings.mount_service = service;
            }
            vault_settings.read_only |= read_only;

            let root = root
                .canonicalize()
                .with_context(|| format!("Vault root {:?} not found", root))?;

            let mounter = Mounter::new(
                Arc::new(SystemEnvironment::new(&config.settings)),
                Arc::new(SystemDriveLetters),
                config.settings.clone(),
                available_services(),
                Arc::new(ProblematicServiceSlot::new()),
            );

            let mut handle = match mounter.mount(&vault_settings, &root) {
                Ok(handle) => handle,
                Err(e) => {
                    if let Some(cleanup) = e.cleanup() {
                        cleanup.run();
                    }
                    return Err(report(e));
                }
            };
            match handle.mount_point() {
                Some(mount_point) => println!("Mounted at {}", mount_point.display()),
                None => println!("Mounted"),
            }

            wait_for_shutdown().await?;
            info!("Received shutdown signal, unmounting...");
            unmount(&mut handle, force)?;
        }
    }

    Ok(())
}

fn report(e: MountError) -> anyhow::Error {
    if let MountError::DriverRestartRequired { .. } = e {
        error!("Restart the application before using a different FUSE driver");
    }
    anyhow::Error::new(e).context("Mount failed")
}

fn unmount(handle: &mut MountHandle, force: bool) -> Result<()> {
    if force && handle.supports_unmount_forced() {
        return handle.unmount_forced().context("Forced unmount failed");
    }
    if let Err(e) = handle.unmount() {
        if !handle.supports_unmount_forced() {
            return Err(e).context("Unmount failed");
        }
        warn!("Unmount failed ({}), forcing", e);
        handle.unmount_forced().context("Forced unmount failed")?;
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
