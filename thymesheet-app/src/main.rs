//! ThymeSheet license tool.
//!
//! Inspects and changes the license state of this installation. Also
//! generates keys for distribution.
//!
//! Usage:
//!   thymesheet status
//!   thymesheet activate THYME-PREM-XXXX-XXXX
//!   thymesheet generate --kind premium --count 10

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thymesheet_app::{logging, AppConfig, Coordinator, Notifier};
use thymesheet_license::{
    available_features, generate_key, generate_legacy_key, verify, Feature, HardwareId, KeyKind,
    KeyPool, LicenseKey, MachineProfile, LICENSE_SECRET,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "thymesheet")]
#[command(about = "ThymeSheet license and entitlement tool")]
struct Args {
    /// License record file
    #[arg(long, env = "THYMESHEET_LICENSE_FILE")]
    license_file: Option<PathBuf>,

    /// Trial key pool file
    #[arg(long, env = "THYMESHEET_KEY_POOL")]
    key_pool: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current license state
    Status,
    /// Start a trial with a key from the bundled pool
    ActivateTrial,
    /// Activate or upgrade to a license key
    Activate {
        /// The license key
        key: String,
    },
    /// Check whether a feature is available
    CanAccess {
        /// Feature id, e.g. CSV_IMPORT
        feature: String,
    },
    /// List features unlocked by the current license
    Features,
    /// Print this machine's hardware fingerprint
    Fingerprint,
    /// Check a key's format and checksum without activating it
    Verify {
        /// The license key
        key: String,
    },
    /// Generate license keys
    Generate {
        /// Key kind
        #[arg(long, value_enum, default_value = "premium")]
        kind: KindArg,
        /// Number of keys
        #[arg(short, long, default_value_t = 5)]
        count: usize,
    },
    /// Write a trial key pool file
    BuildPool {
        /// Number of trial keys
        #[arg(short, long, default_value_t = 500)]
        count: usize,
        /// Output path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Run activity reminders until interrupted
    Run {
        /// Reminder period in seconds
        #[arg(long, default_value_t = 900)]
        remind_every: u64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Trial,
    Premium,
    Legacy,
}

#[derive(Serialize)]
struct StatusOutput {
    state: &'static str,
    tier: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    days_remaining: Option<u32>,
    needs_activation: bool,
}

struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!(title, "{body}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = AppConfig::new(args.license_file, args.key_pool);
    let engine = config.engine();

    match args.command {
        Command::Status => {
            let state = engine.current_state();
            print_json(&StatusOutput {
                state: state.kind(),
                tier: state.tier().to_string(),
                message: state.message(),
                days_remaining: state.days_remaining(),
                needs_activation: state.needs_activation(),
            })?;
        }
        Command::ActivateTrial => print_json(&engine.activate_trial_report())?,
        Command::Activate { key } => print_json(&engine.activate_report(&key))?,
        Command::CanAccess { feature } => {
            println!("{}", engine.can_access_feature(&feature));
        }
        Command::Features => {
            let tier = engine.current_tier();
            let ids: Vec<&str> = available_features(tier).into_iter().map(Feature::id).collect();
            print_json(&ids)?;
        }
        Command::Fingerprint => {
            let profile = MachineProfile::collect();
            info!(
                mac = profile.mac_address.as_deref().unwrap_or(""),
                platform = %profile.platform,
                hostname = %profile.hostname,
                "Machine profile"
            );
            println!("{}", HardwareId::from_profile(&profile));
        }
        Command::Verify { key } => println!("{}", verify(&LicenseKey::normalize(&key))),
        Command::Generate { kind, count } => {
            let mut rng = rand::thread_rng();
            for _ in 0..count {
                let key = match kind {
                    KindArg::Trial => generate_key(KeyKind::Trial, LICENSE_SECRET, &mut rng),
                    KindArg::Premium => generate_key(KeyKind::Premium, LICENSE_SECRET, &mut rng),
                    KindArg::Legacy => generate_legacy_key(LICENSE_SECRET, &mut rng),
                };
                println!("{key}");
            }
        }
        Command::BuildPool { count, out } => {
            let pool = KeyPool::generate(count, &mut rand::thread_rng());
            fs::write(&out, pool.to_json())
                .with_context(|| format!("Failed to write key pool to {}", out.display()))?;
            info!(path = %out.display(), keys = pool.len(), "Key pool written");
        }
        Command::Run { remind_every } => {
            let mut coordinator = Coordinator::new(Arc::new(engine), Arc::new(LogNotifier));
            info!(state = coordinator.license_state().kind(), "ThymeSheet running");
            coordinator
                .start_activity_reminders(Duration::from_secs(remind_every.max(1)))
                .await;
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            coordinator.shutdown().await;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{json}");
    Ok(())
}
