//! rigdash - Live dashboard for mining testbench telemetry.
//!
//! Subscribes to `<prefix>/snapshot` and renders one panel per device, with
//! pause/light toggles driven over `<prefix>/control` and `<prefix>/check`.

use clap::Parser;
use iced::application;

use rigdash::cli::Args;
use rigdash::{FeedMode, Rigdash};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.load_config()?;

    rigdash_common::init_tracing(&config.logging)?;

    let mode = if args.demo {
        FeedMode::Demo
    } else {
        FeedMode::Zenoh
    };

    tracing::info!(
        mode = ?mode,
        key_prefix = %config.dashboard.key_prefix,
        "Starting rigdash"
    );

    // Run the Iced application
    application(
        move || Rigdash::boot(config.clone(), mode),
        Rigdash::update,
        Rigdash::view,
    )
    .title(Rigdash::title)
    .subscription(Rigdash::subscription)
    .theme(Rigdash::theme)
    .run()
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
