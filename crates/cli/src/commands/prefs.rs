//! Preference commands.

use clap::ValueEnum;
use parfumerie_client::Result;

use super::Context;

/// Requested dark-mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DarkMode {
    On,
    Off,
    Toggle,
}

/// Apply `change` if given, then print the current setting.
pub fn dark_mode(ctx: &Context, change: Option<DarkMode>) -> Result<()> {
    let prefs = ctx.preferences();
    let enabled = match change {
        None => prefs.dark_mode(),
        Some(DarkMode::On) => {
            prefs.set_dark_mode(true)?;
            true
        }
        Some(DarkMode::Off) => {
            prefs.set_dark_mode(false)?;
            false
        }
        Some(DarkMode::Toggle) => prefs.toggle_dark_mode()?,
    };

    println!("Dark mode: {}", if enabled { "on" } else { "off" });
    Ok(())
}
