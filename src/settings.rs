//! Hot-swappable screener settings
//!
//! The handle publishes new settings; each detection tick reads the latest
//! published value.

use crate::config::{validate_settings, ScreenerSettings};
use std::sync::Arc;
use tokio::sync::watch;

/// Publishing side of the settings channel
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    tx: Arc<watch::Sender<ScreenerSettings>>,
}

impl SettingsHandle {
    /// Create a handle holding `initial`
    pub fn new(initial: ScreenerSettings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current settings after validating them
    pub fn update(&self, settings: ScreenerSettings) -> anyhow::Result<()> {
        validate_settings(&settings)?;
        tracing::info!(
            min_growth_pct = settings.min_growth_pct,
            lookback_secs = settings.lookback_secs,
            cooldown_secs = settings.cooldown_secs,
            ready = settings.is_ready(),
            "Screener settings updated"
        );
        self.tx.send_replace(settings);
        Ok(())
    }

    /// Copy of the current settings
    pub fn current(&self) -> ScreenerSettings {
        self.tx.borrow().clone()
    }

    /// Reader for the detection loop
    pub fn subscribe(&self) -> SettingsReader {
        SettingsReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Reading side of the settings channel
#[derive(Debug, Clone)]
pub struct SettingsReader {
    rx: watch::Receiver<ScreenerSettings>,
}

impl SettingsReader {
    /// Latest published settings
    pub fn latest(&self) -> ScreenerSettings {
        self.rx.borrow().clone()
    }
}
