use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::config::Config;
use crate::store::Store;

/// Everything a command needs: who is asking, in which zone, against which store.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub tz: Tz,
    pub store: Store,
}

impl Session {
    pub fn open(cfg: &Config) -> Result<Self> {
        let session = Self {
            username: cfg.resolve_username()?,
            tz: cfg.resolve_timezone()?,
            store: Store::open(cfg.resolve_store_path()?),
        };
        debug!(
            user = %session.username,
            tz = %session.tz,
            store = %session.store.path().display(),
            "session opened"
        );
        Ok(session)
    }

    /// Read the clock. Call this once per command and pass the value down.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}
