//! User preferences.

use std::sync::Arc;

use tracing::warn;

use super::PersistentStore;
use crate::Result;
use crate::types::Theme;

/// Store key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Small typed view over preference keys in the store.
pub struct Preferences {
    store: Arc<dyn PersistentStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// The saved theme, or `None` when the user never chose one.
    pub async fn theme(&self) -> Result<Option<Theme>> {
        let Some(bytes) = self.store.get(THEME_KEY).await? else {
            return Ok(None);
        };
        match String::from_utf8_lossy(&bytes).parse() {
            Ok(theme) => Ok(Some(theme)),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable theme preference");
                Ok(None)
            }
        }
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store
            .put(THEME_KEY, theme.as_str().as_bytes().to_vec())
            .await
    }

    /// Flip the theme (unset counts as light) and persist it.
    pub async fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme().await?.unwrap_or_default().toggled();
        self.set_theme(next).await?;
        Ok(next)
    }
}
