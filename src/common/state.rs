// Application state shared across all modules

use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::i18n::{Catalog, Locale};
use crate::services::IdentityProvider;

/// Immutable per-process state handed to every handler through `Extension`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub identity: Arc<dyn IdentityProvider>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(config: AppConfig, identity: Arc<dyn IdentityProvider>, catalog: Catalog) -> Self {
        Self {
            config: Arc::new(config),
            identity,
            catalog: Arc::new(catalog),
        }
    }

    /// Configured default locale, English when the setting names none we ship
    pub fn default_locale(&self) -> Locale {
        Locale::from_tag(&self.config.default_locale).unwrap_or(Locale::En)
    }
}
