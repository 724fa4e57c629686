use ri_reflect::RuntimeFlavor;

use crate::history::ChangeLog;
use crate::settings::InspectorSettings;

/// What every cache entry needs from its surroundings: the options it
/// obeys and the log it reports writes to.
///
/// Cloning is cheap and clones observe the same settings and log.
#[derive(Debug, Clone)]
pub struct EntryEnv {
    settings: InspectorSettings,
    changes: ChangeLog,
}

impl EntryEnv {
    pub fn new(settings: InspectorSettings, changes: ChangeLog) -> Self {
        Self { settings, changes }
    }

    /// An environment reporting to the process-wide [`ChangeLog`].
    pub fn global(settings: InspectorSettings) -> Self {
        Self::new(settings, ChangeLog::global())
    }

    #[inline]
    pub fn settings(&self) -> &InspectorSettings {
        &self.settings
    }

    #[inline]
    pub fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    /// Whether entries remember the last value they read.
    #[inline]
    pub fn caching(&self) -> bool {
        self.settings.cache_values()
    }

    #[inline]
    pub fn runtime(&self) -> RuntimeFlavor {
        self.settings.runtime()
    }
}

impl Default for EntryEnv {
    fn default() -> Self {
        Self::global(InspectorSettings::default())
    }
}
