use std::{
    str::FromStr,
    sync::{Arc, LazyLock, RwLock},
};

use log::{error, warn};
use preferences::{AppInfo, Preferences, PreferencesMap};

const PREFS_PATH: &str = "fmc";
const APP_INFO: AppInfo = AppInfo {
    name: "kelpie-fmc",
    author: "shartrec.com",
};

// Preference constants
pub const AIRPORTS_PATH: &str = "Navdata.airports";
pub const NAVAIDS_PATH: &str = "Navdata.navaids";
pub const FIXES_PATH: &str = "Navdata.fixes";
pub const AIRWAYS_PATH: &str = "Navdata.airways";
pub const PROCEDURES_PATH: &str = "Navdata.procedures";
pub const PROCEDURES_XML_DIR: &str = "Navdata.proceduresXmlDir";
pub const INDEX_PATH: &str = "Navdata.index";
pub const ROUTE_DIRECTORY: &str = "Route.directory";
pub const TURN_RADIUS_NM: &str = "Fmc.turnRadiusNm";

static MANAGER: LazyLock<PreferenceManager> = LazyLock::new(|| PreferenceManager {
    preferences: match PreferencesMap::<String>::load(&APP_INFO, PREFS_PATH) {
        Ok(map) => Arc::new(RwLock::new(map)),
        Err(e) => {
            warn!("Error opening preferences {}", e);
            Arc::new(RwLock::new(PreferencesMap::new()))
        }
    },
    path: PREFS_PATH,
    persistent: true,
});

pub struct PreferenceManager {
    preferences: Arc<RwLock<PreferencesMap>>,
    path: &'static str,
    persistent: bool,
}

impl PreferenceManager {
    /// A manager that never touches the preferences file.
    pub fn in_memory() -> Self {
        PreferenceManager {
            preferences: Arc::new(RwLock::new(PreferencesMap::new())),
            path: PREFS_PATH,
            persistent: false,
        }
    }

    pub fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        let prefs = self.preferences.read().ok()?;
        prefs.get(key).and_then(|s| s.parse::<T>().ok())
    }

    pub fn put<T: ToString>(&self, key: &str, value: T) {
        if let Ok(mut prefs) = self.preferences.write() {
            prefs.insert(key.to_string(), value.to_string());
        }
        self.store();
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut prefs) = self.preferences.write() {
            prefs.remove(key);
        }
        self.store();
    }

    pub fn clear(&self) {
        if let Ok(mut prefs) = self.preferences.write() {
            prefs.clear();
        }
        self.store();
    }

    fn store(&self) {
        if !self.persistent {
            return;
        }
        if let Ok(prefs) = self.preferences.read() {
            if let Err(e) = prefs.save(&APP_INFO, self.path) {
                error!("Unable to save preferences {}", e);
            }
        }
    }
}

pub fn manager() -> &'static PreferenceManager {
    &MANAGER
}
