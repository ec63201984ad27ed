// pulp-image/src/update.rs
//! Cached "is there a newer release" check.
//!
//! Clock, cache storage and the version lookup are injected so the checker
//! itself is deterministic.
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const CACHE_TTL_MS: u64 = 24 * 60 * 60 * 1000;
const CRATES_IO_URL: &str = "https://crates.io/api/v1/crates/pulp-image";

pub trait Clock {
    fn now_millis(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCache {
    pub update_available: bool,
    pub current_version: String,
    pub latest_version: Option<String>,
    pub timestamp: u64,
}

pub trait CacheStore {
    fn load(&self) -> Option<UpdateCache>;
    fn save(&self, cache: &UpdateCache) -> io::Result<()>;
}

/// JSON file under the per-user config directory.
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("pulp-image").join("update-cache.json")))
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> Option<UpdateCache> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn save(&self, cache: &UpdateCache) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(cache)?;
        std::fs::write(&self.path, json)
    }
}

pub trait VersionSource {
    /// `None` on any network or parse failure.
    fn latest_version(&self) -> Option<String>;
}

pub struct CratesIoSource {
    url: String,
    timeout: Duration,
}

impl CratesIoSource {
    pub fn new() -> Self {
        Self {
            url: CRATES_IO_URL.to_string(),
            timeout: Duration::from_secs(3),
        }
    }
}

impl Default for CratesIoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Deserialize)]
struct CrateInfo {
    max_stable_version: Option<String>,
    max_version: String,
}

impl VersionSource for CratesIoSource {
    fn latest_version(&self) -> Option<String> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let response = agent
            .get(&self.url)
            .set("User-Agent", concat!("pulp-image/", env!("CARGO_PKG_VERSION")))
            .set("Accept", "application/json")
            .call();

        match response {
            Ok(response) => {
                let body: CrateResponse = response.into_json().ok()?;
                Some(body.krate.max_stable_version.unwrap_or(body.krate.max_version))
            }
            Err(e) => {
                log::debug!("Update check failed: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInfo {
    pub update_available: bool,
    pub current_version: String,
    pub latest_version: Option<String>,
    pub cached: bool,
}

pub struct UpdateChecker<C, S, V> {
    clock: C,
    store: S,
    source: V,
}

impl<C: Clock, S: CacheStore, V: VersionSource> UpdateChecker<C, S, V> {
    pub fn new(clock: C, store: S, source: V) -> Self {
        Self { clock, store, source }
    }

    pub fn check(&self, current_version: &str, force: bool) -> UpdateInfo {
        let now = self.clock.now_millis();

        if !force {
            if let Some(cache) = self.store.load() {
                let fresh = now.saturating_sub(cache.timestamp) < CACHE_TTL_MS;
                if fresh && cache.current_version == current_version {
                    return UpdateInfo {
                        update_available: cache.update_available,
                        current_version: cache.current_version,
                        latest_version: cache.latest_version,
                        cached: true,
                    };
                }
            }
        }

        let Some(latest) = self.source.latest_version() else {
            return UpdateInfo {
                update_available: false,
                current_version: current_version.to_string(),
                latest_version: None,
                cached: false,
            };
        };

        let update_available = is_newer_version(current_version, &latest);
        let cache = UpdateCache {
            update_available,
            current_version: current_version.to_string(),
            latest_version: Some(latest.clone()),
            timestamp: now,
        };
        if let Err(e) = self.store.save(&cache) {
            log::debug!("Could not write update cache: {}", e);
        }

        UpdateInfo {
            update_available,
            current_version: current_version.to_string(),
            latest_version: Some(latest),
            cached: false,
        }
    }
}

/// Compares major.minor.patch numerically; a leading `v` is ignored.
pub fn is_newer_version(current: &str, latest: &str) -> bool {
    let parse = |v: &str| -> [u64; 3] {
        let mut parts = [0u64; 3];
        for (slot, piece) in parts.iter_mut().zip(v.trim_start_matches('v').split('.')) {
            let digits: String = piece.chars().take_while(|c| c.is_ascii_digit()).collect();
            *slot = digits.parse().unwrap_or(0);
        }
        parts
    };
    parse(latest) > parse(current)
}

pub fn format_update_message(info: &UpdateInfo) -> Option<String> {
    let latest = info.latest_version.as_deref()?;
    if !info.update_available {
        return None;
    }
    Some(format!(
        "Update available: {} -> {}\nRun: cargo install pulp-image",
        info.current_version, latest
    ))
}
