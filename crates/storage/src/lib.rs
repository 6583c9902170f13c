use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{info, warn};
use vista_core::{CatalogError, NavigationSession, PoiStore, SessionEntry};

pub const CATALOG_PATH_ENV: &str = "VISTA_CATALOG_PATH";
pub const DEFAULT_CATALOG_PATH: &str = "catalog/jeju_pois.json";

pub fn catalog_path_from_env() -> String {
    std::env::var(CATALOG_PATH_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string())
}

pub fn try_load_catalog(path: impl AsRef<Path>) -> Result<PoiStore, CatalogError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|err| CatalogError::Missing(format!("{}: {err}", path.display())))?;
    PoiStore::from_json_str(&raw)
}

#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub store: PoiStore,
    pub degraded: bool,
}

/// Loads the catalog, falling back to an empty store when it cannot be read.
pub fn load_catalog(path: impl AsRef<Path>) -> CatalogLoad {
    let path = path.as_ref();
    match try_load_catalog(path) {
        Ok(store) => {
            info!(path = %path.display(), pois = store.len(), "catalog loaded");
            CatalogLoad {
                store,
                degraded: false,
            }
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "catalog unavailable, continuing with empty store");
            CatalogLoad {
                store: PoiStore::empty(),
                degraded: true,
            }
        }
    }
}

pub trait SessionRepository: Send + Sync {
    async fn append_entry(&self, session_id: &str, entry: SessionEntry) -> Result<()>;
    async fn load_session(&self, session_id: &str) -> Result<Option<NavigationSession>>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<String, NavigationSession>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for MemoryStore {
    async fn append_entry(&self, session_id: &str, entry: SessionEntry) -> Result<()> {
        self.sessions
            .write()
            .entry(session_id.to_string())
            .or_insert_with(|| NavigationSession {
                session_id: session_id.to_string(),
                entries: Vec::new(),
            })
            .entries
            .push(entry);
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<Option<NavigationSession>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }
}
