// =============================================================================
// Favorites: named watchlist groups persisted as JSON
// =============================================================================
//
// Every mutation runs load -> mutate a copy -> atomic save (tmp + rename)
// while holding the store mutex, so concurrent requests cannot interleave
// their read-modify-write cycles. A missing file is an empty map; a corrupt
// file is logged and also treated as empty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::market_data::provider::{is_valid_ticker, normalize_ticker};

pub const DEFAULT_MAX_TICKERS: usize = 20;

/// Group name -> tickers, in insertion order within a group.
pub type Favorites = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("group name must not be empty")]
    EmptyGroupName,
    #[error("group {0:?} already exists")]
    DuplicateGroup(String),
    #[error("group {0:?} does not exist")]
    UnknownGroup(String),
    #[error("ticker must not be empty")]
    EmptyTicker,
    #[error("ticker {0:?} is not a valid symbol")]
    InvalidTicker(String),
    #[error("ticker {ticker:?} is already in group {group:?}")]
    DuplicateTicker { group: String, ticker: String },
    #[error("ticker {ticker:?} is not in group {group:?}")]
    UnknownTicker { group: String, ticker: String },
    #[error("group {group:?} already holds the maximum of {max} tickers")]
    GroupFull { group: String, max: usize },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub struct FavoritesStore {
    path: PathBuf,
    max_tickers: usize,
    lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(path: impl Into<PathBuf>, max_tickers: usize) -> Self {
        Self {
            path: path.into(),
            max_tickers,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current favorites; never fails.
    pub fn load(&self) -> Favorites {
        let _guard = self.lock.lock();
        self.read()
    }

    /// Tickers of one group.
    pub fn group(&self, group: &str) -> Result<Vec<String>, FavoritesError> {
        self.load()
            .remove(group)
            .ok_or_else(|| FavoritesError::UnknownGroup(group.to_string()))
    }

    pub fn add_group(&self, name: &str) -> Result<Favorites, FavoritesError> {
        let name = name.trim();
        self.mutate(|favs| {
            if name.is_empty() {
                return Err(FavoritesError::EmptyGroupName);
            }
            if favs.contains_key(name) {
                return Err(FavoritesError::DuplicateGroup(name.to_string()));
            }
            favs.insert(name.to_string(), Vec::new());
            Ok(())
        })
    }

    pub fn remove_group(&self, name: &str) -> Result<Favorites, FavoritesError> {
        self.mutate(|favs| {
            favs.remove(name)
                .map(|_| ())
                .ok_or_else(|| FavoritesError::UnknownGroup(name.to_string()))
        })
    }

    pub fn add_ticker(&self, group: &str, ticker: &str) -> Result<Favorites, FavoritesError> {
        let ticker = normalize_ticker(ticker);
        let max = self.max_tickers;
        self.mutate(|favs| {
            let tickers = favs
                .get_mut(group)
                .ok_or_else(|| FavoritesError::UnknownGroup(group.to_string()))?;
            if ticker.is_empty() {
                return Err(FavoritesError::EmptyTicker);
            }
            if !is_valid_ticker(&ticker) {
                return Err(FavoritesError::InvalidTicker(ticker.clone()));
            }
            if tickers.contains(&ticker) {
                return Err(FavoritesError::DuplicateTicker {
                    group: group.to_string(),
                    ticker: ticker.clone(),
                });
            }
            if tickers.len() >= max {
                return Err(FavoritesError::GroupFull {
                    group: group.to_string(),
                    max,
                });
            }
            tickers.push(ticker.clone());
            Ok(())
        })
    }

    pub fn remove_ticker(&self, group: &str, ticker: &str) -> Result<Favorites, FavoritesError> {
        let ticker = normalize_ticker(ticker);
        self.mutate(|favs| {
            let tickers = favs
                .get_mut(group)
                .ok_or_else(|| FavoritesError::UnknownGroup(group.to_string()))?;
            let pos = tickers.iter().position(|t| *t == ticker).ok_or_else(|| {
                FavoritesError::UnknownTicker {
                    group: group.to_string(),
                    ticker: ticker.clone(),
                }
            })?;
            tickers.remove(pos);
            Ok(())
        })
    }

    // -------------------------------------------------------------------------
    // Load / mutate / persist
    // -------------------------------------------------------------------------

    fn mutate<F>(&self, apply: F) -> Result<Favorites, FavoritesError>
    where
        F: FnOnce(&mut Favorites) -> Result<(), FavoritesError>,
    {
        let _guard = self.lock.lock();
        let mut next = self.read();
        apply(&mut next)?;
        self.write(&next)?;
        Ok(next)
    }

    fn read(&self) -> Favorites {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Favorites::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read favorites");
                return Favorites::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(favs) => favs,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "favorites file is corrupt, treating as empty");
                Favorites::new()
            }
        }
    }

    fn write(&self, favs: &Favorites) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let content =
            serde_json::to_string_pretty(favs).context("failed to serialise favorites to JSON")?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp favorites to {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename tmp favorites to {}", self.path.display()))?;

        info!(path = %self.path.display(), groups = favs.len(), "favorites saved (atomic)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store(dir: &tempfile::TempDir) -> FavoritesStore {
        FavoritesStore::new(dir.path().join("favorite.json"), DEFAULT_MAX_TICKERS)
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).load().is_empty());
    }

    #[test]
    fn corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        std::fs::write(s.path(), "{not json").unwrap();
        assert!(s.load().is_empty());
        // and can be overwritten by the next mutation
        s.add_group("Core").unwrap();
        assert_eq!(s.load().len(), 1);
    }

    #[test]
    fn group_lifecycle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.add_group(" Core ").unwrap();
        s.add_ticker("Core", " spy ").unwrap();
        s.add_ticker("Core", "qqq").unwrap();

        let reopened = store(&dir);
        assert_eq!(reopened.group("Core").unwrap(), vec!["SPY", "QQQ"]);

        reopened.remove_ticker("Core", "spy").unwrap();
        assert_eq!(reopened.group("Core").unwrap(), vec!["QQQ"]);

        reopened.remove_group("Core").unwrap();
        assert!(reopened.load().is_empty());
        assert!(!dir.path().join("favorite.json.tmp").exists());
    }

    #[test]
    fn group_name_rules() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        assert!(matches!(s.add_group("  "), Err(FavoritesError::EmptyGroupName)));
        s.add_group("Div").unwrap();
        assert!(matches!(s.add_group("Div"), Err(FavoritesError::DuplicateGroup(_))));
        assert!(matches!(s.remove_group("Nope"), Err(FavoritesError::UnknownGroup(_))));
    }

    #[test]
    fn ticker_rules() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        assert!(matches!(
            s.add_ticker("Nope", "SPY"),
            Err(FavoritesError::UnknownGroup(_))
        ));
        s.add_group("G").unwrap();
        assert!(matches!(s.add_ticker("G", "   "), Err(FavoritesError::EmptyTicker)));
        assert!(matches!(s.add_ticker("G", "A/B"), Err(FavoritesError::InvalidTicker(_))));
        s.add_ticker("G", "SPY").unwrap();
        assert!(matches!(
            s.add_ticker("G", "spy"),
            Err(FavoritesError::DuplicateTicker { .. })
        ));
        assert!(matches!(
            s.remove_ticker("G", "QQQ"),
            Err(FavoritesError::UnknownTicker { .. })
        ));
    }

    #[test]
    fn group_capacity_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.add_group("Big").unwrap();
        for i in 0..DEFAULT_MAX_TICKERS {
            s.add_ticker("Big", &format!("T{i}")).unwrap();
        }
        let err = s.add_ticker("Big", "ONEMORE").unwrap_err();
        assert!(matches!(err, FavoritesError::GroupFull { max: 20, .. }));
        assert_eq!(s.group("Big").unwrap().len(), DEFAULT_MAX_TICKERS);
    }

    #[test]
    fn failed_mutation_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        s.add_group("A").unwrap();
        let before = std::fs::read_to_string(s.path()).unwrap();
        let _ = s.add_group("A");
        assert_eq!(std::fs::read_to_string(s.path()).unwrap(), before);
    }

    #[test]
    fn concurrent_additions_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let s = Arc::new(store(&dir));
        s.add_group("G").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = Arc::clone(&s);
                std::thread::spawn(move || s.add_ticker("G", &format!("T{i}")).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(s.group("G").unwrap().len(), 8);
    }
}
