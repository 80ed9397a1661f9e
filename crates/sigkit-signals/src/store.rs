//! Signal store implementations.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use sigkit_core::error::StorageError;
use sigkit_core::traits::SignalStore;
use sigkit_core::types::{NewSignal, Signal, SignalFilter, SignalStatus};

/// One `<TICKER>.csv` per ticker inside a folder.
///
/// Every mutation rewrites the ticker's file under a process-wide lock,
/// so status transitions are compare-and-set within one process.
pub struct CsvSignalStore {
    folder: PathBuf,
    lock: Mutex<()>,
}

impl CsvSignalStore {
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let folder = folder.into();
        fs::create_dir_all(&folder)?;
        Ok(Self {
            folder,
            lock: Mutex::new(()),
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.folder.join(format!("{}.csv", ticker))
    }

    fn read_ticker(&self, ticker: &str) -> Result<Vec<Signal>, StorageError> {
        read_signals(&self.path_for(ticker))
    }

    fn write_ticker(&self, ticker: &str, signals: &[Signal]) -> Result<(), StorageError> {
        let path = self.path_for(ticker);
        let tmp = path.with_extension("csv.tmp");

        let mut wtr = csv::Writer::from_path(&tmp).map_err(csv_err)?;
        for signal in signals {
            wtr.serialize(signal).map_err(csv_err)?;
        }
        wtr.flush()?;
        drop(wtr);

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn tickers(&self) -> Result<Vec<String>, StorageError> {
        let mut tickers = Vec::new();
        for entry in fs::read_dir(&self.folder)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    tickers.push(stem.to_string());
                }
            }
        }
        tickers.sort();
        Ok(tickers)
    }

    /// Load-modify-store one signal under the lock.
    fn modify<F>(&self, ticker: &str, id: &str, f: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut Signal) -> bool,
    {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut signals = self.read_ticker(ticker)?;
        let Some(signal) = signals.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        if !f(signal) {
            return Ok(false);
        }
        self.write_ticker(ticker, &signals)?;
        Ok(true)
    }
}

fn csv_err(e: csv::Error) -> StorageError {
    StorageError::Csv(e.to_string())
}

fn read_signals(path: &Path) -> Result<Vec<Signal>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut rdr = csv::Reader::from_path(path).map_err(csv_err)?;
    rdr.deserialize()
        .collect::<Result<Vec<Signal>, _>>()
        .map_err(csv_err)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl SignalStore for CsvSignalStore {
    fn create(&self, signal: NewSignal) -> Result<Signal, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let ticker = signal.ticker.clone();
        let mut signals = self.read_ticker(&ticker)?;

        let created = Signal::open(new_id(), signal);
        signals.push(created.clone());
        self.write_ticker(&ticker, &signals)?;

        info!(id = %created.id, ticker = %created.ticker, entry = created.entry, "Signal stored");
        Ok(created)
    }

    fn list(&self, filter: &SignalFilter) -> Result<Vec<Signal>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let tickers = match &filter.ticker {
            Some(t) => vec![t.clone()],
            None => self.tickers()?,
        };

        let mut out = Vec::new();
        for ticker in tickers {
            out.extend(self.read_ticker(&ticker)?.into_iter().filter(|s| filter.matches(s)));
        }
        Ok(out)
    }

    fn update_status(
        &self,
        ticker: &str,
        id: &str,
        status: SignalStatus,
        info: Option<String>,
    ) -> Result<bool, StorageError> {
        let updated = self.modify(ticker, id, |s| s.close(status, info))?;
        if updated {
            debug!(ticker, id, %status, "Signal status updated");
        }
        Ok(updated)
    }

    fn mark_notified(&self, ticker: &str, id: &str) -> Result<bool, StorageError> {
        self.modify(ticker, id, |s| {
            s.notified = true;
            true
        })
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemorySignalStore {
    signals: Mutex<BTreeMap<String, Vec<Signal>>>,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed signal, keeping its id.
    pub fn insert(&self, signal: Signal) -> Result<(), StorageError> {
        let mut map = self.signals.lock().map_err(|_| StorageError::Poisoned)?;
        map.entry(signal.ticker.clone()).or_default().push(signal);
        Ok(())
    }

    fn modify<F>(&self, ticker: &str, id: &str, f: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut Signal) -> bool,
    {
        let mut map = self.signals.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(map
            .get_mut(ticker)
            .and_then(|v| v.iter_mut().find(|s| s.id == id))
            .map_or(false, f))
    }
}

impl SignalStore for MemorySignalStore {
    fn create(&self, signal: NewSignal) -> Result<Signal, StorageError> {
        let created = Signal::open(new_id(), signal);
        self.insert(created.clone())?;
        Ok(created)
    }

    fn list(&self, filter: &SignalFilter) -> Result<Vec<Signal>, StorageError> {
        let map = self.signals.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(map
            .values()
            .flatten()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        ticker: &str,
        id: &str,
        status: SignalStatus,
        info: Option<String>,
    ) -> Result<bool, StorageError> {
        self.modify(ticker, id, |s| s.close(status, info))
    }

    fn mark_notified(&self, ticker: &str, id: &str) -> Result<bool, StorageError> {
        self.modify(ticker, id, |s| {
            s.notified = true;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn new_signal(ticker: &str, entry: f64) -> NewSignal {
        NewSignal {
            ticker: ticker.to_string(),
            timestamp: DateTime::from_timestamp(1_735_689_600, 0).unwrap(),
            entry,
            tp: entry * 1.05,
            sl: entry * 0.95,
            strategy_version: "test-v".to_string(),
        }
    }

    #[test]
    fn test_csv_store_basic_flow() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvSignalStore::new(dir.path().join("signals")).unwrap();

        let saved = store.create(new_signal("TEST", 100.0)).unwrap();
        assert!(!saved.id.is_empty());
        assert_eq!(saved.status, SignalStatus::Open);

        let listed = store.list(&SignalFilter::ticker("TEST")).unwrap();
        assert_eq!(listed, vec![saved.clone()]);

        assert!(store
            .update_status("TEST", &saved.id, SignalStatus::Tp, Some("hit-by-test".into()))
            .unwrap());
        let reloaded = store.get("TEST", &saved.id).unwrap().unwrap();
        assert_eq!(reloaded.status, SignalStatus::Tp);
        assert_eq!(reloaded.status_info.as_deref(), Some("hit-by-test"));
    }

    #[test]
    fn test_terminal_transition_happens_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvSignalStore::new(dir.path()).unwrap();
        let saved = store.create(new_signal("BBCA", 9000.0)).unwrap();

        assert!(store.update_status("BBCA", &saved.id, SignalStatus::Sl, None).unwrap());
        assert!(!store.update_status("BBCA", &saved.id, SignalStatus::Tp, None).unwrap());
        assert!(!store.update_status("BBCA", "missing", SignalStatus::Tp, None).unwrap());
        assert_eq!(store.get("BBCA", &saved.id).unwrap().unwrap().status, SignalStatus::Sl);
    }

    #[test]
    fn test_list_across_tickers_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvSignalStore::new(dir.path()).unwrap();
        let a = store.create(new_signal("AAA", 10.0)).unwrap();
        store.create(new_signal("BBB", 20.0)).unwrap();

        assert_eq!(store.list(&SignalFilter::default()).unwrap().len(), 2);

        store.update_status("AAA", &a.id, SignalStatus::End, None).unwrap();
        let open = store.list(&SignalFilter::status(SignalStatus::Open)).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].ticker, "BBB");
    }

    #[test]
    fn test_mark_notified() {
        let store = MemorySignalStore::new();
        let s = store.create(new_signal("PGAS", 1000.0)).unwrap();

        assert_eq!(store.list(&SignalFilter::pending_notification()).unwrap().len(), 1);
        assert!(store.mark_notified("PGAS", &s.id).unwrap());
        assert!(store.list(&SignalFilter::pending_notification()).unwrap().is_empty());
        assert!(!store.mark_notified("PGAS", "nope").unwrap());
    }

    #[test]
    fn test_memory_store_compare_and_set() {
        let store = MemorySignalStore::new();
        let s = store.create(new_signal("TLKM", 3000.0)).unwrap();
        assert!(store.update_status("TLKM", &s.id, SignalStatus::Tp, None).unwrap());
        assert!(!store.update_status("TLKM", &s.id, SignalStatus::Sl, None).unwrap());
    }
}
