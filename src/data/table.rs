//! Shared table of per-sensor windows.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::policy::Verdict;
use super::window::SensorWindow;

/// All sensor windows behind one lock.
///
/// Cloning is cheap and yields a handle to the same table. The ingestion
/// loop appends through [`SensorTable::record`] and the report renderer
/// reads and resets through [`SensorTable::with_windows`]; each call holds
/// the lock for its whole duration, so a report never sees a half-applied
/// reading and a reset never drops one.
#[derive(Debug, Clone)]
pub struct SensorTable {
    windows: Arc<Mutex<BTreeMap<String, SensorWindow>>>,
    history_size: usize,
}

impl SensorTable {
    /// Empty table whose windows keep `history_size` past outputs.
    pub fn new(history_size: usize) -> Self {
        Self {
            windows: Arc::new(Mutex::new(BTreeMap::new())),
            history_size,
        }
    }

    /// Fold an observation into `name`'s window.
    ///
    /// The window is created on the first accepted or filtered observation.
    /// Ignored observations never create one.
    pub fn record(&self, name: &str, verdict: Verdict) {
        if verdict == Verdict::Ignore {
            return;
        }

        let mut windows = self.windows.lock();
        if let Some(window) = windows.get_mut(name) {
            window.apply(verdict);
            return;
        }

        let mut window = SensorWindow::new(self.history_size);
        window.apply(verdict);
        windows.insert(name.to_string(), window);
    }

    /// Run `f` with exclusive access to every window, in name order.
    pub fn with_windows<R>(&self, f: impl FnOnce(&mut BTreeMap<String, SensorWindow>) -> R) -> R {
        let mut windows = self.windows.lock();
        f(&mut windows)
    }

    /// Capacity of each window's output history.
    pub fn history_size(&self) -> usize {
        self.history_size
    }

    /// Names of all known sensors, ascending.
    pub fn names(&self) -> Vec<String> {
        self.windows.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_are_created_lazily() {
        let table = SensorTable::new(2);
        assert!(table.is_empty());

        table.record("wohnzimmer", Verdict::Accept(21.0));
        table.record("keller", Verdict::Filter);

        assert_eq!(table.names(), vec!["keller", "wohnzimmer"]);
    }

    #[test]
    fn new_windows_use_the_table_history_size() {
        let table = SensorTable::new(4);
        table.record("wohnzimmer", Verdict::Accept(21.0));

        let capacity = table.with_windows(|w| w["wohnzimmer"].history().capacity());
        assert_eq!(capacity, table.history_size());
    }

    #[test]
    fn ignored_observations_do_not_create_windows() {
        let table = SensorTable::new(2);
        table.record("wohnzimmer", Verdict::Ignore);
        assert!(table.is_empty());
    }

    #[test]
    fn clones_share_the_same_windows() {
        let table = SensorTable::new(2);
        let other = table.clone();

        table.record("wohnzimmer", Verdict::Accept(21.0));
        other.record("wohnzimmer", Verdict::Accept(22.0));

        let raw = table.with_windows(|w| w["wohnzimmer"].raw().to_vec());
        assert_eq!(raw, vec![21.0, 22.0]);
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        use std::thread;

        let table = SensorTable::new(2);
        let mut handles = vec![];
        for _ in 0..8 {
            let t = table.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..500 {
                    t.record("wohnzimmer", Verdict::Accept(20.0));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let accepted = table.with_windows(|w| w["wohnzimmer"].accepted_count());
        assert_eq!(accepted, 4000);
    }
}
