use crate::prelude::{LedgerError, LedgerResult};
use crate::records::Diagnostic;
use log::debug;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Append-only record store guarded by a single lock that also covers the
/// co-owned error log.
///
/// Every read, including read-only traversal, takes the same lock as writers.
pub struct Ledger<R> {
    inner: Mutex<LedgerState<R>>,
}

struct LedgerState<R> {
    records: Vec<R>,
    errors: Vec<Diagnostic>,
}

impl<R> Ledger<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            inner: Mutex::new(LedgerState {
                records,
                errors: Vec::new(),
            }),
        }
    }

    // A panic inside a pass leaves records in a valid (if partially updated)
    // state, so poisoning is not treated as fatal.
    fn lock(&self) -> MutexGuard<'_, LedgerState<R>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, record: R) {
        self.lock().records.push(record);
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Visits every record under the lock.
    pub fn for_each<F: FnMut(&R)>(&self, mut visit: F) {
        let state = self.lock();
        for record in &state.records {
            visit(record);
        }
    }

    pub fn log_error(&self, diagnostic: Diagnostic) {
        self.lock().errors.push(diagnostic);
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.lock().errors.clone()
    }

    pub fn error_count(&self) -> usize {
        self.lock().errors.len()
    }

    /// Resets records and error log in one critical section.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.records.clear();
        state.errors.clear();
    }

    /// Runs one pass with exclusive access to records and error log.
    pub(crate) fn with_state<T>(
        &self,
        pass: impl FnOnce(&mut Vec<R>, &mut Vec<Diagnostic>) -> T,
    ) -> T {
        let mut state = self.lock();
        let LedgerState { records, errors } = &mut *state;
        pass(records, errors)
    }

    /// Writes the error log to `path`, one diagnostic per line, truncating any
    /// previous content.
    pub fn save_error_log(&self, path: impl AsRef<Path>) -> LedgerResult<()> {
        let path = path.as_ref();
        let errors = self.errors();
        let io_error = |source: std::io::Error| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        for diagnostic in &errors {
            writeln!(writer, "{}", diagnostic).map_err(io_error)?;
        }
        writer.flush().map_err(io_error)?;
        debug!("saved {} diagnostics to {}", errors.len(), path.display());
        Ok(())
    }
}

impl<R: Clone> Ledger<R> {
    /// Consistent copy of the records at the time the lock was held.
    pub fn snapshot(&self) -> Vec<R> {
        self.lock().records.clone()
    }

    /// Most recently appended record, if any.
    pub fn latest(&self) -> Option<R> {
        self.lock().records.last().cloned()
    }
}

impl<R: Debug> Ledger<R> {
    pub fn log_details(&self) {
        let state = self.lock();
        for record in &state.records {
            debug!("{:?}", record);
        }
    }
}

impl<R> Default for Ledger<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DiagnosticKind;
    use chrono::Utc;
    use std::sync::Arc;
    use std::thread;

    fn diagnostic(id: &str) -> Diagnostic {
        Diagnostic::new(id, Utc::now(), DiagnosticKind::NonFinitePhase)
    }

    #[test]
    fn concurrent_appends_are_all_visible() {
        let ledger = Arc::new(Ledger::new());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let ledger = ledger.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        ledger.append(worker * 1000 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ledger.len(), 1000);
    }

    #[test]
    fn snapshot_preserves_append_order() {
        let ledger = Ledger::new();
        ledger.append(3);
        ledger.append(1);
        ledger.append(2);
        assert_eq!(ledger.snapshot(), vec![3, 1, 2]);
        assert_eq!(ledger.latest(), Some(2));

        let mut visited = Vec::new();
        ledger.for_each(|value| visited.push(*value));
        assert_eq!(visited, vec![3, 1, 2]);
    }

    #[test]
    fn clear_resets_records_and_errors_together() {
        let ledger = Ledger::new();
        ledger.append(1);
        ledger.log_error(diagnostic("a"));

        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.error_count(), 0);
    }

    #[test]
    fn save_error_log_writes_one_line_per_diagnostic() {
        let ledger: Ledger<u32> = Ledger::new();
        ledger.log_error(diagnostic("first"));
        ledger.log_error(diagnostic("second"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        ledger.save_error_log(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("first"));
        assert!(lines[1].contains("second"));
    }

    #[test]
    fn save_error_log_surfaces_io_failure() {
        let ledger: Ledger<u32> = Ledger::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("errors.log");

        let err = ledger.save_error_log(&path).unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }));
    }
}
