/// Observer for hashing progress, decoupled from the hashing itself so the
/// fingerprinter has no output-device dependency. Called from worker threads.
pub trait ProgressObserver: Sync {
    fn on_package(&self, name: &str, completed: usize, total: usize);
}

/// Default observer that reports nothing.
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_package(&self, _name: &str, _completed: usize, _total: usize) {}
}
