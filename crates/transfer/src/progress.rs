use parking_lot::Mutex;

/// Callback receiving the cumulative byte count.
pub type ProgressCallback = Box<dyn Fn(u64) + Send + Sync>;

/// Accumulates sent bytes and forwards the running total to a callback.
///
/// Totals are reported under a lock, so observers always see a
/// non-decreasing sequence even if slices are counted from several tasks.
pub struct ProgressCounter {
    sent: Mutex<u64>,
    callback: ProgressCallback,
}

impl ProgressCounter {
    pub fn new(callback: impl Fn(u64) + Send + Sync + 'static) -> Self {
        Self {
            sent: Mutex::new(0),
            callback: Box::new(callback),
        }
    }

    /// Adds `bytes` to the total and reports the new total.
    pub fn advance(&self, bytes: u64) -> u64 {
        let mut sent = self.sent.lock();
        *sent = sent.saturating_add(bytes);
        (self.callback)(*sent);
        *sent
    }

    /// Bytes counted so far.
    pub fn current(&self) -> u64 {
        *self.sent.lock()
    }
}
