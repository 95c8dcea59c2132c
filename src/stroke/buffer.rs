// SampleBuffer - shared append/drain handoff between the live path and finalization
//
// The live-input callback appends one entry per sample while the stylus is
// down. When the stroke ends, the finalizer drains the buffer: the current
// contents are swapped out for an empty vector inside the same critical
// section that guards append, so an append can land either wholly before or
// wholly after a drain, never inside it.
//
// Buffer flow:
// 1. Live path calls append() for every sample (short lock, O(1) amortized)
// 2. Finalizer calls drain() once per stroke (swap under the lock)
// 3. Finalizer owns the returned Vec; the shared buffer is already empty
//
// Length queries read an atomic mirror of the length and never take the lock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::SessionError;

/// Initial capacity used for each fresh buffer generation
pub const DEFAULT_STROKE_CAPACITY: usize = 512;

/// Thread-shared append-only buffer drained once per stroke
///
/// # Thread Safety
/// - `append` and `drain` serialize on one mutex
/// - `len`/`is_empty` are lock-free reads of the last committed length
///
/// # Example
/// ```ignore
/// let buffer = SampleBuffer::new("render", 512);
///
/// // Live-input thread:
/// buffer.append(segment)?;
///
/// // Finalize thread:
/// let snapshot = buffer.drain()?;
/// ```
#[derive(Debug)]
pub struct SampleBuffer<T> {
    name: &'static str,
    entries: Mutex<Vec<T>>,
    len: AtomicUsize,
    capacity_hint: usize,
}

impl<T> SampleBuffer<T> {
    pub fn new(name: &'static str, capacity_hint: usize) -> Self {
        Self {
            name,
            entries: Mutex::new(Vec::with_capacity(capacity_hint)),
            len: AtomicUsize::new(0),
            capacity_hint,
        }
    }

    /// Name used in logs, telemetry and lock errors
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append one entry, returning the buffer length after the append
    pub fn append(&self, entry: T) -> Result<usize, SessionError> {
        let mut entries = self.lock_entries()?;
        entries.push(entry);
        let len = entries.len();
        self.len.store(len, Ordering::Release);
        Ok(len)
    }

    /// Snapshot-and-clear in one critical section
    ///
    /// Returns everything appended since the previous drain, in append order.
    /// The shared buffer is left empty with fresh capacity for the next stroke.
    pub fn drain(&self) -> Result<Vec<T>, SessionError> {
        let mut entries = self.lock_entries()?;
        let snapshot = std::mem::replace(&mut *entries, Vec::with_capacity(self.capacity_hint));
        self.len.store(0, Ordering::Release);
        Ok(snapshot)
    }

    /// Length as of the last completed append or drain
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, Vec<T>>, SessionError> {
        self.entries.lock().map_err(|_| SessionError::LockPoisoned {
            component: format!("{}_buffer", self.name),
        })
    }
}

impl<T: Clone> SampleBuffer<T> {
    /// Most recently appended entry, if the buffer is not empty
    pub fn last(&self) -> Result<Option<T>, SessionError> {
        Ok(self.lock_entries()?.last().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_append_then_drain_preserves_order() {
        let buffer = SampleBuffer::new("test", 4);
        assert_eq!(buffer.name(), "test");
        for i in 0..10 {
            assert_eq!(buffer.append(i).unwrap(), i + 1);
        }
        assert_eq!(buffer.len(), 10);

        let snapshot = buffer.drain().unwrap();
        assert_eq!(snapshot, (0..10).collect::<Vec<_>>());
        assert!(buffer.is_empty());
        assert!(buffer.drain().unwrap().is_empty());
    }

    #[test]
    fn test_buffer_reused_across_strokes() {
        let buffer = SampleBuffer::new("test", 4);
        buffer.append("a").unwrap();
        assert_eq!(buffer.drain().unwrap(), vec!["a"]);

        buffer.append("b").unwrap();
        buffer.append("c").unwrap();
        assert_eq!(buffer.last().unwrap(), Some("c"));
        assert_eq!(buffer.drain().unwrap(), vec!["b", "c"]);
        assert_eq!(buffer.last().unwrap(), None);
    }

    #[test]
    fn test_concurrent_appends_and_drains_lose_nothing() {
        const TOTAL: usize = 20_000;
        let buffer = Arc::new(SampleBuffer::new("concurrent", 64));

        let producer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for i in 0..TOTAL {
                    buffer.append(i).unwrap();
                }
            })
        };

        let mut collected = Vec::with_capacity(TOTAL);
        while collected.len() < TOTAL {
            collected.extend(buffer.drain().unwrap());
            thread::yield_now();
        }
        producer.join().unwrap();
        collected.extend(buffer.drain().unwrap());

        // Every value exactly once, in append order
        assert_eq!(collected.len(), TOTAL);
        assert!(collected.iter().enumerate().all(|(i, v)| i == *v));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_poisoned_lock_maps_to_session_error() {
        let buffer = Arc::new(SampleBuffer::<u32>::new("render", 4));
        let poisoner = Arc::clone(&buffer);
        let _ = thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the buffer");
        })
        .join();

        assert_eq!(
            buffer.append(1),
            Err(SessionError::LockPoisoned {
                component: "render_buffer".to_string()
            })
        );
        assert!(buffer.drain().is_err());
    }
}
