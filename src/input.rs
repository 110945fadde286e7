use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

#[derive(Debug, Default)]
struct Shared {
    /// x in the high 32 bits, y in the low 32 bits, so a reader never sees half an update.
    pointer: AtomicU64,
    epoch: OnceLock<Instant>,
}

/// Last known pointer position and the host clock.
///
/// Written only by the host's event pump, read by anyone holding a clone.
/// Clients grab one from [`crate::Host::input`] before they are registered.
#[derive(Clone, Debug, Default)]
pub struct Input {
    shared: Arc<Shared>,
}

#[inline]
fn pack(x: i32, y: i32) -> u64 {
    ((x as u32 as u64) << 32) | y as u32 as u64
}

#[inline]
fn unpack(v: u64) -> (i32, i32) {
    ((v >> 32) as u32 as i32, v as u32 as i32)
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// (0, 0) until the first pointer motion.
    pub fn pointer_position(&self) -> (i32, i32) {
        unpack(self.shared.pointer.load(Ordering::Acquire))
    }

    /// Seconds since the host entered its running state, 0.0 before that.
    ///
    /// Not wall-clock time and not comparable across processes.
    pub fn now(&self) -> f64 {
        self.shared
            .epoch
            .get()
            .map(|epoch| epoch.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    pub(crate) fn set_pointer(&self, x: i32, y: i32) {
        self.shared.pointer.store(pack(x, y), Ordering::Release);
    }

    /// Fix the clock epoch. Later calls keep the first epoch.
    pub(crate) fn start_clock(&self) {
        let _ = self.shared.epoch.set(Instant::now());
    }

    pub(crate) fn clock_started(&self) -> bool {
        self.shared.epoch.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pointer_starts_at_origin() {
        assert_eq!(Input::new().pointer_position(), (0, 0));
    }

    #[test]
    fn pointer_keeps_latest_value_across_clones() {
        let input = Input::new();
        let reader = input.clone();
        input.set_pointer(10, 20);
        input.set_pointer(-3, 7);
        assert_eq!(reader.pointer_position(), (-3, 7));
    }

    #[test]
    fn packing_handles_extremes() {
        for (x, y) in [(i32::MIN, i32::MAX), (-1, -1), (0, -1), (i32::MAX, 0)] {
            assert_eq!(unpack(pack(x, y)), (x, y));
        }
    }

    #[test]
    fn clock_is_zero_until_started_then_monotonic() {
        let input = Input::new();
        assert_eq!(input.now(), 0.0);
        assert!(!input.clock_started());
        input.start_clock();
        let a = input.now();
        std::thread::sleep(Duration::from_millis(5));
        let b = input.now();
        assert!(b > a);
        assert!(b >= 0.005);
    }
}
