use core::{future::poll_fn, task::Poll};

use atomic_waker::AtomicWaker;
use portable_atomic::{AtomicU32, AtomicUsize, Ordering};

/// Sentinel value of the register before the first capture.
pub const NO_CAPTURE: u32 = 0;

/// Single slot register holding the tick count of the most recent capture.
///
/// The capture handler is the only writer and runs in the radio's receive
/// context; readers run in arbitrary other contexts and never block. Only the
/// last write survives. Relaxed ordering on the payload is fine, since the
/// value is a best effort sample and not a correctness critical counter.
pub struct CaptureTickRegister {
    last_tick: AtomicU32,
    generation: AtomicUsize,
    waker: AtomicWaker,
}
impl CaptureTickRegister {
    pub const fn new() -> Self {
        Self {
            last_tick: AtomicU32::new(NO_CAPTURE),
            generation: AtomicUsize::new(0),
            waker: AtomicWaker::new(),
        }
    }
    /// Store a new sample.
    ///
    /// Safe to call from the capture context; a single atomic store plus a
    /// wake of the registered waiter.
    pub fn record(&self, tick: u32) {
        self.last_tick.store(tick, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::Release);
        self.waker.wake();
    }
    /// Read the most recent sample. [NO_CAPTURE] means no capture yet.
    pub fn read(&self) -> u32 {
        self.last_tick.load(Ordering::Relaxed)
    }
    /// Reset the register back to the no capture state.
    pub fn reset(&self) {
        self.last_tick.store(NO_CAPTURE, Ordering::Relaxed);
    }
    /// Asynchronously wait for the next sample to be recorded.
    pub async fn next_sample(&self) -> u32 {
        let start = self.generation.load(Ordering::Acquire);
        poll_fn(|cx| {
            if self.generation.load(Ordering::Acquire) != start {
                return Poll::Ready(self.read());
            }
            self.waker.register(cx.waker());
            // A sample may have landed between the check and the register.
            if self.generation.load(Ordering::Acquire) != start {
                Poll::Ready(self.read())
            } else {
                Poll::Pending
            }
        })
        .await
    }
}
impl Default for CaptureTickRegister {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_sentinel() {
        let register = CaptureTickRegister::new();
        assert_eq!(register.read(), NO_CAPTURE);
    }
    #[test]
    fn last_write_wins() {
        let register = CaptureTickRegister::new();
        register.record(12345);
        register.record(12400);
        assert_eq!(register.read(), 12400);
        register.reset();
        assert_eq!(register.read(), NO_CAPTURE);
    }
    #[test]
    fn next_sample_wakes_on_record() {
        static REGISTER: CaptureTickRegister = CaptureTickRegister::new();
        let writer = std::thread::spawn(|| {
            std::thread::sleep(std::time::Duration::from_millis(10));
            REGISTER.record(77);
        });
        assert_eq!(embassy_futures::block_on(REGISTER.next_sample()), 77);
        writer.join().unwrap();
    }
}
