//! # `wifi-beacon-sync`
//! Passive beacon based clock synchronization for a constrained Wi-Fi
//! station. The station associates with an AP, switches the radio into
//! promiscuous capture with a management frame filter and, for every frame
//! that originates from the associated AP, records the local scheduler tick
//! at which it arrived. External localization logic correlates those ticks
//! against a reference clock.
//!
//! ## Capture path (RX)
//! While promiscuous mode is enabled, the radio driver invokes the installed
//! [FrameSink] once per captured frame. The buffer starts with the fixed
//! [RxControlHeader] metadata record the hardware prepends, immediately
//! followed by the 802.11 MAC header. [CaptureHandler] parses just enough of
//! the header to extract the transmitter address, queries the driver for the
//! currently associated AP and, on a BSSID match, records the ISR safe tick
//! count into the shared [CaptureTickRegister]. The handler runs in the
//! driver's receive context: it never blocks, never allocates and absorbs
//! every per frame failure, so the RX path can not be stalled by malformed
//! or irrelevant input.
//!
//! ## Timestamp register
//! [CaptureTickRegister] is the only mutable state shared across execution
//! contexts. It is a single atomic slot with last write wins semantics; a
//! consumer either polls [CaptureTickRegister::read] at its own cadence or
//! awaits [CaptureTickRegister::next_sample].
//!
//! ## Connection lifecycle
//! [ConnectionManager] reacts to the driver's connectivity events: it
//! requests association on start, retries a bounded number of times with a
//! cooperative delay after a disconnect and enables capture through
//! [Sniffer::enable_capture] once an IP was acquired. Enabling capture is
//! idempotent, since every reconnect cycle ends in another got-IP event.
//!
//! The driver itself (register access, DMA, PHY bring up, credentials) stays
//! behind the traits in this crate; the crate only owns the capture
//! pipeline.

#![cfg_attr(not(test), no_std)]
pub(crate) mod fmt;

mod driver;
mod frame;
mod sniffer;
mod station;
mod sync;

pub use driver::*;
pub use frame::*;
pub use sniffer::*;
pub use station::*;
pub use sync::*;

#[cfg(not(feature = "critical_section"))]
pub type DefaultRawMutex = embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(feature = "critical_section")]
pub type DefaultRawMutex = embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
