use crate::{
    driver::{
        ApInfoSource, CaptureResult, FrameSink, FrameType, PromiscuousRadio, RxFilterMask,
        TickSource,
    },
    frame::{addresses_match, MacHeader, RxControlHeader},
    sync::CaptureTickRegister,
};

/// The per frame capture routine.
///
/// One invocation per captured frame, each a fully independent transaction:
/// extract the transmitter address, compare it against the BSSID of the
/// currently associated AP and on a match record the current scheduler tick
/// in the shared register. Every failure along the way is a silent discard,
/// so the driver's receive path is never stalled or faulted by a malformed
/// or irrelevant frame.
pub struct CaptureHandler<'res, A, T> {
    register: &'res CaptureTickRegister,
    ap_info: A,
    ticks: T,
}
impl<'res, A: ApInfoSource, T: TickSource> CaptureHandler<'res, A, T> {
    pub fn new(register: &'res CaptureTickRegister, ap_info: A, ticks: T) -> Self {
        Self {
            register,
            ap_info,
            ticks,
        }
    }
    /// The register this handler records into.
    pub fn register(&self) -> &'res CaptureTickRegister {
        self.register
    }
}
impl<A: ApInfoSource, T: TickSource> FrameSink for CaptureHandler<'_, A, T> {
    fn on_frame_received(&self, buffer: &[u8], frame_type: FrameType) {
        // The filter is restricted to management frames, anything else is
        // not worth parsing.
        if frame_type != FrameType::Management {
            return;
        }
        let Some(mpdu) = buffer.get(RxControlHeader::LEN..) else {
            debug!("Dropping frame shorter than the metadata record.");
            return;
        };
        let Ok(header) = MacHeader::parse(mpdu) else {
            debug!("Dropping frame with truncated MAC header.");
            return;
        };
        let Ok(ap_info) = self.ap_info.associated_ap_info() else {
            debug!("Got promiscuous frame while not associated. Drop.");
            return;
        };
        if !addresses_match(&ap_info.bssid, header.transmitter_address()) {
            trace!("Got promiscuous frame but no matching AP. Drop.");
            return;
        }
        self.register.record(self.ticks.tick_count_from_isr());
    }
}

/// Switches the radio into promiscuous capture.
///
/// Restricts the receive filter to management frames, enables promiscuous
/// reception and installs the sink as the RX callback. Enabling is
/// idempotent, since the connection lifecycle may request it again after
/// every reconnect cycle.
pub struct Sniffer<'res, R> {
    radio: R,
    sink: &'res dyn FrameSink,
    enabled: bool,
}
impl<'res, R: PromiscuousRadio<'res>> Sniffer<'res, R> {
    pub fn new(radio: R, sink: &'res dyn FrameSink) -> Self {
        Self {
            radio,
            sink,
            enabled: false,
        }
    }
    /// Configure the radio for promiscuous capture of management frames.
    ///
    /// Any driver rejection is fatal for the capture subsystem and
    /// propagated to the caller. A failed attempt leaves the controller
    /// re-armable.
    pub fn enable_capture(&mut self) -> CaptureResult<()> {
        if self.enabled {
            trace!("Capture already enabled.");
            return Ok(());
        }
        self.radio.set_rx_filter(RxFilterMask::MANAGEMENT)?;
        self.radio.set_promiscuous_mode(true)?;
        self.radio.set_rx_callback(self.sink)?;
        self.enabled = true;
        debug!("Promiscuous capture enabled.");
        Ok(())
    }
    /// Take the radio out of promiscuous mode again.
    pub fn disable_capture(&mut self) -> CaptureResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.radio.set_promiscuous_mode(false)?;
        self.enabled = false;
        debug!("Promiscuous capture disabled.");
        Ok(())
    }
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
