use bitfield_struct::bitfield;
use macro_bits::serializable_enum;

serializable_enum! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    /// The category the radio driver assigned to a captured frame.
    pub enum FrameType: u8 {
        #[default]
        Management => 0,
        Control => 1,
        Data => 2,
        Misc => 3
    }
}

#[bitfield(u32)]
/// The frame categories, that are passed through to the RX callback, while
/// promiscuous mode is enabled.
pub struct RxFilterMask {
    pub management: bool,
    pub control: bool,
    pub data: bool,
    pub misc: bool,
    #[bits(28)]
    __: u32,
}
impl RxFilterMask {
    /// A filter passing management frames only.
    pub const MANAGEMENT: Self = Self::new().with_management(true);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// The buffer was shorter than the declared fixed header size.
    MalformedFrame,
    /// The station is currently not associated with an AP.
    NotAssociated,
    /// The driver rejected a configuration call.
    DriverConfiguration,
    /// The bounded reconnect budget was used up.
    RetriesExhausted,
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Snapshot of the AP the station is currently associated with.
///
/// This is owned by the driver and queried fresh for every captured frame,
/// so that a roaming reassociation is picked up immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApInfo {
    /// The hardware address identifying the AP.
    pub bssid: [u8; 6],
    /// The primary channel of the AP.
    pub channel: u8,
    /// Signal strength of the AP in dBm.
    pub rssi: i8,
}

/// The RX callback contract.
///
/// The driver invokes this once per captured frame, while promiscuous mode is
/// enabled. The buffer is laid out as `[RxControlHeader][MAC header][payload]`
/// and is only borrowed for the duration of the call. The implementation runs
/// in the driver's receive context and must neither block nor allocate.
pub trait FrameSink: Sync {
    fn on_frame_received(&self, buffer: &[u8], frame_type: FrameType);
}

/// Configuration surface of the promiscuous RX path.
///
/// Every call can be rejected by the underlying driver, which is fatal for
/// the capture subsystem and reported as [CaptureError::DriverConfiguration].
pub trait PromiscuousRadio<'res> {
    fn set_rx_filter(&mut self, filter: RxFilterMask) -> CaptureResult<()>;
    fn set_promiscuous_mode(&mut self, enabled: bool) -> CaptureResult<()>;
    fn set_rx_callback(&mut self, sink: &'res dyn FrameSink) -> CaptureResult<()>;
}

/// Read access to the association state of the station.
pub trait ApInfoSource: Sync {
    /// Query the driver for the currently associated AP.
    ///
    /// Fails with [CaptureError::NotAssociated] while the station has no
    /// association.
    fn associated_ap_info(&self) -> CaptureResult<ApInfo>;
}

/// The scheduler tick counter.
pub trait TickSource: Sync {
    /// Read the current tick count.
    ///
    /// This is the accessor variant, that is safe to call from the restricted
    /// RX context, the capture handler runs in.
    fn tick_count_from_isr(&self) -> u32;
}
