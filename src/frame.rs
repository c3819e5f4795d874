use bitfield_struct::bitfield;

use crate::driver::{CaptureError, CaptureResult};

/// Read a little endian 32 bit word out of the metadata record.
fn metadata_word(buffer: &[u8], index: usize) -> u32 {
    let offset = index * 4;
    u32::from_le_bytes(buffer[offset..offset + 4].try_into().unwrap())
}

#[bitfield(u32)]
struct SignalWord {
    #[bits(8)]
    rssi: i8,
    #[bits(5)]
    rate: u8,
    #[bits(1)]
    __: u8,
    #[bits(2)]
    sig_mode: u8,
    #[bits(16)]
    __: u16,
}
#[bitfield(u32)]
struct ChannelWord {
    #[bits(8)]
    noise_floor: i8,
    #[bits(8)]
    ampdu_cnt: u8,
    #[bits(4)]
    channel: u8,
    #[bits(4)]
    secondary_channel: u8,
    #[bits(8)]
    __: u8,
}
#[bitfield(u32)]
struct LengthWord {
    #[bits(12)]
    sig_len: u16,
    #[bits(12)]
    __: u16,
    #[bits(8)]
    rx_state: u8,
}

/// The radio metadata record, that the hardware prepends to every captured
/// frame.
///
/// The record is seven little endian 32 bit words with bit packed fields; we
/// only decode the ones a consumer can reasonably act on. The receive
/// timestamp is in microseconds and only precise, while modem and light sleep
/// are disabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxControlHeader {
    /// Received Signal Strength Indicator of the frame in dBm.
    pub rssi: i8,
    /// PHY rate encoding. Only valid for non HT frames.
    pub rate: u8,
    /// 0: non HT (11bg), 1: HT (11n), 3: VHT (11ac).
    pub sig_mode: u8,
    /// Noise floor of the RF module in 0.25 dBm steps.
    pub noise_floor: i8,
    /// Number of subframes aggregated in an AMPDU.
    pub ampdu_cnt: u8,
    /// Primary channel on which the frame was received.
    pub channel: u8,
    /// Secondary channel. 0: none, 1: above, 2: below.
    pub secondary_channel: u8,
    /// Local receive time in microseconds.
    pub timestamp_us: u32,
    /// Length of the frame including the FCS.
    pub sig_len: u16,
    /// 0 means the hardware saw no error.
    pub rx_state: u8,
}
impl RxControlHeader {
    /// Length of the metadata record in bytes.
    pub const LEN: usize = 28;
    /// Decode the metadata record from the start of a captured buffer.
    pub fn parse(buffer: &[u8]) -> CaptureResult<Self> {
        if buffer.len() < Self::LEN {
            return Err(CaptureError::MalformedFrame);
        }
        let signal = SignalWord::from(metadata_word(buffer, 0));
        let channel = ChannelWord::from(metadata_word(buffer, 2));
        let length = LengthWord::from(metadata_word(buffer, 6));
        Ok(Self {
            rssi: signal.rssi(),
            rate: signal.rate(),
            sig_mode: signal.sig_mode(),
            noise_floor: channel.noise_floor(),
            ampdu_cnt: channel.ampdu_cnt(),
            channel: channel.channel(),
            secondary_channel: channel.secondary_channel(),
            timestamp_us: metadata_word(buffer, 3),
            sig_len: length.sig_len(),
            rx_state: length.rx_state(),
        })
    }
    /// Check if the hardware reported the frame as received without error.
    pub fn is_valid(&self) -> bool {
        self.rx_state == 0
    }
}

#[bitfield(u16)]
/// The frame control field at the start of every 802.11 MAC header.
pub struct FrameControl {
    #[bits(2)]
    pub version: u8,
    #[bits(2)]
    pub frame_type: u8,
    #[bits(4)]
    pub subtype: u8,
    pub to_ds: bool,
    pub from_ds: bool,
    pub more_fragments: bool,
    pub retry: bool,
    pub power_management: bool,
    pub more_data: bool,
    pub protected: bool,
    pub order: bool,
}

/// Borrowed view over an 802.11 MAC header.
///
/// The addresses are returned as references into the MPDU buffer, so nothing
/// is copied. All accessors stay inside the bounds checked at parse time; the
/// optional fourth address is only read, when the DS bits declare it present
/// and the buffer is long enough.
pub struct MacHeader<'a> {
    mpdu: &'a [u8],
}
impl<'a> MacHeader<'a> {
    /// Fixed header length without the optional fourth address.
    pub const MIN_LEN: usize = 24;
    /// Header length with the fourth address present.
    pub const LEN_WITH_ADDR4: usize = 30;
    /// Create a view over the MPDU bytes following the metadata record.
    pub fn parse(mpdu: &'a [u8]) -> CaptureResult<Self> {
        if mpdu.len() < Self::MIN_LEN {
            return Err(CaptureError::MalformedFrame);
        }
        Ok(Self { mpdu })
    }
    fn address_at(&self, offset: usize) -> &'a [u8; 6] {
        self.mpdu[offset..offset + 6].try_into().unwrap()
    }
    pub fn frame_control(&self) -> FrameControl {
        u16::from_le_bytes(self.mpdu[0..2].try_into().unwrap()).into()
    }
    pub fn duration_id(&self) -> u16 {
        u16::from_le_bytes(self.mpdu[2..4].try_into().unwrap())
    }
    /// The receiver address (addr1).
    pub fn receiver_address(&self) -> &'a [u8; 6] {
        self.address_at(4)
    }
    /// The transmitter address (addr2). For a beacon this is the BSSID of
    /// the sending AP.
    pub fn transmitter_address(&self) -> &'a [u8; 6] {
        self.address_at(10)
    }
    /// The filtering address (addr3).
    pub fn filtering_address(&self) -> &'a [u8; 6] {
        self.address_at(16)
    }
    pub fn sequence_control(&self) -> u16 {
        u16::from_le_bytes(self.mpdu[22..24].try_into().unwrap())
    }
    /// The fourth address, present only in frames between two DS stations.
    pub fn address4(&self) -> Option<&'a [u8; 6]> {
        let frame_control = self.frame_control();
        if frame_control.to_ds()
            && frame_control.from_ds()
            && self.mpdu.len() >= Self::LEN_WITH_ADDR4
        {
            Some(self.address_at(24))
        } else {
            None
        }
    }
}

/// Byte for byte comparison of two hardware addresses.
///
/// No wildcard or partial matching; this is exactly the check the capture
/// handler runs between the BSSID of the associated AP and the transmitter
/// address of a captured frame.
pub fn addresses_match(reference: &[u8; 6], candidate: &[u8; 6]) -> bool {
    reference == candidate
}
