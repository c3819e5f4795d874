use embassy_sync::channel::{Channel, DynamicReceiver};
use embassy_time::{Duration, Timer};

use crate::{
    driver::{CaptureError, CaptureResult, PromiscuousRadio},
    sniffer::Sniffer,
    DefaultRawMutex,
};

/// Connectivity events reported by the network driver's event dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StationEvent {
    /// The station interface came up.
    Started,
    /// The station interface went down.
    Stopped,
    /// Association with the AP succeeded. DHCP runs next, so no action yet.
    Connected,
    /// Association with the AP was lost.
    Disconnected,
    /// The station acquired an IP address and is fully usable.
    GotIp,
}

/// Connection control surface of the network driver.
pub trait StationControl {
    /// Ask the driver to associate with the configured AP.
    fn connect(&mut self) -> CaptureResult<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// How many reconnect attempts to make after losing the association.
    pub max_retries: usize,
    /// Cooperative delay between reconnect attempts.
    pub retry_delay: Duration,
}
impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Channel feeding [StationEvent]s from the driver's event dispatch into
/// [ConnectionManager::run].
pub type StationEventChannel = Channel<DefaultRawMutex, StationEvent, 8>;

/// Reacts to driver level connectivity events and brings up capture, once
/// the station has a confirmed IP.
///
/// Reconnects after a lost association are bounded and spaced by
/// [ConnectionConfig::retry_delay], so a missing AP can not starve other
/// scheduled work. Once the budget is used up, the station stays down until
/// an external event retriggers association.
pub struct ConnectionManager<'res, C, R> {
    control: C,
    sniffer: Sniffer<'res, R>,
    config: ConnectionConfig,
    retries_left: usize,
}
impl<'res, C: StationControl, R: PromiscuousRadio<'res>> ConnectionManager<'res, C, R> {
    pub fn new(control: C, sniffer: Sniffer<'res, R>, config: ConnectionConfig) -> Self {
        Self {
            control,
            sniffer,
            retries_left: config.max_retries,
            config,
        }
    }
    pub fn sniffer(&mut self) -> &mut Sniffer<'res, R> {
        &mut self.sniffer
    }
    /// React to a single connectivity event.
    pub async fn handle_event(&mut self, event: StationEvent) -> CaptureResult<()> {
        match event {
            StationEvent::Started => {
                debug!("Station started, requesting association.");
                self.control.connect()
            }
            StationEvent::Stopped => Ok(()),
            StationEvent::Connected => {
                debug!("Associated with the AP, waiting for an IP.");
                self.retries_left = self.config.max_retries;
                Ok(())
            }
            StationEvent::Disconnected => self.reconnect().await,
            StationEvent::GotIp => {
                debug!("Got an IP, enabling capture.");
                self.sniffer.enable_capture()
            }
        }
    }
    async fn reconnect(&mut self) -> CaptureResult<()> {
        if self.retries_left == 0 {
            error!("Connecting to the AP failed, retry budget exhausted.");
            return Err(CaptureError::RetriesExhausted);
        }
        self.retries_left -= 1;
        Timer::after(self.config.retry_delay).await;
        debug!("Retrying to connect to the AP.");
        self.control.connect()
    }
    /// Dispatch loop over the driver's connectivity events.
    ///
    /// An exhausted retry budget is absorbed, since a later external event
    /// may bring the station back; a rejected driver configuration is fatal
    /// and returned to the caller.
    pub async fn run(&mut self, events: DynamicReceiver<'_, StationEvent>) -> CaptureResult<()> {
        loop {
            let event = events.receive().await;
            match self.handle_event(event).await {
                Err(CaptureError::RetriesExhausted) => {}
                other => other?,
            }
        }
    }
}
