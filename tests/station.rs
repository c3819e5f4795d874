use std::sync::{Arc, Mutex};

use embassy_futures::block_on;
use embassy_time::Duration;
use wifi_beacon_sync::{
    CaptureError, CaptureResult, ConnectionConfig, ConnectionManager, FrameSink, FrameType,
    PromiscuousRadio, RxFilterMask, Sniffer, StationControl, StationEvent, StationEventChannel,
};

struct NullSink;
impl FrameSink for NullSink {
    fn on_frame_received(&self, _buffer: &[u8], _frame_type: FrameType) {}
}

#[derive(Default)]
struct RadioState {
    reject: bool,
    promiscuous_calls: usize,
    filter_calls: usize,
}

#[derive(Clone, Default)]
struct MockRadio {
    state: Arc<Mutex<RadioState>>,
}
impl<'res> PromiscuousRadio<'res> for MockRadio {
    fn set_rx_filter(&mut self, _filter: RxFilterMask) -> CaptureResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.reject {
            return Err(CaptureError::DriverConfiguration);
        }
        state.filter_calls += 1;
        Ok(())
    }
    fn set_promiscuous_mode(&mut self, _enabled: bool) -> CaptureResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.reject {
            return Err(CaptureError::DriverConfiguration);
        }
        state.promiscuous_calls += 1;
        Ok(())
    }
    fn set_rx_callback(&mut self, _sink: &'res dyn FrameSink) -> CaptureResult<()> {
        if self.state.lock().unwrap().reject {
            return Err(CaptureError::DriverConfiguration);
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct MockControl {
    connects: Arc<Mutex<usize>>,
}
impl StationControl for MockControl {
    fn connect(&mut self) -> CaptureResult<()> {
        *self.connects.lock().unwrap() += 1;
        Ok(())
    }
}

fn test_config(max_retries: usize) -> ConnectionConfig {
    ConnectionConfig {
        max_retries,
        retry_delay: Duration::from_millis(1),
    }
}

fn manager(
    max_retries: usize,
) -> (
    ConnectionManager<'static, MockControl, MockRadio>,
    Arc<Mutex<usize>>,
    Arc<Mutex<RadioState>>,
) {
    let control = MockControl::default();
    let connects = control.connects.clone();
    let radio = MockRadio::default();
    let state = radio.state.clone();
    let sniffer = Sniffer::new(radio, &NullSink);
    (
        ConnectionManager::new(control, sniffer, test_config(max_retries)),
        connects,
        state,
    )
}

#[test]
fn station_start_requests_association() {
    let (mut manager, connects, _) = manager(5);
    block_on(manager.handle_event(StationEvent::Started)).unwrap();
    assert_eq!(*connects.lock().unwrap(), 1);
}

#[test]
fn stop_and_connect_take_no_driver_action() {
    let (mut manager, connects, state) = manager(5);
    block_on(manager.handle_event(StationEvent::Stopped)).unwrap();
    block_on(manager.handle_event(StationEvent::Connected)).unwrap();
    assert_eq!(*connects.lock().unwrap(), 0);
    assert_eq!(state.lock().unwrap().promiscuous_calls, 0);
}

#[test]
fn reconnect_budget_exhausts() {
    let (mut manager, connects, _) = manager(2);
    block_on(manager.handle_event(StationEvent::Disconnected)).unwrap();
    block_on(manager.handle_event(StationEvent::Disconnected)).unwrap();
    assert_eq!(
        block_on(manager.handle_event(StationEvent::Disconnected)),
        Err(CaptureError::RetriesExhausted)
    );
    assert_eq!(*connects.lock().unwrap(), 2);
}

#[test]
fn successful_association_refills_the_budget() {
    let (mut manager, connects, _) = manager(1);
    block_on(manager.handle_event(StationEvent::Disconnected)).unwrap();
    block_on(manager.handle_event(StationEvent::Connected)).unwrap();
    block_on(manager.handle_event(StationEvent::Disconnected)).unwrap();
    assert_eq!(*connects.lock().unwrap(), 2);
}

#[test]
fn got_ip_enables_capture_once_per_cycle() {
    let (mut manager, _, state) = manager(5);
    block_on(manager.handle_event(StationEvent::GotIp)).unwrap();
    block_on(manager.handle_event(StationEvent::GotIp)).unwrap();
    let state = state.lock().unwrap();
    assert_eq!(state.filter_calls, 1);
    assert_eq!(state.promiscuous_calls, 1);
    assert!(manager.sniffer().is_enabled());
}

#[test]
fn run_absorbs_retry_exhaustion_and_fails_on_driver_rejection() {
    let (mut manager, _, state) = manager(0);
    let events = StationEventChannel::new();
    // With an empty retry budget the disconnect exhausts immediately; the
    // loop must absorb that and only bail out on the rejected configuration.
    events.try_send(StationEvent::Disconnected).unwrap();
    events.try_send(StationEvent::GotIp).unwrap();
    state.lock().unwrap().reject = true;
    assert_eq!(
        block_on(manager.run(events.dyn_receiver())),
        Err(CaptureError::DriverConfiguration)
    );
}
