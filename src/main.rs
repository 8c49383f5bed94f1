//! bluekey embedded entry point (nRF52840 + SoftDevice S140).
//!
//! Task layout:
//!   - One debounced GPIO edge task per button, feeding `BUTTON_EDGES`.
//!   - A control-loop task ticking every `POLL_PERIOD_MS`: drives the hold
//!     monitor, dispatches button actions and advances the macro engine's
//!     resumable sequencer. Nothing here ever blocks on a delay token.
//!   - The SoftDevice runner plus an advertising task; HID-over-GATT
//!     report encoding consumes `KEY_EVENT_CHANNEL` downstream.

#![no_std]
#![no_main]

use defmt::{info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{AnyPin, Input, Pin, Pull};
use embassy_nrf::interrupt::Priority;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Ticker, Timer};
use nrf_softdevice::ble::{gatt_server, peripheral};
use nrf_softdevice::{raw, Softdevice};
use panic_probe as _;

use bluekey::ble::{
    advertising_payload, QueuedHid, KEY_EVENT_CHANNEL, OPEN_BROWSER_SIGNAL, PAIRING_SIGNAL,
};
use bluekey::buttons::{ButtonAction, HoldMonitor};
use bluekey::config::{self, RemoteConfig, BUTTON_DEBOUNCE_MS, POLL_PERIOD_MS};
use bluekey::macros::MacroEngine;
use bluekey::Error;

/// Debounced edge reported by a button task.
#[derive(Clone, Copy, defmt::Format)]
enum ButtonEdge {
    Press(usize),
    Release(usize),
}

static BUTTON_EDGES: Channel<CriticalSectionRawMutex, ButtonEdge, 8> = Channel::new();

/// Debounce one active-low button and report both edges.
#[embassy_executor::task(pool_size = 4)]
async fn button_task(pin: AnyPin, index: usize) {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        btn.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if btn.is_high() {
            continue;
        }
        BUTTON_EDGES.send(ButtonEdge::Press(index)).await;

        btn.wait_for_rising_edge().await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        BUTTON_EDGES.send(ButtonEdge::Release(index)).await;
    }
}

/// Poll loop: hold-duration sampling and macro emission share one tick.
#[embassy_executor::task]
async fn control_task() {
    let cfg = RemoteConfig::firmware_defaults();
    unwrap!(cfg.validate());

    let mut monitor = HoldMonitor::new(&cfg);
    let mut engine = MacroEngine::new(&cfg);
    let mut hid = QueuedHid;

    let mut ticker = Ticker::every(Duration::from_millis(POLL_PERIOD_MS));
    loop {
        ticker.next().await;
        let now = Instant::now().as_millis();

        while let Ok(edge) = BUTTON_EDGES.try_receive() {
            match edge {
                ButtonEdge::Press(i) => monitor.on_press(i, now),
                ButtonEdge::Release(i) => {
                    if let Some(action) = monitor.on_release(i) {
                        dispatch(action, &mut engine, &mut hid, now);
                    }
                }
            }
        }

        if let Some(action) = monitor.poll(now) {
            dispatch(action, &mut engine, &mut hid, now);
        }

        if let Err(e) = engine.poll(now, &mut hid) {
            // Scoped to this run; the loop and other buttons keep going.
            warn!("macro emission aborted: {}", e);
        }
    }
}

fn dispatch(action: ButtonAction, engine: &mut MacroEngine, hid: &mut QueuedHid, now: u64) {
    match action {
        ButtonAction::ExecuteMacro(button) => match engine.execute_button(button, now) {
            Ok(()) => {}
            // Drop policy: a press during an in-flight macro has no effect.
            Err(Error::MacroInFlight) => {}
            Err(e) => warn!("macro for button {} failed: {}", button, e),
        },
        ButtonAction::EnterPairingMode => {
            // Preempt any in-flight run so no modifier leaks into pairing.
            engine.cancel(hid);
            PAIRING_SIGNAL.signal(());
        }
        ButtonAction::OpenWebBrowser => {
            OPEN_BROWSER_SIGNAL.signal(());
        }
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[nrf_softdevice::gatt_service(uuid = "1812")]
struct HidService {
    /// Boot keyboard input report; encoding is the HID service's concern.
    #[characteristic(uuid = "2a4d", read, notify)]
    report: [u8; 8],
}

#[nrf_softdevice::gatt_server]
struct Server {
    hid: HidService,
}

/// Advertise, hold connections, restart on pairing requests.
#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: Server) {
    let mut adv_data = [0u8; 31];
    let adv_len = advertising_payload(config::DEVICE_NAME, &mut adv_data);
    let scan_data = &[];

    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &adv_data[..adv_len],
            scan_data,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &peripheral::Config::default()).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("advertising failed: {:?}", e);
                continue;
            }
        };
        info!("host connected");

        // Serve GATT until disconnect; pairing re-entry restarts advertising.
        gatt_server::run(&conn, &server, |_| {}).await;
        info!("host disconnected");
    }
}

/// Drain queued key events into the HID service seam.
#[embassy_executor::task]
async fn hid_bridge_task() {
    loop {
        let event = KEY_EVENT_CHANNEL.receive().await;
        // Handed to the HOGP encoder; the core's contract ends here.
        defmt::trace!("key event {:?}", event);
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // SoftDevice reserves the highest interrupt priorities.
    let mut hw_config = embassy_nrf::config::Config::default();
    hw_config.gpiote_interrupt_priority = Priority::P2;
    hw_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(hw_config);

    info!("bluekey starting");

    let sd_config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::DEVICE_NAME.as_ptr() as _,
            current_len: config::DEVICE_NAME.len() as u16,
            max_len: config::DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };
    let sd = Softdevice::enable(&sd_config);
    let server = unwrap!(Server::new(sd));

    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(ble_task(sd, server)));
    unwrap!(spawner.spawn(hid_bridge_task()));

    // Buttons 1-4, active low with internal pull-ups (nRF52840-DK wiring).
    unwrap!(spawner.spawn(button_task(p.P0_11.degrade(), 0)));
    unwrap!(spawner.spawn(button_task(p.P0_12.degrade(), 1)));
    unwrap!(spawner.spawn(button_task(p.P0_24.degrade(), 2)));
    unwrap!(spawner.spawn(button_task(p.P0_25.degrade(), 3)));

    unwrap!(spawner.spawn(control_task()));
}
