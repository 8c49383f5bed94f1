//! Integration tests for the full button-press → keystroke pipeline.

use bluekey::buttons::{ButtonAction, HoldMonitor};
use bluekey::config::RemoteConfig;
use bluekey::hid::{HidChannel, Key, KeyEvent, Modifier};
use bluekey::macros::{MacroEngine, Step};
use bluekey::Error;

/// HID channel that records each event with the tick it was sent on.
struct RecordingHid {
    events: Vec<(u64, KeyEvent)>,
    now: u64,
}

impl RecordingHid {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            now: 0,
        }
    }

    fn time_of(&self, wanted: KeyEvent) -> u64 {
        self.events
            .iter()
            .find(|(_, e)| *e == wanted)
            .map(|(t, _)| *t)
            .expect("event was never sent")
    }
}

impl HidChannel for RecordingHid {
    fn send(&mut self, event: KeyEvent) -> Result<(), Error> {
        self.events.push((self.now, event));
        Ok(())
    }
}

/// Poll the engine once per simulated millisecond until the run ends.
fn run_until_idle(engine: &mut MacroEngine, hid: &mut RecordingHid, start: u64) -> u64 {
    let mut now = start;
    for _ in 0..10_000_000u64 {
        hid.now = now;
        match engine.poll(now, hid).expect("emission failed") {
            Step::Finished | Step::Idle => return now,
            Step::Waiting | Step::Emitted => {}
        }
        now += 1;
    }
    panic!("engine never went idle");
}

#[test]
fn tapping_a_button_types_its_macro() {
    let cfg = RemoteConfig::firmware_defaults();
    let mut monitor = HoldMonitor::new(&cfg);
    let mut engine = MacroEngine::new(&cfg);
    let mut hid = RecordingHid::new();
    engine.registry_mut().set(1, "ok").unwrap();

    monitor.on_press(1, 0);
    assert_eq!(monitor.poll(80), None);
    let action = monitor.on_release(1).expect("short press fires the macro");
    assert_eq!(action, ButtonAction::ExecuteMacro(1));

    engine.execute_button(1, 100).unwrap();
    run_until_idle(&mut engine, &mut hid, 100);

    let keys: Vec<KeyEvent> = hid.events.iter().map(|(_, e)| *e).collect();
    assert_eq!(
        keys,
        vec![
            KeyEvent::Down(Key::Char('o')),
            KeyEvent::Up(Key::Char('o')),
            KeyEvent::Down(Key::Char('k')),
            KeyEvent::Up(Key::Char('k')),
        ]
    );
}

#[test]
fn lock_macro_wraps_the_keystroke_in_super() {
    let cfg = RemoteConfig::firmware_defaults();
    let mut engine = MacroEngine::new(&cfg);
    let mut hid = RecordingHid::new();
    engine.registry_mut().set(0, "{LOCK}").unwrap();

    engine.execute_button(0, 0).unwrap();
    run_until_idle(&mut engine, &mut hid, 0);

    let keys: Vec<KeyEvent> = hid.events.iter().map(|(_, e)| *e).collect();
    assert_eq!(
        keys,
        vec![
            KeyEvent::Down(Key::Modifier(Modifier::Windows)),
            KeyEvent::Down(Key::Char('l')),
            KeyEvent::Up(Key::Char('l')),
            KeyEvent::Up(Key::Modifier(Modifier::Windows)),
        ]
    );

    // The spacing contract holds between the modifier and the letter.
    let gap = hid.time_of(KeyEvent::Down(Key::Char('l')))
        - hid.time_of(KeyEvent::Down(Key::Modifier(Modifier::Windows)));
    assert!(gap >= cfg.keystroke_spacing_ms as u64);
}

#[test]
fn sleep_macro_waits_a_full_delay_unit_before_the_menu_keys() {
    let cfg = RemoteConfig::firmware_defaults();
    let mut engine = MacroEngine::new(&cfg);
    let mut hid = RecordingHid::new();
    engine.registry_mut().set(2, "{SLEEP}").unwrap();

    engine.execute_button(2, 0).unwrap();
    run_until_idle(&mut engine, &mut hid, 0);

    // {!1} sits between the Win+X release and the menu letters.
    let gap = hid.time_of(KeyEvent::Down(Key::Char('u')))
        - hid.time_of(KeyEvent::Up(Key::Modifier(Modifier::Windows)));
    assert!(gap >= cfg.delay_unit_ms as u64, "gap was only {} ms", gap);

    // The menu letters come out in order after the pause.
    let u_at = hid.time_of(KeyEvent::Down(Key::Char('u')));
    let s_at = hid.time_of(KeyEvent::Down(Key::Char('s')));
    assert!(s_at > u_at);
}

#[test]
fn overlapping_press_is_dropped_while_a_macro_is_emitting() {
    let cfg = RemoteConfig::firmware_defaults();
    let mut monitor = HoldMonitor::new(&cfg);
    let mut engine = MacroEngine::new(&cfg);
    let mut hid = RecordingHid::new();
    engine.registry_mut().set(0, "first").unwrap();
    engine.registry_mut().set(1, "second").unwrap();

    monitor.on_press(0, 0);
    assert_eq!(monitor.on_release(0), Some(ButtonAction::ExecuteMacro(0)));
    engine.execute_button(0, 10).unwrap();

    // A second button tap lands mid-run and is dropped with no effect.
    monitor.on_press(1, 20);
    assert_eq!(monitor.on_release(1), Some(ButtonAction::ExecuteMacro(1)));
    assert_eq!(engine.execute_button(1, 30), Err(Error::MacroInFlight));

    run_until_idle(&mut engine, &mut hid, 30);

    let typed: String = hid
        .events
        .iter()
        .filter_map(|(_, e)| match e {
            KeyEvent::Down(Key::Char(c)) => Some(*c),
            _ => None,
        })
        .collect();
    assert_eq!(typed, "first");

    // Once idle, the dropped button works again as a fresh press.
    engine.execute_button(1, 100_000).unwrap();
}

#[test]
fn pairing_hold_preempts_an_emitting_macro_cleanly() {
    let cfg = RemoteConfig::firmware_defaults();
    let mut monitor = HoldMonitor::new(&cfg);
    let mut engine = MacroEngine::new(&cfg);
    let mut hid = RecordingHid::new();
    engine.registry_mut().set(1, "{WINDOWS}abcdefgh").unwrap();

    monitor.on_press(1, 0);
    assert_eq!(monitor.on_release(1), Some(ButtonAction::ExecuteMacro(1)));
    engine.execute_button(1, 0).unwrap();

    // Run part of the macro so the modifier is held.
    for now in 0..60 {
        hid.now = now;
        engine.poll(now, &mut hid).unwrap();
    }
    assert!(engine.is_in_flight());

    // The pairing button crosses its threshold mid-run.
    monitor.on_press(0, 60);
    let action = monitor.poll(60 + cfg.pairing_hold_ms).unwrap();
    assert_eq!(action, ButtonAction::EnterPairingMode);

    // The dispatcher cancels the run before entering pairing mode; no
    // modifier may leak into the next connection.
    engine.cancel(&mut hid);
    assert!(!engine.is_in_flight());
    assert_eq!(
        hid.events.last().map(|(_, e)| *e),
        Some(KeyEvent::Up(Key::Modifier(Modifier::Windows)))
    );
}
