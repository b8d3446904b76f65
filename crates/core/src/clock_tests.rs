use super::*;

#[test]
fn fake_clock_advances_monotonically() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.epoch_ms(), 1_000);
    clock.advance(500);
    assert_eq!(clock.epoch_ms(), 1_500);
    clock.set(10_000);
    assert_eq!(clock.epoch_ms(), 10_000);
}

#[test]
fn system_clock_is_nonzero() {
    let clock = SystemClock;
    assert!(clock.epoch_ms() > 0);
}
