//! Boot sequence: slow-mode latch and the ready wait.
//!
//! Holding the primary button through [`BOOT_DWELL_MS`] at power-on latches
//! slow mode. Before the main loop starts the firmware waits until the host
//! has had [`MIN_BOOT_DELAY_MS`] to enumerate the device and the button has
//! been let go, so the latch press is never seen as a click.
//!
//! The waits are `async` so the USB stack keeps running and the host can
//! enumerate while the main loop is held back.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

use crate::config::{
    Configuration, SpeedMode, BOOT_BLINK_MS, BOOT_DWELL_MS, MIN_BOOT_DELAY_MS,
};
use crate::input::ActiveLow;

/// Give up waiting for the primary button to be released after this long.
pub const BOOT_RELEASE_TIMEOUT_MS: u32 = 10_000;

/// Sample the primary button, dwell, and sample again.
///
/// Only a press that is still held after [`BOOT_DWELL_MS`] selects
/// [`SpeedMode::Slow`].
pub async fn latch_speed_mode<P, D>(button: &mut ActiveLow<P>, delay: &mut D) -> SpeedMode
where
    P: InputPin,
    D: DelayNs,
{
    latch(button, delay).await.0
}

/// Latch the speed mode, also returning how long the dwell took.
async fn latch<P, D>(button: &mut ActiveLow<P>, delay: &mut D) -> (SpeedMode, u32)
where
    P: InputPin,
    D: DelayNs,
{
    if !button.is_active() {
        return (SpeedMode::Normal, 0);
    }

    delay.delay_ms(BOOT_DWELL_MS).await;

    let mode = if button.is_active() {
        SpeedMode::Slow
    } else {
        SpeedMode::Normal
    };
    (mode, BOOT_DWELL_MS)
}

/// Wait until the boot delay has passed and the primary button is up.
///
/// `elapsed_ms` is the time since power-on when the wait starts. In slow mode
/// the LED blinks while waiting; in normal mode it stays dark. The LED is
/// always left off. Returns the elapsed time when the wait ended.
pub async fn wait_until_ready<P, L, D>(
    button: &mut ActiveLow<P>,
    led: &mut L,
    delay: &mut D,
    mut elapsed_ms: u32,
    mode: SpeedMode,
) -> u32
where
    P: InputPin,
    L: OutputPin,
    D: DelayNs,
{
    let started_ms = elapsed_ms;
    let mut lit = false;

    loop {
        let released = !button.is_active();
        if elapsed_ms >= MIN_BOOT_DELAY_MS && released {
            break;
        }
        if elapsed_ms.saturating_sub(started_ms) >= BOOT_RELEASE_TIMEOUT_MS {
            warn!("primary button still held after boot, starting anyway");
            break;
        }

        if mode == SpeedMode::Slow {
            lit = !lit;
            set_led(led, lit);
        }

        delay.delay_ms(BOOT_BLINK_MS).await;
        elapsed_ms = elapsed_ms.saturating_add(BOOT_BLINK_MS);
    }

    set_led(led, false);
    elapsed_ms
}

/// What the boot phase hands to the main loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootOutcome {
    pub config: Configuration,
    /// The primary button was still down when the ready wait gave up.
    pub primary_held: bool,
}

/// Run the whole boot phase and return the session configuration.
pub async fn run<P, L, D>(
    button: &mut ActiveLow<P>,
    led: &mut L,
    delay: &mut D,
    elapsed_ms: u32,
) -> BootOutcome
where
    P: InputPin,
    L: OutputPin,
    D: DelayNs,
{
    let (mode, dwell_ms) = latch(button, delay).await;
    let elapsed_ms = elapsed_ms.saturating_add(dwell_ms);
    info!("boot speed mode: {:?}", mode);

    let ready_ms = wait_until_ready(button, led, delay, elapsed_ms, mode).await;
    debug!("boot finished after {} ms", ready_ms);

    BootOutcome {
        config: Configuration::new(mode),
        primary_held: button.is_active(),
    }
}

fn set_led<L: OutputPin>(led: &mut L, on: bool) {
    let result = if on { led.set_high() } else { led.set_low() };
    if result.is_err() {
        warn!("status LED write failed");
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::buttons::MouseButton;
    use crate::config::{NORMAL_PCT, SLOW_PCT};
    use crate::engine::Engine;
    use crate::input::InputSnapshot;
    use crate::output::mock::{HostEvent, RecordingSink};
    use crate::quadrature::EncoderPosition;
    use core::cell::Cell;
    use core::convert::Infallible;
    use core::future::Future;
    use core::pin::Pin;
    use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;
    use std::string::String;

    /// Delay that advances a shared clock instead of sleeping.
    struct MockDelay {
        now_ms: Rc<Cell<u32>>,
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.now_ms.set(self.now_ms.get() + ns / 1_000_000);
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.now_ms.set(self.now_ms.get() + ms);
        }
    }

    // Helper to run a future to completion (mock delays never pend)
    fn block_on<F: Future>(mut f: F) -> F::Output {
        fn noop_raw_waker() -> RawWaker {
            fn noop(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                noop_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
            RawWaker::new(core::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
        let mut cx = Context::from_waker(&waker);

        // SAFETY: We don't move f after pinning
        let mut f = unsafe { Pin::new_unchecked(&mut f) };

        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => result,
            Poll::Pending => panic!("Mock future returned Pending unexpectedly"),
        }
    }

    /// Button held down until the shared clock reaches `release_at_ms`.
    struct HeldButton {
        now_ms: Rc<Cell<u32>>,
        release_at_ms: u32,
    }

    impl ErrorType for HeldButton {
        type Error = Infallible;
    }

    impl InputPin for HeldButton {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.now_ms.get() >= self.release_at_ms)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.now_ms.get() < self.release_at_ms)
        }
    }

    #[derive(Default)]
    struct MockLed {
        on: bool,
        switches: u32,
    }

    impl ErrorType for MockLed {
        type Error = Infallible;
    }

    impl OutputPin for MockLed {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.on {
                self.switches += 1;
            }
            self.on = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if !self.on {
                self.switches += 1;
            }
            self.on = true;
            Ok(())
        }
    }

    fn fixture(release_at_ms: u32) -> (ActiveLow<HeldButton>, MockDelay, Rc<Cell<u32>>) {
        let now_ms = Rc::new(Cell::new(0));
        let button = ActiveLow::new(HeldButton {
            now_ms: now_ms.clone(),
            release_at_ms,
        });
        let delay = MockDelay {
            now_ms: now_ms.clone(),
        };
        (button, delay, now_ms)
    }

    #[test]
    fn test_no_press_is_normal() {
        let (mut button, mut delay, now_ms) = fixture(0);
        assert_eq!(block_on(latch_speed_mode(&mut button, &mut delay)), SpeedMode::Normal);
        assert_eq!(now_ms.get(), 0);
    }

    #[test]
    fn test_sustained_press_latches_slow() {
        let (mut button, mut delay, _) = fixture(2_500);
        assert_eq!(block_on(latch_speed_mode(&mut button, &mut delay)), SpeedMode::Slow);
    }

    #[test]
    fn test_short_press_stays_normal() {
        let (mut button, mut delay, _) = fixture(1_999);
        assert_eq!(block_on(latch_speed_mode(&mut button, &mut delay)), SpeedMode::Normal);
    }

    #[test]
    fn test_boot_slow_configuration() {
        let (mut button, mut delay, now_ms) = fixture(4_200);
        let mut led = MockLed::default();
        let outcome = block_on(run(&mut button, &mut led, &mut delay, 0));
        assert_eq!(outcome.config.speed_percent, SLOW_PCT);
        assert_eq!(outcome.config.default_speed_percent, SLOW_PCT);
        assert!(!outcome.primary_held);
        // waited for the release, not just the boot delay
        assert!(now_ms.get() >= 4_200);
        assert!(led.switches > 0);
        assert!(!led.on);
    }

    #[test]
    fn test_boot_normal_waits_minimum_delay_with_led_off() {
        let (mut button, mut delay, now_ms) = fixture(0);
        let mut led = MockLed::default();
        let outcome = block_on(run(&mut button, &mut led, &mut delay, 0));
        assert_eq!(outcome.config.speed_percent, NORMAL_PCT);
        assert!(now_ms.get() >= MIN_BOOT_DELAY_MS);
        assert_eq!(led.switches, 0);
    }

    #[test]
    fn test_ready_wait_skipped_when_already_late() {
        let (mut button, mut delay, now_ms) = fixture(0);
        let mut led = MockLed::default();
        let ready = block_on(wait_until_ready(
            &mut button,
            &mut led,
            &mut delay,
            5_000,
            SpeedMode::Normal,
        ));
        assert_eq!(ready, 5_000);
        assert_eq!(now_ms.get(), 0);
    }

    #[test]
    fn test_ready_wait_is_bounded() {
        let (mut button, mut delay, _) = fixture(u32::MAX);
        let mut led = MockLed::default();
        let ready = block_on(wait_until_ready(
            &mut button,
            &mut led,
            &mut delay,
            0,
            SpeedMode::Slow,
        ));
        assert_eq!(ready, BOOT_RELEASE_TIMEOUT_MS);
        assert!(!led.on);
    }

    #[test]
    fn test_stuck_button_does_not_click_after_boot() {
        let (mut button, mut delay, _) = fixture(u32::MAX);
        let mut led = MockLed::default();
        let outcome = block_on(run(&mut button, &mut led, &mut delay, 0));
        assert!(outcome.primary_held);

        let mut engine = Engine::from_boot(outcome);
        let position = EncoderPosition::new();
        let mut sink = RecordingSink::default();
        let mut console = String::new();
        let held = InputSnapshot {
            button_a: true,
            ..InputSnapshot::default()
        };

        for _ in 0..5 {
            engine.tick(&held, &position, &mut sink, &mut console);
        }
        assert!(sink.events.is_empty());

        // a fresh press after letting go clicks normally
        engine.tick(&InputSnapshot::default(), &position, &mut sink, &mut console);
        engine.tick(&held, &position, &mut sink, &mut console);
        assert_eq!(sink.events, [HostEvent::Press(MouseButton::Left)]);
    }
}
