//! Quadrature encoder edge handling.

use embassy_futures::select::select;
use embassy_rp::gpio::Input;
use spinner_core::{EncoderPosition, QuadratureDecoder};

/// Decode encoder edges into `position`, forever.
///
/// Meant to run on the high-priority executor so that no edge waits behind
/// the main loop. Each wait is armed against the levels just decoded and is
/// level-triggered, so a line that changed between the read and the re-arm
/// wakes the task at once instead of waiting for the next edge.
pub async fn track(a: &mut Input<'_>, b: &mut Input<'_>, position: &EncoderPosition) -> ! {
    let mut a_high = a.is_high();
    let mut b_high = b.is_high();
    let mut decoder = QuadratureDecoder::new(a_high, b_high);

    loop {
        select(wait_for_change(a, a_high), wait_for_change(b, b_high)).await;

        a_high = a.is_high();
        b_high = b.is_high();
        let step = decoder.update(a_high, b_high);
        if step != 0 {
            position.add(i32::from(step));
        }
    }
}

/// Wait until `pin` no longer reads `high`.
async fn wait_for_change(pin: &mut Input<'_>, high: bool) {
    if high {
        pin.wait_for_low().await;
    } else {
        pin.wait_for_high().await;
    }
}
