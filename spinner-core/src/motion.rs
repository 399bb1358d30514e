//! Encoder delta to pointer delta scaling.

use crate::config::Axis;

/// Largest magnitude a relative pointer report can carry.
pub const MAX_DELTA: i32 = 127;

/// Pulses-to-counts multiplier for a dial position and speed percentage.
///
/// `dial * percent / 100` with truncating division, floored at 1 so a pulse
/// always moves the pointer.
#[inline]
#[must_use]
pub const fn scale_factor(speed_dial: u8, speed_percent: u8) -> i32 {
    let factor = speed_dial as i32 * speed_percent as i32 / 100;
    if factor < 1 {
        1
    } else {
        factor
    }
}

/// Scale a raw encoder delta into a report delta for `axis`.
///
/// The result is clamped to `-127..=127`. Y is negated so turning the knob
/// forward moves the pointer up.
#[must_use]
pub fn scale(raw_delta: i32, speed_dial: u8, speed_percent: u8, axis: Axis) -> i8 {
    let delta = raw_delta
        .saturating_mul(scale_factor(speed_dial, speed_percent))
        .clamp(-MAX_DELTA, MAX_DELTA);
    let delta = match axis {
        Axis::X => delta,
        Axis::Y => -delta,
    };
    delta as i8
}

/// One relative movement along the selected axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionEvent {
    pub delta: i8,
    pub axis: Axis,
}

impl MotionEvent {
    /// Build the event for a raw delta, or `None` when it scales to zero.
    #[must_use]
    pub fn from_raw(raw_delta: i32, speed_dial: u8, speed_percent: u8, axis: Axis) -> Option<Self> {
        let delta = scale(raw_delta, speed_dial, speed_percent, axis);
        (delta != 0).then_some(Self { delta, axis })
    }

    /// Split into `(dx, dy)`.
    #[must_use]
    pub const fn components(self) -> (i8, i8) {
        match self.axis {
            Axis::X => (self.delta, 0),
            Axis::Y => (0, self.delta),
        }
    }
}
