//! Digital and analog input sampling.
//!
//! Buttons and the jack sense line are debounced by RC filters on the board,
//! so software takes exactly one sample per tick. The two mode switches are
//! not filtered at all; they are only flipped by hand between games.

use embedded_hal::digital::InputPin;

use crate::config::{Axis, MAX_SPEED};

/// Highest raw value of the 10-bit speed dial reading.
pub const ADC_MAX: u16 = 1023;

/// Active-low input with a pull-up: reads `true` while the line is held low.
pub struct ActiveLow<P> {
    pin: P,
}

impl<P: InputPin> ActiveLow<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// `true` when the switch is closed (line pulled low).
    ///
    /// A failed read counts as released.
    pub fn is_active(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(low) => low,
            Err(_) => {
                warn!("input read failed, treating line as released");
                false
            }
        }
    }
}

/// Map a 10-bit dial reading onto `1..=MAX_SPEED`.
///
/// Linear with truncation; readings above [`ADC_MAX`] clamp to the top.
#[must_use]
pub fn speed_dial_from_adc(raw: u16) -> u8 {
    let raw = raw.min(ADC_MAX) as u32;
    (raw * (MAX_SPEED as u32 - 1) / ADC_MAX as u32 + 1) as u8
}

/// Map a 12-bit converter reading onto `1..=MAX_SPEED`.
#[inline]
#[must_use]
pub fn speed_dial_from_adc12(raw: u16) -> u8 {
    speed_dial_from_adc(raw >> 2)
}

/// Everything sampled at the start of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSnapshot {
    pub jack_present: bool,
    pub events_enabled: bool,
    pub axis: Axis,
    /// Speed dial position, `1..=MAX_SPEED`.
    pub speed_dial: u8,
    pub button_a: bool,
    pub button_b: bool,
    /// Raw pedal line as read, before polarity correction.
    pub button_ext: bool,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            jack_present: false,
            events_enabled: true,
            axis: Axis::X,
            speed_dial: 1,
            button_a: false,
            button_b: false,
            button_ext: false,
        }
    }
}

/// The six digital lines the main loop samples every tick.
pub struct InputReader<P> {
    pub button_a: ActiveLow<P>,
    pub button_b: ActiveLow<P>,
    pub button_ext: ActiveLow<P>,
    pub jack_sense: ActiveLow<P>,
    /// Closed selects the Y axis.
    pub axis_switch: ActiveLow<P>,
    /// Closed disables pointer events.
    pub disable_switch: ActiveLow<P>,
}

impl<P: InputPin> InputReader<P> {
    /// Sample all lines once, combined with an already mapped dial value.
    pub fn sample(&mut self, speed_dial: u8) -> InputSnapshot {
        InputSnapshot {
            jack_present: self.jack_sense.is_active(),
            events_enabled: !self.disable_switch.is_active(),
            axis: if self.axis_switch.is_active() {
                Axis::Y
            } else {
                Axis::X
            },
            speed_dial: speed_dial.clamp(1, MAX_SPEED),
            button_a: self.button_a.is_active(),
            button_b: self.button_b.is_active(),
            button_ext: self.button_ext.is_active(),
        }
    }
}
