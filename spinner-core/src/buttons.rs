//! Physical switch to logical mouse button mapping.

use crate::config::PedalPolarity;

/// One of the three mouse button roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// All roles in report order.
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    /// Bit of this button in a HID mouse report.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            MouseButton::Left => 1 << 0,
            MouseButton::Right => 1 << 1,
            MouseButton::Middle => 1 << 2,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

/// Pressed state of the three logical buttons for one tick.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogicalButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

impl LogicalButtons {
    /// Nothing pressed.
    pub const RELEASED: Self = Self {
        left: false,
        right: false,
        middle: false,
    };

    #[must_use]
    pub const fn new(left: bool, right: bool, middle: bool) -> Self {
        Self {
            left,
            right,
            middle,
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
        }
    }
}

/// Apply the pedal wiring to the raw pedal line.
///
/// A normally-closed pedal reads "pressed" at rest, so its line is inverted.
/// With no known polarity the pedal reads released.
#[inline]
#[must_use]
pub const fn pedal_pressed(raw_ext: bool, polarity: PedalPolarity) -> bool {
    match polarity {
        PedalPolarity::NormallyOpen => raw_ext,
        PedalPolarity::NormallyClosed => !raw_ext,
        PedalPolarity::Unknown => false,
    }
}

/// Map physical switches onto logical buttons.
///
/// | jack  | swapped | left  | right | middle |
/// |-------|---------|-------|-------|--------|
/// | false | false   | A     | B     | -      |
/// | false | true    | B     | A     | -      |
/// | true  | false   | pedal | A     | B      |
/// | true  | true    | A     | pedal | B      |
#[must_use]
pub const fn remap(
    jack_present: bool,
    swapped: bool,
    polarity: PedalPolarity,
    button_a: bool,
    button_b: bool,
    button_ext: bool,
) -> LogicalButtons {
    if !jack_present {
        return if swapped {
            LogicalButtons::new(button_b, button_a, false)
        } else {
            LogicalButtons::new(button_a, button_b, false)
        };
    }

    let pedal = pedal_pressed(button_ext, polarity);
    if swapped {
        LogicalButtons::new(button_a, pedal, button_b)
    } else {
        LogicalButtons::new(pedal, button_a, button_b)
    }
}

/// Pedal connection as seen through the jack sense line.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PedalState {
    #[default]
    Disconnected,
    /// Jack just made contact; the pedal line is sampled on the next tick.
    DetectingPolarity,
    Connected(PedalPolarity),
}

impl PedalState {
    /// Polarity to use for remapping in this state.
    #[must_use]
    pub const fn polarity(self) -> PedalPolarity {
        match self {
            PedalState::Connected(polarity) => polarity,
            _ => PedalPolarity::Unknown,
        }
    }

    #[must_use]
    pub const fn jack_present(self) -> bool {
        !matches!(self, PedalState::Disconnected)
    }
}

/// What changed during one [`PedalTracker::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PedalChange {
    None,
    Inserted,
    Detected(PedalPolarity),
    Removed,
}

/// One-shot pedal polarity latch.
///
/// `Disconnected -> DetectingPolarity -> Connected(polarity)`, back to
/// `Disconnected` whenever the jack is pulled. The pedal line is sampled for
/// polarity exactly once per connection.
#[derive(Clone, Copy, Default, Debug)]
pub struct PedalTracker {
    state: PedalState,
}

impl PedalTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: PedalState::Disconnected,
        }
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> PedalState {
        self.state
    }

    /// Advance with this tick's jack sense and raw pedal line.
    pub fn update(&mut self, jack_present: bool, raw_ext: bool) -> PedalChange {
        let (next, change) = match (self.state, jack_present) {
            (PedalState::Disconnected, false) => (PedalState::Disconnected, PedalChange::None),
            (PedalState::Disconnected, true) => {
                (PedalState::DetectingPolarity, PedalChange::Inserted)
            }
            (PedalState::DetectingPolarity, true) => {
                // at rest a normally-closed pedal already pulls the line low
                let polarity = if raw_ext {
                    PedalPolarity::NormallyClosed
                } else {
                    PedalPolarity::NormallyOpen
                };
                (PedalState::Connected(polarity), PedalChange::Detected(polarity))
            }
            (PedalState::Connected(polarity), true) => {
                (PedalState::Connected(polarity), PedalChange::None)
            }
            (_, false) => (PedalState::Disconnected, PedalChange::Removed),
        };
        self.state = next;
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO: PedalPolarity = PedalPolarity::NormallyOpen;
    const NC: PedalPolarity = PedalPolarity::NormallyClosed;

    #[test]
    fn test_no_jack_primary_is_left() {
        let buttons = remap(false, false, PedalPolarity::Unknown, true, false, false);
        assert_eq!(buttons, LogicalButtons::new(true, false, false));
    }

    #[test]
    fn test_no_jack_swap_flips_left_right() {
        let buttons = remap(false, true, PedalPolarity::Unknown, true, false, true);
        assert_eq!(buttons, LogicalButtons::new(false, true, false));
        let buttons = remap(false, true, PedalPolarity::Unknown, false, true, false);
        assert_eq!(buttons, LogicalButtons::new(true, false, false));
    }

    #[test]
    fn test_no_jack_ignores_ext() {
        let buttons = remap(false, false, NO, false, false, true);
        assert_eq!(buttons, LogicalButtons::RELEASED);
    }

    #[test]
    fn test_jack_pedal_is_left() {
        let buttons = remap(true, false, NO, false, false, true);
        assert_eq!(buttons, LogicalButtons::new(true, false, false));
        let buttons = remap(true, false, NO, true, true, false);
        assert_eq!(buttons, LogicalButtons::new(false, true, true));
    }

    #[test]
    fn test_jack_swap_keeps_middle() {
        let plain = remap(true, false, NO, true, true, true);
        let swapped = remap(true, true, NO, true, true, true);
        assert_eq!(plain.middle, swapped.middle);

        let swapped = remap(true, true, NO, true, false, false);
        assert_eq!(swapped, LogicalButtons::new(true, false, false));
        let swapped = remap(true, true, NO, false, true, true);
        assert_eq!(swapped, LogicalButtons::new(false, true, true));
    }

    #[test]
    fn test_normally_closed_inverts_pedal() {
        // pedal at rest reads "pressed" on an NC switch
        let buttons = remap(true, false, NC, false, false, true);
        assert_eq!(buttons, LogicalButtons::RELEASED);
        let buttons = remap(true, false, NC, false, false, false);
        assert_eq!(buttons, LogicalButtons::new(true, false, false));
    }

    #[test]
    fn test_unknown_polarity_pedal_released() {
        assert!(!pedal_pressed(true, PedalPolarity::Unknown));
        assert!(!pedal_pressed(false, PedalPolarity::Unknown));
    }

    #[test]
    fn test_tracker_detects_once() {
        let mut tracker = PedalTracker::new();
        assert_eq!(tracker.update(false, false), PedalChange::None);
        assert_eq!(tracker.update(true, false), PedalChange::Inserted);
        assert_eq!(tracker.state(), PedalState::DetectingPolarity);
        assert_eq!(tracker.update(true, false), PedalChange::Detected(NO));
        assert_eq!(tracker.state(), PedalState::Connected(NO));
        // pressing the pedal later does not re-detect
        assert_eq!(tracker.update(true, true), PedalChange::None);
        assert_eq!(tracker.state().polarity(), NO);
    }

    #[test]
    fn test_tracker_detects_normally_closed() {
        let mut tracker = PedalTracker::new();
        tracker.update(true, true);
        assert_eq!(tracker.update(true, true), PedalChange::Detected(NC));
        assert_eq!(tracker.state().polarity(), NC);
    }

    #[test]
    fn test_tracker_redetects_after_removal() {
        let mut tracker = PedalTracker::new();
        tracker.update(true, false);
        tracker.update(true, false);
        assert_eq!(tracker.update(false, false), PedalChange::Removed);
        assert_eq!(tracker.state(), PedalState::Disconnected);
        assert_eq!(tracker.state().polarity(), PedalPolarity::Unknown);

        assert_eq!(tracker.update(true, true), PedalChange::Inserted);
        assert_eq!(tracker.update(true, true), PedalChange::Detected(NC));
    }

    #[test]
    fn test_tracker_removed_while_detecting() {
        let mut tracker = PedalTracker::new();
        tracker.update(true, false);
        assert_eq!(tracker.update(false, false), PedalChange::Removed);
        assert!(!tracker.state().jack_present());
    }

    #[test]
    fn test_button_masks() {
        let bits = MouseButton::ALL.iter().fold(0u8, |acc, b| acc | b.mask());
        assert_eq!(bits, 0b111);
    }
}
