//! Edge-triggered event emission to the host and the diagnostic console.
//!
//! This is the only place that talks to a [`PointerSink`]. Button events fire
//! on transitions only; motion fires only for non-zero deltas. Every event is
//! echoed to the console as a text line, and button changes keep being echoed
//! while host events are disabled.

use core::fmt::Write;

use crate::buttons::{LogicalButtons, MouseButton};
use crate::motion::MotionEvent;
use crate::output::{OutputError, PointerSink};

/// Tracks the last reported button state and the host enable flag.
#[derive(Debug)]
pub struct EventEmitter {
    previous: LogicalButtons,
    enabled: bool,
}

impl EventEmitter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: LogicalButtons::RELEASED,
            enabled: true,
        }
    }

    /// Button state the next edge comparison starts from.
    #[inline]
    #[must_use]
    pub const fn baseline(&self) -> LogicalButtons {
        self.previous
    }

    /// Forget the previous button state, so held buttons press again.
    #[inline]
    pub fn reset_baseline(&mut self) {
        self.previous = LogicalButtons::RELEASED;
    }

    /// Switch host events on or off.
    ///
    /// Disabling releases every button the host holds. Enabling clears the
    /// baseline so buttons already held are pressed on the next emit.
    /// Returns `true` if the flag changed.
    pub fn set_enabled<S, W>(&mut self, enabled: bool, sink: &mut S, console: &mut W) -> bool
    where
        S: PointerSink,
        W: Write,
    {
        if enabled == self.enabled {
            return false;
        }
        self.enabled = enabled;
        let _ = writeln!(console, "events {}", if enabled { "on" } else { "off" });

        if enabled {
            self.reset_baseline();
        } else {
            release_host_buttons(sink, console);
        }
        true
    }

    /// Release every button the host holds and clear the baseline.
    pub fn release_all<S, W>(&mut self, sink: &mut S, console: &mut W)
    where
        S: PointerSink,
        W: Write,
    {
        release_host_buttons(sink, console);
        self.reset_baseline();
    }

    /// Emit press/release events for every button that changed.
    ///
    /// Returns how many transitions were seen.
    pub fn emit_buttons<S, W>(&mut self, current: LogicalButtons, sink: &mut S, console: &mut W) -> u8
    where
        S: PointerSink,
        W: Write,
    {
        let mut transitions = 0;

        for button in MouseButton::ALL {
            let now = current.get(button);
            if now == self.previous.get(button) {
                continue;
            }
            transitions += 1;

            let verb = if now { "press" } else { "release" };
            let _ = writeln!(console, "{} {}", verb, button.name());

            if self.enabled {
                let result = if now {
                    sink.press(button)
                } else {
                    sink.release(button)
                };
                report(result);
            }
        }

        self.previous = current;
        transitions
    }

    /// Emit one motion event, if host events are enabled.
    ///
    /// Returns `true` if the event was passed to the sink.
    pub fn emit_motion<S, W>(&mut self, event: MotionEvent, sink: &mut S, console: &mut W) -> bool
    where
        S: PointerSink,
        W: Write,
    {
        if !self.enabled {
            return false;
        }

        let (dx, dy) = event.components();
        let _ = writeln!(console, "move {} {}", event.axis.name(), event.delta);
        report(sink.move_by(dx, dy));
        true
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

fn release_host_buttons<S, W>(sink: &mut S, console: &mut W)
where
    S: PointerSink,
    W: Write,
{
    for button in MouseButton::ALL {
        if sink.is_pressed(button) {
            let _ = writeln!(console, "release {}", button.name());
            report(sink.release(button));
        }
    }
}

#[inline]
fn report(result: Result<(), OutputError>) {
    if let Err(e) = result {
        warn!("pointer output failed: {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::Axis;
    use crate::output::mock::{HostEvent, RecordingSink};
    use std::string::String;

    const LEFT: LogicalButtons = LogicalButtons::new(true, false, false);

    #[test]
    fn test_held_button_presses_once() {
        let mut emitter = EventEmitter::new();
        let mut sink = RecordingSink::default();
        let mut console = String::new();

        for _ in 0..50 {
            emitter.emit_buttons(LEFT, &mut sink, &mut console);
        }
        assert_eq!(sink.events, [HostEvent::Press(MouseButton::Left)]);

        emitter.emit_buttons(LogicalButtons::RELEASED, &mut sink, &mut console);
        emitter.emit_buttons(LogicalButtons::RELEASED, &mut sink, &mut console);
        assert_eq!(sink.releases(MouseButton::Left), 1);
        assert_eq!(console, "press left\nrelease left\n");
    }

    #[test]
    fn test_disabled_echoes_but_sends_nothing() {
        let mut emitter = EventEmitter::new();
        let mut sink = RecordingSink::default();
        let mut console = String::new();

        emitter.set_enabled(false, &mut sink, &mut console);
        emitter.emit_buttons(LEFT, &mut sink, &mut console);
        let sent = emitter.emit_motion(
            MotionEvent {
                delta: 3,
                axis: Axis::X,
            },
            &mut sink,
            &mut console,
        );

        assert!(!sent);
        assert!(sink.events.is_empty());
        assert!(console.contains("press left"));
        assert!(!console.contains("move"));
    }

    #[test]
    fn test_disable_releases_host_buttons() {
        let mut emitter = EventEmitter::new();
        let mut sink = RecordingSink::default();
        let mut console = String::new();

        emitter.emit_buttons(LogicalButtons::new(true, true, false), &mut sink, &mut console);
        assert!(emitter.set_enabled(false, &mut sink, &mut console));
        assert!(!emitter.set_enabled(false, &mut sink, &mut console));

        assert_eq!(sink.buttons, 0);
        assert_eq!(sink.releases(MouseButton::Left), 1);
        assert_eq!(sink.releases(MouseButton::Right), 1);
        assert_eq!(sink.releases(MouseButton::Middle), 0);
    }

    #[test]
    fn test_enable_repeats_held_press() {
        let mut emitter = EventEmitter::new();
        let mut sink = RecordingSink::default();
        let mut console = String::new();

        emitter.set_enabled(false, &mut sink, &mut console);
        emitter.emit_buttons(LEFT, &mut sink, &mut console);
        emitter.set_enabled(true, &mut sink, &mut console);
        emitter.emit_buttons(LEFT, &mut sink, &mut console);

        assert_eq!(sink.events, [HostEvent::Press(MouseButton::Left)]);
    }

    #[test]
    fn test_release_all_clears_baseline() {
        let mut emitter = EventEmitter::new();
        let mut sink = RecordingSink::default();
        let mut console = String::new();

        emitter.emit_buttons(LogicalButtons::new(false, true, true), &mut sink, &mut console);
        emitter.release_all(&mut sink, &mut console);
        assert_eq!(sink.buttons, 0);
        assert_eq!(emitter.baseline(), LogicalButtons::RELEASED);
    }

    #[test]
    fn test_motion_components() {
        let mut emitter = EventEmitter::new();
        let mut sink = RecordingSink::default();
        let mut console = String::new();

        emitter.emit_motion(
            MotionEvent {
                delta: -7,
                axis: Axis::Y,
            },
            &mut sink,
            &mut console,
        );
        assert_eq!(sink.events, [HostEvent::Move(0, -7)]);
        assert_eq!(console, "move y -7\n");
    }

    #[test]
    fn test_sink_failure_keeps_state() {
        let mut emitter = EventEmitter::new();
        let mut sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let mut console = String::new();

        assert_eq!(emitter.emit_buttons(LEFT, &mut sink, &mut console), 1);
        assert_eq!(emitter.baseline(), LEFT);
        // no repeat on the next tick even though the host missed it
        assert_eq!(emitter.emit_buttons(LEFT, &mut sink, &mut console), 0);
    }
}
