//! Per-tick processing: inputs in, host events and console lines out.

use core::fmt::Write;

use crate::boot::BootOutcome;
use crate::buttons::{remap, LogicalButtons, PedalChange, PedalTracker};
use crate::command::{interpret, print_status, CommandOutcome};
use crate::config::Configuration;
use crate::emitter::EventEmitter;
use crate::input::InputSnapshot;
use crate::motion::MotionEvent;
use crate::output::PointerSink;
use crate::quadrature::EncoderPosition;

/// What one tick produced, mainly for tests and trace logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub buttons: LogicalButtons,
    pub transitions: u8,
    pub motion: Option<MotionEvent>,
    pub pedal: PedalChange,
}

/// The main loop's state: configuration, pedal latch and emitter.
///
/// The engine owns no hardware. The caller samples inputs, hands in the
/// shared encoder accumulator and the output sinks, and paces the ticks.
#[derive(Debug)]
pub struct Engine {
    config: Configuration,
    pedal: PedalTracker,
    emitter: EventEmitter,
    /// Button A is still down from boot and must be let go before it counts.
    primary_latched: bool,
}

impl Engine {
    /// Create an engine with the configuration produced by the boot sequence.
    #[must_use]
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            pedal: PedalTracker::new(),
            emitter: EventEmitter::new(),
            primary_latched: false,
        }
    }

    /// Create an engine from the boot result.
    ///
    /// If the primary button was never released during boot, it is ignored
    /// until it reads released once, so the boot press never clicks.
    #[must_use]
    pub fn from_boot(outcome: BootOutcome) -> Self {
        Self {
            primary_latched: outcome.primary_held,
            ..Self::new(outcome.config)
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Print the start-up banner and current settings.
    pub fn announce<W: Write>(&self, console: &mut W) {
        let _ = writeln!(console, "spinner mouse ready");
        print_status(&self.config, console);
    }

    /// Run one serial command byte against the configuration.
    pub fn handle_byte<W: Write>(&mut self, byte: u8, console: &mut W) -> CommandOutcome {
        interpret(byte, &mut self.config, console)
    }

    /// Process one tick.
    ///
    /// The encoder accumulator is always drained, so motion made while host
    /// events are off is discarded rather than delivered later.
    pub fn tick<S, W>(
        &mut self,
        snapshot: &InputSnapshot,
        position: &EncoderPosition,
        sink: &mut S,
        console: &mut W,
    ) -> TickReport
    where
        S: PointerSink,
        W: Write,
    {
        if snapshot.axis != self.config.axis {
            self.config.axis = snapshot.axis;
            let _ = writeln!(console, "axis {}", snapshot.axis.name());
        }

        self.config.events_enabled = snapshot.events_enabled;
        if self
            .emitter
            .set_enabled(snapshot.events_enabled, sink, console)
        {
            info!("pointer events enabled: {}", snapshot.events_enabled);
            position.write(0);
        }

        let pedal = self.update_pedal(snapshot, sink, console);

        if self.primary_latched && !snapshot.button_a {
            debug!("primary button released after boot");
            self.primary_latched = false;
        }
        let button_a = snapshot.button_a && !self.primary_latched;

        let state = self.pedal.state();
        let buttons = remap(
            state.jack_present(),
            self.config.buttons_swapped,
            state.polarity(),
            button_a,
            snapshot.button_b,
            snapshot.button_ext,
        );
        let transitions = self.emitter.emit_buttons(buttons, sink, console);

        let raw_delta = position.take();
        let motion = match MotionEvent::from_raw(
            raw_delta,
            snapshot.speed_dial,
            self.config.speed_percent,
            self.config.axis,
        ) {
            Some(event) if self.emitter.emit_motion(event, sink, console) => Some(event),
            _ => None,
        };

        // retry a report the host never got, if any
        if let Err(e) = sink.flush() {
            warn!("pointer flush failed: {:?}", e);
        }

        TickReport {
            buttons,
            transitions,
            motion,
            pedal,
        }
    }

    fn update_pedal<S, W>(&mut self, snapshot: &InputSnapshot, sink: &mut S, console: &mut W) -> PedalChange
    where
        S: PointerSink,
        W: Write,
    {
        let change = self
            .pedal
            .update(snapshot.jack_present, snapshot.button_ext);

        match change {
            PedalChange::None => {}
            PedalChange::Inserted => {
                let _ = writeln!(console, "pedal connected");
                self.emitter.release_all(sink, console);
            }
            PedalChange::Removed => {
                let _ = writeln!(console, "pedal disconnected");
                self.emitter.release_all(sink, console);
            }
            PedalChange::Detected(polarity) => {
                info!("pedal polarity {:?}", polarity);
                let _ = writeln!(console, "pedal {}", polarity.name());
            }
        }

        self.config.pedal_polarity = self.pedal.state().polarity();
        change
    }
}
