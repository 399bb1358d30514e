//! Platform-agnostic spinner mouse logic.
//!
//! This crate turns the raw state of a quadrature encoder, up to three
//! buttons, a pedal jack and two mode switches into a relative mouse event
//! stream, and interprets the single-byte serial command channel. It has no
//! platform-specific dependencies and runs in `no_std` firmware as well as
//! on a host for testing.
//!
//! # Overview
//!
//! - [`quadrature`]: Gray-code decoder and shared accumulator ([`QuadratureDecoder`], [`EncoderPosition`])
//! - [`input`]: Active-low pin sampling and the speed dial ([`ActiveLow`], [`InputSnapshot`])
//! - [`config`]: Session settings and tunables ([`Configuration`])
//! - [`boot`]: Slow-mode latch and ready wait
//! - [`buttons`]: Physical to logical button mapping and the pedal latch ([`remap`], [`PedalTracker`])
//! - [`motion`]: Encoder delta scaling ([`scale`])
//! - [`output`]: Host pointer trait and report-based mouse ([`PointerSink`], [`RelativeMouse`])
//! - [`emitter`]: Edge-triggered event emission ([`EventEmitter`])
//! - [`command`]: Serial command interpreter ([`Command`])
//! - [`engine`]: One tick of the main loop ([`Engine`])
//! - [`pacing`]: Fixed-interval tick pacing ([`TickPacer`])
//!
//! # Example
//!
//! ```rust
//! use spinner_core::{remap, LogicalButtons, PedalPolarity};
//!
//! // No pedal, buttons not swapped: button A is the left button.
//! let buttons = remap(false, false, PedalPolarity::Unknown, true, false, false);
//! assert_eq!(buttons, LogicalButtons::new(true, false, false));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log and derive `Format` through defmt (for embedded logging)
//! - **`log`**: Log through the `log` facade instead
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// must come first so the logging macros are visible to the modules below
mod fmt;

pub mod boot;
pub mod buttons;
pub mod command;
pub mod config;
pub mod emitter;
pub mod engine;
pub mod input;
pub mod motion;
pub mod output;
pub mod pacing;
pub mod quadrature;

// Re-export main types at crate root
pub use boot::BootOutcome;
pub use buttons::{remap, LogicalButtons, MouseButton, PedalChange, PedalState, PedalTracker};
pub use command::{interpret, Command, CommandError, CommandOutcome};
pub use config::{Axis, Configuration, PedalPolarity, SpeedMode};
pub use emitter::EventEmitter;
pub use engine::{Engine, TickReport};
pub use input::{speed_dial_from_adc, speed_dial_from_adc12, ActiveLow, InputReader, InputSnapshot};
pub use motion::{scale, MotionEvent};
pub use output::{OutputError, PointerSink, RelativeMouse, ReportSender};
pub use pacing::TickPacer;
pub use quadrature::{EncoderPosition, QuadratureDecoder};
