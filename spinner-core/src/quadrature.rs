//! Quadrature decoding and the shared encoder accumulator.
//!
//! [`QuadratureDecoder`] runs in the edge interrupt context and turns pin
//! levels into single steps. [`EncoderPosition`] is the only state shared
//! between that context and the main loop.

use portable_atomic::{AtomicI32, Ordering};

/// Step for each `(previous << 2) | current` transition, where a state is
/// `(a << 1) | b`. Forward rotation walks `00 -> 10 -> 11 -> 01 -> 00`.
/// Unchanged samples and double jumps (both lines flipping together) are 0.
const TRANSITIONS: [i8; 16] = [
    // previous = 00
    0, -1, 1, 0, //
    // previous = 01
    1, 0, 0, -1, //
    // previous = 10
    -1, 0, 0, 1, //
    // previous = 11
    0, 1, -1, 0,
];

#[inline]
const fn state_of(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | b as u8
}

/// Two-bit quadrature state machine.
///
/// Every call to [`update`](Self::update) latches the sampled state, so an
/// invalid transition is dropped and decoding resumes from wherever the
/// lines actually are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadratureDecoder {
    state: u8,
}

impl QuadratureDecoder {
    /// Create a decoder seeded with the current line levels.
    #[must_use]
    pub const fn new(a: bool, b: bool) -> Self {
        Self {
            state: state_of(a, b),
        }
    }

    /// Feed the current line levels and return the step they imply.
    ///
    /// Returns `1` for forward, `-1` for backward and `0` for no change or
    /// an invalid transition.
    #[inline]
    pub fn update(&mut self, a: bool, b: bool) -> i8 {
        let current = state_of(a, b);
        let step = TRANSITIONS[((self.state << 2) | current) as usize];
        self.state = current;
        step
    }
}

/// Net pulse count shared between the edge context and the main loop.
///
/// All operations are single atomic instructions (or short critical
/// sections on cores without compare-and-swap), so the edge context never
/// waits on the main loop and [`take`](Self::take) never loses a pulse.
#[derive(Debug, Default)]
pub struct EncoderPosition {
    count: AtomicI32,
}

impl EncoderPosition {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: AtomicI32::new(0),
        }
    }

    /// Accumulate decoded steps.
    #[inline]
    pub fn add(&self, steps: i32) {
        self.count.fetch_add(steps, Ordering::Relaxed);
    }

    /// Current count without resetting it.
    #[inline]
    #[must_use]
    pub fn read(&self) -> i32 {
        self.count.load(Ordering::Acquire)
    }

    /// Overwrite the count, typically with zero after an enable transition.
    #[inline]
    pub fn write(&self, value: i32) {
        self.count.store(value, Ordering::Release);
    }

    /// Read the count and reset it to zero in one indivisible step.
    #[inline]
    #[must_use]
    pub fn take(&self) -> i32 {
        self.count.swap(0, Ordering::AcqRel)
    }
}
