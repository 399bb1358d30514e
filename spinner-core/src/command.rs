//! Single-byte serial command interpreter.
//!
//! One byte is one command, case-insensitive, no framing:
//!
//! | byte | effect |
//! |------|--------|
//! | `s`  | slow speed ([`SLOW_PCT`]) |
//! | `n`  | normal speed (100%) |
//! | `r`  | boot default speed, buttons unswapped |
//! | `c`  | print speed and swap state |
//! | `w`  | toggle button swap |
//! | `+`  | speed up by [`PCT_ADJUST`] |
//! | `-`  | slow down by [`PCT_ADJUST`] |
//! | `h`  | print this list |
//!
//! Line endings and spaces are skipped; anything else is answered with `?`.
//! The host-side launcher scripts send `r` and `s`, so those must not change.

use core::fmt::Write;

use crate::config::{Configuration, NORMAL_PCT, PCT_ADJUST, SLOW_PCT};

/// A decoded serial command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Slow,
    Normal,
    Restore,
    Current,
    Swap,
    Faster,
    Slower,
    Help,
}

/// Error type for command decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Byte is not a known command.
    Unknown(u8),
}

/// Result of running one command.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub struct CommandOutcome {
    /// The configuration changed and the LED should acknowledge it.
    pub blink: bool,
}

impl Command {
    /// Decode one byte.
    ///
    /// Returns `Ok(None)` for bytes that are skipped silently (CR, LF, space).
    pub fn from_byte(byte: u8) -> Result<Option<Self>, CommandError> {
        let command = match byte.to_ascii_lowercase() {
            b's' => Command::Slow,
            b'n' => Command::Normal,
            b'r' => Command::Restore,
            b'c' => Command::Current,
            b'w' => Command::Swap,
            b'+' => Command::Faster,
            b'-' => Command::Slower,
            b'h' => Command::Help,
            b'\r' | b'\n' | b' ' => return Ok(None),
            _ => return Err(CommandError::Unknown(byte)),
        };
        Ok(Some(command))
    }

    /// Whether this command changes the configuration.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        !matches!(self, Command::Current | Command::Help)
    }

    /// Apply the command and print its response.
    pub fn apply<W: Write>(self, config: &mut Configuration, console: &mut W) -> CommandOutcome {
        match self {
            Command::Slow => config.set_speed_percent(SLOW_PCT),
            Command::Normal => config.set_speed_percent(NORMAL_PCT),
            Command::Restore => config.restore_defaults(),
            Command::Swap => {
                config.toggle_swap();
            }
            Command::Faster => config.adjust_speed(PCT_ADJUST as i16),
            Command::Slower => config.adjust_speed(-(PCT_ADJUST as i16)),
            Command::Current => {}
            Command::Help => {
                print_help(console);
                return CommandOutcome::default();
            }
        }

        print_status(config, console);
        CommandOutcome {
            blink: self.is_mutating(),
        }
    }
}

/// Decode and run one byte, answering `?` when it is not a command.
pub fn interpret<W: Write>(byte: u8, config: &mut Configuration, console: &mut W) -> CommandOutcome {
    match Command::from_byte(byte) {
        Ok(Some(command)) => {
            debug!("serial command {:?}", command);
            command.apply(config, console)
        }
        Ok(None) => CommandOutcome::default(),
        Err(CommandError::Unknown(b)) => {
            debug!("unknown serial command byte {}", b);
            let _ = writeln!(console, "?");
            CommandOutcome::default()
        }
    }
}

/// Print the speed mode, percentage and swap state.
pub fn print_status<W: Write>(config: &Configuration, console: &mut W) {
    let _ = writeln!(
        console,
        "speed {} {}%",
        config.speed_mode_name(),
        config.speed_percent
    );
    let _ = writeln!(
        console,
        "swap {}",
        if config.buttons_swapped { "on" } else { "off" }
    );
}

fn print_help<W: Write>(console: &mut W) {
    let _ = writeln!(console, "s slow  n normal  r restore  c current");
    let _ = writeln!(console, "w swap  + faster  - slower  h help");
}
