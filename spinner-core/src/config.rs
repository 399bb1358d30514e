//! Runtime configuration and the tunables it is built from.

/// Speed percentage in normal mode.
pub const NORMAL_PCT: u8 = 100;

/// Speed percentage in slow mode (boot latch or `s` command).
pub const SLOW_PCT: u8 = 50;

/// Step applied by the `+` and `-` commands.
pub const PCT_ADJUST: u8 = 10;

/// Lowest speed percentage reachable through `-`.
pub const MIN_PCT: u8 = 1;

/// Highest value of the speed dial after mapping.
pub const MAX_SPEED: u8 = 10;

/// How long the primary button must stay down at boot to latch slow mode.
pub const BOOT_DWELL_MS: u32 = 2000;

/// Minimum time between power-on and the first event, so the host can enumerate.
pub const MIN_BOOT_DELAY_MS: u32 = 3000;

/// LED toggle period while waiting out the boot delay in slow mode.
pub const BOOT_BLINK_MS: u32 = 250;

/// LED on-time acknowledging a mutating serial command.
pub const ACK_BLINK_MS: u32 = 100;

/// Main loop tick period (250 Hz).
pub const TICK_US: u64 = 4_000;

/// Which pointer axis the encoder drives.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    #[default]
    X,
    Y,
}

impl Axis {
    /// Lowercase name used in console output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// Wiring of the pedal switch plugged into the jack.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PedalPolarity {
    NormallyOpen,
    NormallyClosed,
    /// No pedal connected, or detection still pending.
    #[default]
    Unknown,
}

impl PedalPolarity {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PedalPolarity::NormallyOpen => "normally-open",
            PedalPolarity::NormallyClosed => "normally-closed",
            PedalPolarity::Unknown => "unknown",
        }
    }
}

/// Speed mode latched at boot.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedMode {
    #[default]
    Normal,
    Slow,
}

impl SpeedMode {
    /// Speed percentage this mode starts with.
    #[must_use]
    pub const fn percent(self) -> u8 {
        match self {
            SpeedMode::Normal => NORMAL_PCT,
            SpeedMode::Slow => SLOW_PCT,
        }
    }
}

/// Mutable session settings.
///
/// Built once by the boot sequence, then changed by serial commands. `axis`
/// and `events_enabled` mirror the live switch positions each tick and
/// `pedal_polarity` mirrors the pedal tracker; nothing here survives a reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    pub speed_percent: u8,
    pub default_speed_percent: u8,
    pub axis: Axis,
    pub events_enabled: bool,
    pub buttons_swapped: bool,
    pub pedal_polarity: PedalPolarity,
}

impl Configuration {
    /// Create the configuration for the given boot mode.
    #[must_use]
    pub const fn new(mode: SpeedMode) -> Self {
        Self {
            speed_percent: mode.percent(),
            default_speed_percent: mode.percent(),
            axis: Axis::X,
            events_enabled: true,
            buttons_swapped: false,
            pedal_polarity: PedalPolarity::Unknown,
        }
    }

    /// Set the speed percentage, raising zero to [`MIN_PCT`].
    #[inline]
    pub fn set_speed_percent(&mut self, percent: u8) {
        self.speed_percent = percent.max(MIN_PCT);
    }

    /// Move the speed percentage by `delta`, clamped to `MIN_PCT..=255`.
    pub fn adjust_speed(&mut self, delta: i16) {
        let adjusted = (self.speed_percent as i16 + delta).clamp(MIN_PCT as i16, u8::MAX as i16);
        self.speed_percent = adjusted as u8;
    }

    /// Return to the boot-captured speed and unswapped buttons.
    pub fn restore_defaults(&mut self) {
        self.speed_percent = self.default_speed_percent;
        self.buttons_swapped = false;
    }

    /// Flip the button swap flag, returning the new value.
    pub fn toggle_swap(&mut self) -> bool {
        self.buttons_swapped = !self.buttons_swapped;
        self.buttons_swapped
    }

    /// Name of the current speed setting.
    #[must_use]
    pub const fn speed_mode_name(&self) -> &'static str {
        match self.speed_percent {
            SLOW_PCT => "slow",
            NORMAL_PCT => "normal",
            _ => "custom",
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(SpeedMode::Normal)
    }
}
