//! Logging macros that forward to `defmt` or `log`, whichever feature is on.
//!
//! With neither feature enabled the macros compile to nothing but still
//! borrow their arguments, so callers don't trip unused-variable lints.

#![macro_use]
#![allow(unused_macros)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("You may not enable both `defmt` and `log` features.");

macro_rules! log_impl {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::$level!($s $(, $x)*);
            #[cfg(feature = "log")]
            ::log::$level!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt", feature = "log")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_impl!(trace, $s $(, $x)*)
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_impl!(debug, $s $(, $x)*)
    };
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_impl!(info, $s $(, $x)*)
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_impl!(warn, $s $(, $x)*)
    };
}

macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        log_impl!(error, $s $(, $x)*)
    };
}
