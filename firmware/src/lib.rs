//! Rotary encoder and pedal USB mouse for RP2040.
//!
//! This crate provides the embedded side of the spinner mouse: encoder edge
//! tracking, the USB HID mouse and the UART console. All decisions are made
//! by [`spinner_core`]; this crate only moves bytes and pin levels.
//!
//! | Function | Pin |
//! |----------|-----|
//! | UART0 TX / RX | GPIO0 / GPIO1 |
//! | Encoder A / B | GPIO2 / GPIO3 |
//! | Button A / B | GPIO4 / GPIO5 |
//! | External button (pedal) | GPIO6 |
//! | Pedal jack sense | GPIO7 |
//! | Axis switch (low = Y) | GPIO8 |
//! | Disable switch (low = events off) | GPIO9 |
//! | Status LED | GPIO25 |
//! | Speed dial | GPIO26 (ADC0) |

#![no_std]

// Re-export core types for convenience
pub use spinner_core::{
    boot, config, speed_dial_from_adc12, ActiveLow, BootOutcome, Command, CommandOutcome,
    Configuration, EncoderPosition, Engine, InputReader, InputSnapshot, MouseButton, OutputError,
    PointerSink, RelativeMouse, TickPacer,
};

pub mod console;
pub mod encoder;
pub mod usb_output;

pub use console::{CommandQueue, LineQueue, SerialConsole};
pub use usb_output::{
    configure_usb_hid, forward_reports, hid_mouse, HidMouse, MouseWriter, QueueSender, ReportQueue,
};
