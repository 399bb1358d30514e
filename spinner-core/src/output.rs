//! Pointer sink trait and error types.

use crate::buttons::MouseButton;

/// Error type for pointer output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// USB/communication I/O error.
    Io,
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
    /// Report dropped (e.g., report queue full).
    Dropped,
}

/// The host-facing pointing device.
///
/// This trait abstracts the destination for mouse events so the engine can
/// run against USB HID on the device and against a recorder in tests.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait PointerSink {
    /// Move the pointer by a relative amount.
    fn move_by(&mut self, dx: i8, dy: i8) -> Result<(), OutputError>;

    /// Press a button. The host keeps it down until [`release`](Self::release).
    fn press(&mut self, button: MouseButton) -> Result<(), OutputError>;

    /// Release a button.
    fn release(&mut self, button: MouseButton) -> Result<(), OutputError>;

    /// Whether the host currently sees `button` as pressed.
    fn is_pressed(&self, button: MouseButton) -> bool;

    /// Deliver anything an earlier call failed to get through.
    ///
    /// Called once at the end of every tick.
    fn flush(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Transport for whole relative mouse reports.
pub trait ReportSender {
    /// Hand one report to the host side without waiting.
    fn try_send(&mut self, buttons: u8, dx: i8, dy: i8) -> Result<(), OutputError>;
}

/// [`PointerSink`] for report-based mice.
///
/// Every report carries the full button bits, so after a failed send the next
/// successful one repairs the host's view. When nothing else would be sent,
/// [`flush`](PointerSink::flush) re-sends the current buttons.
#[derive(Debug)]
pub struct RelativeMouse<T> {
    sender: T,
    buttons: u8,
    unsent: bool,
}

impl<T: ReportSender> RelativeMouse<T> {
    pub const fn new(sender: T) -> Self {
        Self {
            sender,
            buttons: 0,
            unsent: false,
        }
    }

    fn send(&mut self, dx: i8, dy: i8) -> Result<(), OutputError> {
        let result = self.sender.try_send(self.buttons, dx, dy);
        self.unsent = result.is_err();
        result
    }
}

impl<T: ReportSender> PointerSink for RelativeMouse<T> {
    fn move_by(&mut self, dx: i8, dy: i8) -> Result<(), OutputError> {
        self.send(dx, dy)
    }

    fn press(&mut self, button: MouseButton) -> Result<(), OutputError> {
        self.buttons |= button.mask();
        self.send(0, 0)
    }

    fn release(&mut self, button: MouseButton) -> Result<(), OutputError> {
        self.buttons &= !button.mask();
        self.send(0, 0)
    }

    fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons & button.mask() != 0
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        if !self.unsent {
            return Ok(());
        }
        debug!("re-sending buttons {}", self.buttons);
        self.send(0, 0)
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockSender;
    use super::*;

    #[test]
    fn test_reports_carry_buttons() {
        let sender = MockSender::default();
        let mut mouse = RelativeMouse::new(sender.clone());
        mouse.press(MouseButton::Right).unwrap();
        mouse.move_by(3, 0).unwrap();
        mouse.release(MouseButton::Right).unwrap();
        assert_eq!(*sender.reports.borrow(), [(0b010, 0, 0), (0b010, 3, 0), (0, 0, 0)]);
    }

    #[test]
    fn test_flush_resends_dropped_release() {
        let sender = MockSender::default();
        let mut mouse = RelativeMouse::new(sender.clone());
        mouse.press(MouseButton::Left).unwrap();

        sender.full.set(true);
        assert_eq!(mouse.release(MouseButton::Left), Err(OutputError::Dropped));
        assert!(!mouse.is_pressed(MouseButton::Left));
        // still full: keeps trying on later flushes
        assert_eq!(mouse.flush(), Err(OutputError::Dropped));

        sender.full.set(false);
        mouse.flush().unwrap();
        assert_eq!(*sender.reports.borrow(), [(1, 0, 0), (0, 0, 0)]);

        // nothing pending, nothing sent
        mouse.flush().unwrap();
        assert_eq!(sender.reports.borrow().len(), 2);
    }

    #[test]
    fn test_later_report_clears_pending() {
        let sender = MockSender::default();
        let mut mouse = RelativeMouse::new(sender.clone());
        sender.full.set(true);
        let _ = mouse.press(MouseButton::Middle);
        sender.full.set(false);
        mouse.move_by(0, -2).unwrap();
        mouse.flush().unwrap();
        assert_eq!(*sender.reports.borrow(), [(0b100, 0, -2)]);
    }
}
