//! UART diagnostic console and command input.
//!
//! The engine writes text through [`SerialConsole`], which cuts it into
//! lines and queues them for the TX task. The RX task queues every received
//! byte for the main loop. Neither side ever waits on the UART, so a stalled
//! terminal costs lines, not ticks.

use core::fmt;

use embassy_rp::uart::{Async, UartRx, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

/// Longest console line; longer lines are cut.
pub const LINE_LEN: usize = 64;

/// Lines buffered for the TX task.
pub const LINE_QUEUE_LEN: usize = 32;

/// Command bytes buffered for the main loop.
pub const COMMAND_QUEUE_LEN: usize = 32;

pub type ConsoleLine = String<LINE_LEN>;
pub type LineQueue = Channel<CriticalSectionRawMutex, ConsoleLine, LINE_QUEUE_LEN>;
pub type CommandQueue = Channel<CriticalSectionRawMutex, u8, COMMAND_QUEUE_LEN>;

/// Line-buffered writer onto the console queue.
pub struct SerialConsole<'a> {
    line: ConsoleLine,
    lines: &'a LineQueue,
    dropped: u32,
}

impl<'a> SerialConsole<'a> {
    pub fn new(lines: &'a LineQueue) -> Self {
        Self {
            line: String::new(),
            lines,
            dropped: 0,
        }
    }

    fn end_line(&mut self) {
        let line = core::mem::take(&mut self.line);
        if self.lines.try_send(line).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            defmt::warn!("console queue full, {} lines dropped", self.dropped);
        }
    }
}

impl fmt::Write for SerialConsole<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if c == '\n' {
                self.end_line();
            } else {
                // overlong lines are truncated, not split
                let _ = self.line.push(c);
            }
        }
        Ok(())
    }
}

/// Write queued lines to the UART, `\r\n` terminated.
pub async fn transmit(tx: &mut UartTx<'_, Async>, lines: &LineQueue) -> ! {
    loop {
        let line = lines.receive().await;
        let result = match tx.write(line.as_bytes()).await {
            Ok(()) => tx.write(b"\r\n").await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            defmt::error!("UART write failed: {:?}", e);
        }
    }
}

/// Queue every received byte as a command byte.
pub async fn receive(rx: &mut UartRx<'_, Async>, commands: &CommandQueue) -> ! {
    let mut buf = [0u8; 1];
    loop {
        match rx.read(&mut buf).await {
            Ok(()) => {
                if commands.try_send(buf[0]).is_err() {
                    defmt::warn!("command queue full, dropped byte {=u8:#x}", buf[0]);
                }
            }
            Err(e) => defmt::error!("UART read failed: {:?}", e),
        }
    }
}
