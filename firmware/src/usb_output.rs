//! USB HID mouse output implementation.

use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::class::hid::{HidBootProtocol, HidSubclass, HidWriter, State};
use embassy_usb::Builder;
use spinner_core::{OutputError, RelativeMouse, ReportSender};
use usbd_hid::descriptor::{MouseReport, SerializedDescriptor};

/// Size of the serialized mouse report: buttons, x, y, wheel, pan.
pub const REPORT_SIZE: usize = 5;

/// Reports buffered between the main loop and the USB writer.
pub const REPORT_QUEUE_LEN: usize = 16;

/// Queue of mouse reports waiting for the USB writer task.
pub type ReportQueue = Channel<CriticalSectionRawMutex, MouseReport, REPORT_QUEUE_LEN>;

/// HID writer for the mouse interface.
pub type MouseWriter<'d> = HidWriter<'d, Driver<'d, USB>, REPORT_SIZE>;

/// Serialize a report in the field order of the `MouseReport` descriptor.
///
/// The first three bytes match the boot mouse layout.
#[must_use]
pub fn report_bytes(report: &MouseReport) -> [u8; REPORT_SIZE] {
    [
        report.buttons,
        report.x as u8,
        report.y as u8,
        report.wheel as u8,
        report.pan as u8,
    ]
}

/// Sender side of the report queue.
pub struct QueueSender<'a> {
    reports: &'a ReportQueue,
}

impl<'a> QueueSender<'a> {
    pub fn new(reports: &'a ReportQueue) -> Self {
        Self { reports }
    }
}

impl ReportSender for QueueSender<'_> {
    fn try_send(&mut self, buttons: u8, dx: i8, dy: i8) -> Result<(), OutputError> {
        let report = MouseReport {
            buttons,
            x: dx,
            y: dy,
            wheel: 0,
            pan: 0,
        };
        self.reports
            .try_send(report)
            .map_err(|_| OutputError::Dropped)
    }
}

/// USB HID mouse as seen by the engine.
///
/// Every call turns into one report on the queue. A report lost to a full
/// queue is re-sent at the end of the tick, so the host never keeps a
/// button the engine already released.
pub type HidMouse<'a> = RelativeMouse<QueueSender<'a>>;

/// Create a mouse that queues its reports on `reports`.
pub fn hid_mouse(reports: &ReportQueue) -> HidMouse<'_> {
    RelativeMouse::new(QueueSender::new(reports))
}

/// Forward queued reports to the host, forever.
///
/// Waits for enumeration first; reports queued before that are sent in order
/// once the host is listening.
pub async fn forward_reports(writer: &mut MouseWriter<'_>, reports: &ReportQueue) -> ! {
    writer.ready().await;
    defmt::info!("USB HID mouse ready");

    loop {
        let report = reports.receive().await;
        if let Err(e) = writer.write(&report_bytes(&report)).await {
            defmt::error!("HID write failed: {:?}", e);
        }
    }
}

/// Configure the USB HID mouse class in the USB builder.
///
/// Returns the HID writer for use by the application.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
) -> MouseWriter<'d> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: MouseReport::desc(),
        request_handler: None,
        poll_ms: 1,
        max_packet_size: 8,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}
