#![no_std]
#![no_main]

use defmt::{debug, info, warn};
use defmt_rtt as _;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{DMA_CH0, DMA_CH1, UART0, USB};
use embassy_rp::uart::{Async, Config as UartConfig, Uart, UartRx, UartTx};
use embassy_rp::usb::Driver;
use embassy_sync::channel::Channel;
use embassy_time::{Delay, Instant, Timer};
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig};
use static_cell::StaticCell;
use spinner_mouse::config::ACK_BLINK_MS;
use spinner_mouse::{
    boot, configure_usb_hid, console, encoder, forward_reports, hid_mouse, speed_dial_from_adc12,
    ActiveLow, CommandQueue, EncoderPosition, Engine, InputReader, LineQueue, MouseWriter,
    ReportQueue, SerialConsole, TickPacer,
};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => embassy_rp::adc::InterruptHandler;
    UART0_IRQ => embassy_rp::uart::InterruptHandler<UART0>;
    DMA_IRQ_0 => embassy_rp::dma::InterruptHandler<DMA_CH0>, embassy_rp::dma::InterruptHandler<DMA_CH1>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// Net encoder pulses since the main loop last looked.
static ENCODER_POSITION: EncoderPosition = EncoderPosition::new();

static MOUSE_REPORTS: ReportQueue = Channel::new();
static CONSOLE_LINES: LineQueue = Channel::new();
static COMMAND_BYTES: CommandQueue = Channel::new();

/// Runs the encoder task above everything in thread mode.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Spinner mouse starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Encoder on the high-priority executor ---
    let encoder_a = Input::new(p.PIN_2, Pull::Up);
    let encoder_b = Input::new(p.PIN_3, Pull::Up);

    interrupt::SWI_IRQ_1.set_priority(Priority::P1);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(encoder_task(encoder_a, encoder_b).unwrap());

    // --- UART console ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = 115_200;

    let uart = Uart::new(
        p.UART0,
        p.PIN_0, // TX
        p.PIN_1, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("Spinner");
    usb_config.product = Some("Spinner Mouse");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    let hid_state = HID_STATE.init(State::new());
    let hid_writer = configure_usb_hid(&mut builder, hid_state);

    let usb_device = builder.build();

    // Plumbing runs during boot so the host can enumerate meanwhile
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(hid_task(hid_writer).unwrap());
    spawner.spawn(uart_tx_task(tx).unwrap());
    spawner.spawn(uart_rx_task(rx).unwrap());

    // --- Buttons, switches, dial, LED ---
    let mut inputs = InputReader {
        button_a: ActiveLow::new(Input::new(p.PIN_4, Pull::Up)),
        button_b: ActiveLow::new(Input::new(p.PIN_5, Pull::Up)),
        button_ext: ActiveLow::new(Input::new(p.PIN_6, Pull::Up)),
        jack_sense: ActiveLow::new(Input::new(p.PIN_7, Pull::Up)),
        axis_switch: ActiveLow::new(Input::new(p.PIN_8, Pull::Up)),
        disable_switch: ActiveLow::new(Input::new(p.PIN_9, Pull::Up)),
    };

    let mut adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let mut dial = AdcChannel::new_pin(p.PIN_26, Pull::None);

    let mut led = Output::new(p.PIN_25, Level::Low);

    // --- Boot ---
    let boot_started_ms = Instant::now().as_millis() as u32;
    let outcome = boot::run(&mut inputs.button_a, &mut led, &mut Delay, boot_started_ms).await;
    if outcome.primary_held {
        warn!("Primary button still held, ignoring it until released");
    }

    let mut console = SerialConsole::new(&CONSOLE_LINES);
    let mut mouse = hid_mouse(&MOUSE_REPORTS);
    let mut engine = Engine::from_boot(outcome);
    engine.announce(&mut console);

    // Motion made during boot is not a gesture
    ENCODER_POSITION.write(0);

    info!("Spinner mouse initialized, polling inputs...");

    let mut pacer = TickPacer::default();
    let mut speed_dial = 1;

    loop {
        let started = Instant::now();

        match adc.read(&mut dial).await {
            Ok(raw) => speed_dial = speed_dial_from_adc12(raw),
            Err(e) => warn!("Speed dial read failed: {:?}", e),
        }
        let snapshot = inputs.sample(speed_dial);

        while let Ok(byte) = COMMAND_BYTES.try_receive() {
            if engine.handle_byte(byte, &mut console).blink {
                led.set_high();
                Timer::after_millis(ACK_BLINK_MS.into()).await;
                led.set_low();
            }
        }

        let report = engine.tick(&snapshot, &ENCODER_POSITION, &mut mouse, &mut console);
        if report.transitions > 0 {
            debug!("Tick: {:?}", report);
        }

        let remaining = pacer.remaining_us(started.as_micros(), Instant::now().as_micros());
        if remaining > 0 {
            Timer::after_micros(remaining).await;
        } else {
            debug!("Tick overran the period ({} overruns)", pacer.overruns());
        }
    }
}

/// Encoder task - decodes quadrature edges into the shared position.
#[embassy_executor::task]
async fn encoder_task(mut a: Input<'static>, mut b: Input<'static>) {
    encoder::track(&mut a, &mut b, &ENCODER_POSITION).await
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// HID task - forwards queued mouse reports to the host.
#[embassy_executor::task]
async fn hid_task(mut writer: MouseWriter<'static>) {
    forward_reports(&mut writer, &MOUSE_REPORTS).await
}

/// Console output task - writes queued lines to the UART.
#[embassy_executor::task]
async fn uart_tx_task(mut tx: UartTx<'static, Async>) {
    console::transmit(&mut tx, &CONSOLE_LINES).await
}

/// Command input task - queues received bytes for the main loop.
#[embassy_executor::task]
async fn uart_rx_task(mut rx: UartRx<'static, Async>) {
    console::receive(&mut rx, &COMMAND_BYTES).await
}
