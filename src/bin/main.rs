#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Duration as EmbassyDuration, Instant, Timer};
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Level, Output, OutputConfig},
    spi::master::Spi,
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig};
use log::{LevelFilter, info};
use skywave_core::app::{RadioApp, RadioConfig, TickResult};
use skywave_hal_esp32s3::{
    clock::{ClockHandle, SntpClock},
    network::{LinkHandle, WifiLink},
    platform::display::OledDisplay,
    render::{FrameRenderer, face::FaceRenderer},
    stream::{StreamControl, StreamHandle},
};
use ssd1309::FrameBuffer;
use static_cell::StaticCell;

#[path = "main/sntp.rs"]
mod sntp;
#[path = "main/stream.rs"]
mod stream;
#[path = "main/wifi.rs"]
mod wifi;

const DISPLAY_SPI_HZ: u32 = 8_000_000;
const TITLE: &str = "Skywave";
const STATION_URL: &str = "http://ice1.somafm.com/groovesalad-128-mp3";
const STATION_LABEL: &str = "SomaFM Groove Salad";
const TIME_SERVERS: &[&str] = &["0.pool.ntp.org", "1.pool.ntp.org", "2.pool.ntp.org"];
const UTC_OFFSET_MINUTES: i32 = 60;
const FATAL_BLINK_MS: u32 = 250;

const WIFI_SSID: &str = env!(
    "SKYWAVE_WIFI_SSID",
    "Set SKYWAVE_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "SKYWAVE_WIFI_PASSWORD",
    "Set SKYWAVE_WIFI_PASSWORD in your environment before building/flashing."
);

static LINK: LinkHandle = LinkHandle::new();
static CLOCK: ClockHandle = ClockHandle::new();
static STREAM: StreamHandle = StreamHandle::new();
static NET_RESOURCES: StaticCell<embassy_net::StackResources<6>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Display bring-up failed. Without a panel the rest of the UI-facing
/// machine is meaningless, so signal on the status LED forever instead
/// of running blind.
fn fatal_display_halt(status_led: &mut Output<'_>, delay: &mut Delay) -> ! {
    loop {
        status_led.toggle();
        delay.delay_millis(FATAL_BLINK_MS);
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: skywave starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Display wiring used by this board:
    // CLK=GPIO13, DI=GPIO14, CS=GPIO15, DC=GPIO2, RST=GPIO9, LED=GPIO21
    let dc = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let cs = Output::new(peripherals.GPIO15, Level::High, OutputConfig::default());
    let mut status_led = Output::new(peripherals.GPIO21, Level::Low, OutputConfig::default());

    let spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
        // SSD1309 uses CPOL=0, CPHA=0.
        .with_mode(esp_hal::spi::Mode::_0);

    let spi = Spi::new(peripherals.SPI2, spi_config)
        .unwrap()
        .with_sck(peripherals.GPIO13)
        .with_mosi(peripherals.GPIO14);

    let mut delay = Delay::new();

    let mut display = OledDisplay::new(spi, dc, rst, cs);
    esp_println::println!("display: init begin (CLK=13 DI=14 CS=15 DC=2 RST=9)");
    if display.initialize(&mut delay).is_err() {
        esp_println::println!("display: initialize failed; halting");
        fatal_display_halt(&mut status_led, &mut delay);
    }
    let mut frame = FrameBuffer::new();
    if display.flush_frame(&frame).is_err() {
        esp_println::println!("display: first flush failed; halting");
        fatal_display_halt(&mut status_led, &mut delay);
    }
    esp_println::println!("display: init ok");

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                loop {
                    Timer::after_secs(1).await;
                }
            }
        };

    let client_config = ClientConfig::default()
        .with_ssid(WIFI_SSID.into())
        .with_password(WIFI_PASSWORD.into());
    if let Err(err) = wifi_controller.set_config(&ModeConfig::Client(client_config)) {
        info!("wifi mode config failed: {:?}", err);
        loop {
            Timer::after_secs(1).await;
        }
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<6>::new()),
        0x7C41_99D2_0B5E_AA07,
    );

    let radio_config = RadioConfig {
        app_title: TITLE,
        network_label: WIFI_SSID,
        station_url: STATION_URL,
        station_label: STATION_LABEL,
        time_servers: TIME_SERVERS,
        utc_offset_minutes: UTC_OFFSET_MINUTES,
    };

    let loop_start = Instant::now();
    let mut app = RadioApp::new(
        WifiLink::new(&LINK),
        SntpClock::new(&CLOCK, || Instant::now().as_secs() as u32),
        StreamControl::new(&STREAM),
        radio_config,
    );
    let mut renderer = FaceRenderer::new();
    let mut display_fault_logged = false;

    info!("station={} url={}", STATION_LABEL, STATION_URL);
    info!(
        "time servers={:?} utc_offset_min={}",
        TIME_SERVERS, UTC_OFFSET_MINUTES
    );
    info!("wifi ssid={} (credentials from env)", WIFI_SSID);

    let net_future = net_runner.run();
    let wifi_future = wifi::connection_task(&mut wifi_controller, stack, &LINK);
    let sntp_future = sntp::sync_task(stack, &CLOCK);
    let stream_future = stream::reader_task(stack, &STREAM);
    let ui_future = async {
        let mut last_report = Instant::now();
        loop {
            let now_ms = loop_start.elapsed().as_millis();
            if app.tick(now_ms) == TickResult::RenderRequested {
                app.with_screen(now_ms, |screen| renderer.render(screen, &mut frame));
                if display.flush_frame(&frame).is_err() && !display_fault_logged {
                    esp_println::println!("display: flush failed");
                    display_fault_logged = true;
                }
            }

            if last_report.elapsed() >= EmbassyDuration::from_secs(30) {
                last_report = Instant::now();
                info!(
                    "uptime_s={} phase={:?} stream_bytes={}",
                    loop_start.elapsed().as_secs(),
                    app.phase(),
                    STREAM.bytes_received()
                );
            }

            Timer::after_millis(1).await;
        }
    };

    let _ = embassy_futures::join::join5(
        net_future,
        wifi_future,
        sntp_future,
        stream_future,
        ui_future,
    )
    .await;
    unreachable!()
}
