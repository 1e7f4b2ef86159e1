//! WOPR LED marquee firmware
//!
//! Drives a 12-module MAX7219 chain (8x96 pixels) over SPI, shows a
//! randomized typing animation inside a configurable daily window, and
//! serves an HTTP control surface on port 80 for changing the window,
//! the UTC offset and the on/off state. Configuration persists in
//! flash across power cycles.
//!
//! One embassy executor, one scheduler loop: each iteration polls the
//! listening port with a bounded timeout, then runs one display tick.
//! Neither a slow peer nor a display fault may take the loop down.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_net::tcp::TcpSocket;
use embassy_time::{with_timeout, Duration, Timer};
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::rng::Rng;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::spi::Mode;
use esp_hal::time::Rate;
use esp_hal::timer::systimer::SystemTimer;
use log::{info, warn};

use wopr_core::animation::RandomSource;
use wopr_core::scheduler::{self, Phase, ACCEPT_POLL_MS, IDLE_DELAY_MS};

mod http_server;
mod led_matrix;
mod sntp;
mod storage;
mod wifi;

use led_matrix::LedMatrix;
use storage::ConfigStorage;

/// DHCP hostname.
pub const HOSTNAME: &str = "WOPR";

const HTTP_PORT: u16 = 80;

/// Hardware RNG behind the core's randomness trait.
struct HwRng(Rng);

impl RandomSource for HwRng {
    fn next_u32(&mut self) -> u32 {
        self.0.random()
    }
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();

    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    esp_alloc::heap_allocator!(size: 72 * 1024);
    esp_hal_embassy::init(SystemTimer::new(peripherals.SYSTIMER).alarm0);

    info!("=== WOPR LED marquee ===");

    // Configuration first: the WiFi credentials live in it.
    let mut storage = ConfigStorage::new();
    let mut config = storage.load_or_default().await;

    // Network association is the one fatal startup precondition.
    let hw_rng = Rng::new(peripherals.RNG);
    let stack = wifi::connect(
        spawner,
        peripherals.TIMG0,
        hw_rng.clone(),
        peripherals.WIFI,
        config.wifi_ssid.as_str(),
        config.wifi_pass.as_str(),
    )
    .await;

    // Wall clock, best effort: SNTP with bounded retries.
    let clock = sntp::sync_time(stack).await;

    // SPI bus to the MAX7219 chain: SCK=GPIO2, MOSI=GPIO3, CS=GPIO5.
    let spi = Spi::new(
        peripherals.SPI2,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(10))
            .with_mode(Mode::_0),
    )
    .unwrap()
    .with_sck(peripherals.GPIO2)
    .with_mosi(peripherals.GPIO3);
    let cs = Output::new(peripherals.GPIO5, Level::High, OutputConfig::default());
    let mut matrix = LedMatrix::new(spi, cs);
    if let Err(e) = matrix.init() {
        warn!("Matrix init failed: {:?}", e);
    }

    let mut rng = HwRng(hw_rng);
    let mut rx_buffer = [0u8; 1024];
    let mut tx_buffer = [0u8; 4096];

    info!("Web server started on port {}", HTTP_PORT);

    // The scheduler loop. Two phases per iteration, each fenced off so
    // a failure in one never reaches the other or the next iteration.
    loop {
        // Network phase: bounded poll for at most one pending peer.
        {
            let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
            socket.set_timeout(Some(Duration::from_secs(5)));
            match with_timeout(Duration::from_millis(ACCEPT_POLL_MS), socket.accept(HTTP_PORT)).await {
                Ok(Ok(())) => {
                    if let Err(e) =
                        http_server::serve(&mut socket, &mut config, &mut storage, &mut matrix, &clock).await
                    {
                        warn!("Error handling request: {:?}", e);
                    }
                }
                Ok(Err(e)) => warn!("Accept failed: {:?}", e),
                Err(_) => {} // nothing pending inside the poll window
            }
        }

        // Display phase: animate inside the window, otherwise re-blank.
        let now = clock.local_time(config.timezone);
        match scheduler::plan(&config, now.hour) {
            Phase::Animate => match matrix.render_typing_frame(&mut rng) {
                Ok(()) => Timer::after_millis(scheduler::pick_frame_delay_ms(&mut rng)).await,
                Err(e) => warn!("Error updating display: {:?}", e),
            },
            Phase::Blank => {
                if let Err(e) = matrix.clear().await {
                    warn!("Error clearing display: {:?}", e);
                }
                Timer::after_millis(IDLE_DELAY_MS).await;
            }
        }
    }
}
