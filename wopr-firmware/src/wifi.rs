//! WiFi association and network bring-up
//!
//! Joins the configured network as a station and runs DHCP under the
//! device hostname. Association is a hard startup precondition: if no
//! address arrives inside the boot window the firmware halts, because a
//! marquee nobody can reach is just a broken lamp.

use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, DhcpConfig, Runner, Stack, StackResources};
use embassy_time::{with_timeout, Duration, Timer};
use esp_hal::peripherals::{TIMG0, WIFI};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_wifi::wifi::{ClientConfiguration, Configuration, WifiController, WifiDevice};
use esp_wifi::EspWifiController;
use log::{error, info};
use static_cell::StaticCell;

static WIFI_INIT: StaticCell<EspWifiController<'static>> = StaticCell::new();
static WIFI_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

/// How long boot may wait for association plus a DHCP lease.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bring the station up and return the ready network stack.
/// Panics when the network is not there - the startup-fatal case.
pub async fn connect(
    spawner: Spawner,
    timg0: TIMG0<'static>,
    mut rng: Rng,
    wifi: WIFI<'static>,
    ssid: &str,
    password: &str,
) -> Stack<'static> {
    // Seed for the network stack, drawn before the RNG handle moves on.
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let timer_group = TimerGroup::new(timg0);
    let wifi_init = WIFI_INIT.init(esp_wifi::init(timer_group.timer0, rng).unwrap());
    let (mut controller, interfaces) = esp_wifi::wifi::new(wifi_init, wifi).unwrap();

    info!("Connecting to WiFi: {}", ssid);
    let client_config = Configuration::Client(ClientConfiguration {
        ssid: ssid.try_into().unwrap(),
        password: password.try_into().unwrap(),
        ..Default::default()
    });
    controller.set_configuration(&client_config).unwrap();

    let mut dhcp_config = DhcpConfig::default();
    dhcp_config.hostname = Some(crate::HOSTNAME.try_into().unwrap());
    let net_config = NetConfig::dhcpv4(dhcp_config);

    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        net_config,
        WIFI_RESOURCES.init(StackResources::new()),
        seed,
    );

    spawner.spawn(net_task(runner)).ok();
    spawner.spawn(connection_task(controller)).ok();

    if with_timeout(CONNECT_TIMEOUT, wait_for_address(stack)).await.is_err() {
        panic!("network connection failed");
    }
    stack
}

async fn wait_for_address(stack: Stack<'static>) {
    loop {
        if stack.is_link_up() {
            if let Some(config) = stack.config_v4() {
                info!("ip = {}", config.address);
                return;
            }
        }
        info!("waiting for connection...");
        Timer::after(Duration::from_millis(500)).await;
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Keeps the station associated for the process lifetime: starts the
/// controller, reconnects after a drop, never exits.
#[embassy_executor::task]
async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi connection task started");
    loop {
        match controller.is_started() {
            Ok(true) => match controller.is_connected() {
                Ok(true) => Timer::after(Duration::from_secs(1)).await,
                Ok(false) => {
                    info!("WiFi disconnected, reconnecting...");
                    controller.connect().ok();
                }
                Err(e) => error!("WiFi connection error: {:?}", e),
            },
            Ok(false) => {
                info!("Starting WiFi...");
                controller.start().ok();
            }
            Err(e) => error!("WiFi status error: {:?}", e),
        }
        Timer::after(Duration::from_millis(100)).await;
    }
}
