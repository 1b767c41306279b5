//! Wi-Fi worker: executes one join attempt per core command and keeps
//! the shared link handle current.
//!
//! Retry policy (timeout budget, settle delay) lives in the core state
//! machine; this task never retries on its own.

use embassy_net::Stack;
use embassy_time::{Duration, Instant, Timer, WithTimeout};
use esp_radio::wifi::{ScanConfig, WifiController};
use log::info;
use skywave_hal_esp32s3::network::LinkHandle;

const COMMAND_POLL_MS: u64 = 100;
const MONITOR_POLL_MS: u64 = 500;
const DHCP_TIMEOUT_SECS: u64 = 15;
const SCAN_MAX_APS: usize = 8;
const RSSI_REFRESH_SECS: u64 = 30;

pub async fn connection_task(
    controller: &mut WifiController<'_>,
    stack: Stack<'_>,
    link: &'static LinkHandle,
) -> ! {
    let mut served_joins = 0u32;

    loop {
        if link.take_disconnect_request() {
            let _ = controller.disconnect_async().await;
            link.mark_disconnected();
        }

        let requested = link.join_requests();
        if requested == served_joins {
            Timer::after_millis(COMMAND_POLL_MS).await;
            continue;
        }
        served_joins = requested;

        link.mark_connecting();

        if !controller.is_started().unwrap_or(false) {
            if let Err(err) = controller.start_async().await {
                info!("wifi start failed: {:?}", err);
                link.mark_disconnected();
                continue;
            }
        }

        refresh_rssi(controller, link).await;

        if let Err(err) = controller.connect_async().await {
            info!("wifi connect failed: {:?}", err);
            let _ = controller.disconnect_async().await;
            link.mark_disconnected();
            continue;
        }

        match stack
            .wait_config_up()
            .with_timeout(Duration::from_secs(DHCP_TIMEOUT_SECS))
            .await
        {
            Ok(()) => {
                if let Some(config) = stack.config_v4() {
                    link.set_address(config.address.address().octets());
                }
                link.update_link_ip(stack.is_link_up(), stack.config_v4().is_some());
                info!("wifi connected and dhcp ready");
            }
            Err(_) => {
                info!("dhcp timeout");
                let _ = controller.disconnect_async().await;
                link.mark_disconnected();
                continue;
            }
        }

        monitor(controller, stack, link, served_joins).await;
    }
}

/// Watches the association until it drops or the core commands
/// otherwise.
async fn monitor(
    controller: &mut WifiController<'_>,
    stack: Stack<'_>,
    link: &'static LinkHandle,
    served_joins: u32,
) {
    let mut last_rssi_refresh = Instant::now();

    loop {
        if link.join_requests() != served_joins {
            // A fresh attempt was commanded; the outer loop serves it.
            return;
        }
        if link.take_disconnect_request() {
            let _ = controller.disconnect_async().await;
            link.mark_disconnected();
            return;
        }

        let link_up = stack.is_link_up();
        let has_ipv4 = stack.config_v4().is_some();
        let is_connected = matches!(controller.is_connected(), Ok(true));
        link.update_link_ip(link_up, has_ipv4);

        if !(link_up && has_ipv4 && is_connected) {
            info!(
                "wifi state lost (link_up={} has_ipv4={} connected={})",
                link_up, has_ipv4, is_connected
            );
            link.mark_disconnected();
            let _ = controller.disconnect_async().await;
            return;
        }

        if last_rssi_refresh.elapsed() >= Duration::from_secs(RSSI_REFRESH_SECS) {
            last_rssi_refresh = Instant::now();
            refresh_rssi(controller, link).await;
        }

        Timer::after_millis(MONITOR_POLL_MS).await;
    }
}

/// Captures the target AP's signal strength from a scan; the quality
/// indicator on the ready screen is derived from this.
async fn refresh_rssi(controller: &mut WifiController<'_>, link: &'static LinkHandle) {
    match controller
        .scan_with_config_async(ScanConfig::default().with_max(SCAN_MAX_APS))
        .await
    {
        Ok(results) => {
            for ap in results.iter() {
                if ap.ssid == crate::WIFI_SSID {
                    link.set_rssi(ap.signal_strength);
                }
            }
        }
        Err(err) => info!("wifi scan failed: {:?}", err),
    }
}
