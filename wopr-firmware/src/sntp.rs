//! SNTP clock synchronization
//!
//! One RFC 4330 query at startup with a few bounded retries. The result
//! anchors a monotonic time base; a total failure is only a warning and
//! the clock runs from the epoch until the next power cycle.

use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{with_timeout, Duration, Instant, Timer};
use log::{info, warn};

use wopr_core::clock::LocalTime;

const NTP_SERVER: &str = "pool.ntp.org";
const NTP_PORT: u16 = 123;
const LOCAL_PORT: u16 = 12_345;
/// Seconds between the NTP era (1900) and the unix epoch (1970).
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;
const RETRIES: u32 = 3;
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Realtime anchor: unix seconds captured at an instant, advanced by the
/// monotonic clock from then on.
#[derive(Clone, Copy)]
pub struct TimeBase {
    unix_at_anchor: u64,
    anchor: Instant,
}

impl TimeBase {
    fn new(unix_secs: u64) -> Self {
        Self {
            unix_at_anchor: unix_secs,
            anchor: Instant::now(),
        }
    }

    pub fn now_unix(&self) -> u64 {
        self.unix_at_anchor + self.anchor.elapsed().as_secs()
    }

    pub fn local_time(&self, tz_hours: i8) -> LocalTime {
        LocalTime::from_unix(self.now_unix(), tz_hours)
    }
}

#[derive(Debug, Clone, Copy)]
enum SntpError {
    Dns,
    Socket,
    Timeout,
    BadPacket,
}

/// Query the pool with bounded retries and anchor the time base.
pub async fn sync_time(stack: Stack<'static>) -> TimeBase {
    for attempt in 1..=RETRIES {
        match query(stack).await {
            Ok(unix_secs) => {
                info!("NTP sync successful");
                return TimeBase::new(unix_secs);
            }
            Err(e) => {
                warn!("NTP sync failed (attempts left: {}): {:?}", RETRIES - attempt, e);
                Timer::after_secs(1).await;
            }
        }
    }
    warn!("Could not sync time with NTP server");
    TimeBase::new(0)
}

async fn query(stack: Stack<'static>) -> Result<u64, SntpError> {
    let addrs = stack
        .dns_query(NTP_SERVER, DnsQueryType::A)
        .await
        .map_err(|_| SntpError::Dns)?;
    let server = *addrs.first().ok_or(SntpError::Dns)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0u8; 64];
    let mut socket = UdpSocket::new(stack, &mut rx_meta, &mut rx_buffer, &mut tx_meta, &mut tx_buffer);
    socket.bind(LOCAL_PORT).map_err(|_| SntpError::Socket)?;

    // Client request: LI=0, VN=4, Mode=3; everything else zero.
    let mut packet = [0u8; 48];
    packet[0] = 0x23;
    socket
        .send_to(&packet, IpEndpoint::new(server, NTP_PORT))
        .await
        .map_err(|_| SntpError::Socket)?;

    let mut response = [0u8; 48];
    let (len, _meta) = with_timeout(QUERY_TIMEOUT, socket.recv_from(&mut response))
        .await
        .map_err(|_| SntpError::Timeout)?
        .map_err(|_| SntpError::Socket)?;
    if len < 44 {
        return Err(SntpError::BadPacket);
    }

    // Transmit timestamp seconds sit at bytes 40..44.
    let secs = u32::from_be_bytes([response[40], response[41], response[42], response[43]]) as u64;
    secs.checked_sub(NTP_UNIX_OFFSET).ok_or(SntpError::BadPacket)
}
