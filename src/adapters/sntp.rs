//! SNTP time source.
//!
//! Implements [`TimeSource`] with a single SNTPv3 client exchange over
//! UDP (RFC 4330): a 48-byte request with `LI=0, VN=3, Mode=3`, and the
//! server's transmit timestamp as the reference.  Only used once at
//! startup, so there is no round-trip delay compensation.

use std::net::{ToSocketAddrs, UdpSocket};
use std::time::Duration;

use log::{debug, info};

use crate::app::ports::TimeSource;
use crate::error::CommsError;

const PACKET_LEN: usize = 48;
/// LI = 0, VN = 3, Mode = 3 (client).
const CLIENT_REQUEST: u8 = 0b00_011_011;
const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;
/// Seconds between 1900-01-01 (NTP era 0) and 1970-01-01.
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;
const TRANSMIT_OFFSET: usize = 40;

pub struct SntpTimeSource {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SntpTimeSource {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }
}

impl TimeSource for SntpTimeSource {
    fn fetch(&mut self) -> Result<Duration, CommsError> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|_| CommsError::Resolve)?
            .next()
            .ok_or(CommsError::Resolve)?;
        debug!("SNTP: querying {}", addr);

        let bind = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind).map_err(|_| CommsError::Unreachable)?;
        socket
            .set_read_timeout(Some(self.timeout))
            .map_err(|_| CommsError::Unreachable)?;
        socket.connect(addr).map_err(|_| CommsError::Unreachable)?;

        let mut request = [0u8; PACKET_LEN];
        request[0] = CLIENT_REQUEST;
        socket.send(&request).map_err(|_| CommsError::Unreachable)?;

        let mut reply = [0u8; PACKET_LEN];
        let n = socket.recv(&mut reply).map_err(|e| match e.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => CommsError::Timeout,
            _ => CommsError::Unreachable,
        })?;

        let epoch = parse_reply(&reply[..n])?;
        info!("SNTP: {} answered, epoch {}s", addr, epoch.as_secs());
        Ok(epoch)
    }
}

/// Extract the transmit timestamp from a server reply as Unix time.
pub fn parse_reply(reply: &[u8]) -> Result<Duration, CommsError> {
    if reply.len() < PACKET_LEN {
        return Err(CommsError::BadReply);
    }
    let mode = reply[0] & 0b111;
    if mode != MODE_SERVER && mode != MODE_BROADCAST {
        return Err(CommsError::BadReply);
    }
    // Stratum 0 is a kiss-o'-death; the server is telling us to go away.
    if reply[1] == 0 {
        return Err(CommsError::BadReply);
    }

    let be32 = |at: usize| u32::from_be_bytes([reply[at], reply[at + 1], reply[at + 2], reply[at + 3]]);
    let secs = u64::from(be32(TRANSMIT_OFFSET));
    let frac = u64::from(be32(TRANSMIT_OFFSET + 4));
    if secs == 0 && frac == 0 {
        return Err(CommsError::BadReply);
    }

    // NTP era 0 ends in 2036; timestamps with the MSB clear belong to era 1.
    let secs = if secs & 0x8000_0000 == 0 {
        secs + (1 << 32)
    } else {
        secs
    };
    let unix_secs = secs.checked_sub(NTP_UNIX_OFFSET).ok_or(CommsError::BadReply)?;
    let nanos = (frac * 1_000_000_000) >> 32;
    Ok(Duration::new(unix_secs, nanos as u32))
}
