//! TCP connect prober.
//!
//! Performs a full TCP handshake using the operating system's socket API and
//! closes the connection as soon as it is established. Does not require
//! elevated privileges. Hostname targets are resolved by the connect call
//! itself, inside the timeout.

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::Prober;
use crate::types::{Port, ScanAddress};
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// TCP connect prober.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProber;

impl TcpConnectProber {
    pub fn new() -> Self {
        Self
    }

    async fn connect(address: &ScanAddress, port: u16) -> io::Result<TcpStream> {
        match address {
            ScanAddress::Ip(ip) => TcpStream::connect(SocketAddr::new(*ip, port)).await,
            ScanAddress::Host(host) => TcpStream::connect((host.as_str(), port)).await,
        }
    }
}

fn classify_error(address: &ScanAddress, port: u16, e: io::Error) -> ScanError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => ScanError::ConnectionRefused,
        io::ErrorKind::TimedOut => ScanError::Timeout,
        _ => ScanError::ConnectionFailed {
            target: address.to_string(),
            port,
            reason: e.to_string(),
        },
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, address: &ScanAddress, port: Port, limit: Duration) -> ScanResult<()> {
        let port = port.as_u16();
        match timeout(limit, Self::connect(address, port)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(classify_error(address, port, e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let result = TcpConnectProber::new()
            .probe(&ScanAddress::Ip(LOCALHOST), port, Duration::from_secs(2))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        // Bind then drop to find a port with no listener.
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        drop(listener);

        let result = TcpConnectProber::new()
            .probe(&ScanAddress::Ip(LOCALHOST), port, Duration::from_millis(500))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_probe_hostname() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let result = TcpConnectProber::new()
            .probe(
                &ScanAddress::Host("localhost".to_string()),
                port,
                Duration::from_secs(2),
            )
            .await;
        assert!(result.is_ok());
    }
}
