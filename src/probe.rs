// ABOUTME: Readiness probe for the backing Redis service.
// ABOUTME: Reports reachability as a plain boolean; failures never escape the probe.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Answers whether the backing service is reachable right now.
///
/// Implementations must return within a bounded time and must report
/// every failure as `false`.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn is_ready(&self, address: &str) -> bool;
}

#[derive(Debug, thiserror::Error)]
enum ProbeError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection closed without a reply")]
    NoReply,

    #[error("unexpected reply: {0:?}")]
    UnexpectedReply(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Probe that opens a TCP connection and sends an inline `PING`.
///
/// Any RESP reply counts as reachable, including errors such as
/// `-NOAUTH`: the server is up even if it refuses the command.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn ping(&self, address: &str) -> Result<(), ProbeError> {
        let exchange = async {
            let mut stream = TcpStream::connect(address).await?;
            stream.write_all(b"PING\r\n").await?;

            let mut reply = [0u8; 64];
            let n = stream.read(&mut reply).await?;
            Ok::<_, ProbeError>(String::from_utf8_lossy(&reply[..n]).into_owned())
        };

        let reply = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))??;

        match reply.chars().next() {
            None => Err(ProbeError::NoReply),
            Some('+') | Some('-') => Ok(()),
            Some(_) => Err(ProbeError::UnexpectedReply(reply.trim_end().to_string())),
        }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl ReadinessProbe for TcpProbe {
    async fn is_ready(&self, address: &str) -> bool {
        match self.ping(address).await {
            Ok(()) => {
                tracing::debug!("Redis service at {} is ready", address);
                true
            }
            Err(e) => {
                tracing::warn!("Unable to connect to Redis at {}: {}", address, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn serve_once(reply: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 16];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(reply).await;
            }
        });
        address
    }

    #[tokio::test]
    async fn pong_is_ready() {
        let address = serve_once(b"+PONG\r\n").await;
        assert!(TcpProbe::default().is_ready(&address).await);
    }

    #[tokio::test]
    async fn auth_error_still_counts_as_reachable() {
        let address = serve_once(b"-NOAUTH Authentication required.\r\n").await;
        assert!(TcpProbe::default().is_ready(&address).await);
    }

    #[tokio::test]
    async fn non_resp_reply_is_not_ready() {
        let address = serve_once(b"HTTP/1.1 400 Bad Request\r\n").await;
        assert!(!TcpProbe::default().is_ready(&address).await);
    }

    #[tokio::test]
    async fn refused_connection_is_not_ready() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(!TcpProbe::default().is_ready(&address).await);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let _guard = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let probe = TcpProbe::new(Duration::from_millis(100));
        assert!(!probe.is_ready(&address).await);
    }
}
