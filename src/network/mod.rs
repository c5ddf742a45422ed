use thiserror::Error;

#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl std::fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCredentials {
    pub primary: Option<WifiCredentials>,
    pub backup: Option<WifiCredentials>,
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no network credentials configured")]
    NoCredentials,
    #[error("failed to join {ssid}: {message}")]
    Connect { ssid: String, message: String },
    #[error("all networks failed; last error: {last}")]
    Exhausted {
        #[source]
        last: Box<NetworkError>,
    },
}

pub type NetworkResult<T> = std::result::Result<T, NetworkError>;

/// Radio capability that joins a wireless network.
pub trait NetworkLink {
    fn connect(&mut self, credentials: &WifiCredentials) -> NetworkResult<()>;

    /// Links that are always up (wired, host) skip credential handling.
    fn requires_credentials(&self) -> bool {
        true
    }
}

/// Join the primary network, falling back to the backup once.
///
/// Returns the SSID in use, or `None` for links that need no credentials.
pub fn connect_with_fallback<L: NetworkLink + ?Sized>(
    link: &mut L,
    credentials: &NetworkCredentials,
) -> NetworkResult<Option<String>> {
    if !link.requires_credentials() {
        tracing::info!("network link needs no credentials");
        return Ok(None);
    }

    let candidates: Vec<&WifiCredentials> = credentials
        .primary
        .iter()
        .chain(credentials.backup.iter())
        .collect();
    if candidates.is_empty() {
        return Err(NetworkError::NoCredentials);
    }

    let mut last_error = None;
    for candidate in candidates {
        match link.connect(candidate) {
            Ok(()) => {
                tracing::info!(ssid = %candidate.ssid, "network connected");
                return Ok(Some(candidate.ssid.clone()));
            }
            Err(err) => {
                tracing::warn!(ssid = %candidate.ssid, %err, "network connect failed");
                last_error = Some(err);
            }
        }
    }

    Err(NetworkError::Exhausted {
        last: Box::new(last_error.unwrap_or(NetworkError::NoCredentials)),
    })
}

/// Link for hosts whose network is managed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostNetwork;

impl NetworkLink for HostNetwork {
    fn connect(&mut self, _credentials: &WifiCredentials) -> NetworkResult<()> {
        Ok(())
    }

    fn requires_credentials(&self) -> bool {
        false
    }
}
