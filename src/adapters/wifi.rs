//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`]: the hexagonal boundary for network
//! connectivity.  Retry cadence is owned by the
//! [`LinkSupervisor`](crate::app::link::LinkSupervisor); this adapter makes
//! exactly one bounded attempt per `connect()` call.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use core::fmt;
use log::{error, info};

use crate::app::ports::ConnectivityPort;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Credential errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), CredentialError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CredentialError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CredentialError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(CredentialError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    driver: BlockingWifi<EspWifi<'static>>,
    #[cfg(target_os = "espidf")]
    configured: bool,
    /// Simulation: whether the access point is in range.
    #[cfg(not(target_os = "espidf"))]
    sim_reachable: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        driver: BlockingWifi<EspWifi<'static>>,
        ssid: &str,
        password: &str,
    ) -> Result<Self, CredentialError> {
        let (ssid, password) = Self::credentials(ssid, password)?;
        Ok(Self {
            ssid,
            password,
            attempts: 0,
            driver,
            configured: false,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str) -> Result<Self, CredentialError> {
        let (ssid, password) = Self::credentials(ssid, password)?;
        Ok(Self {
            ssid,
            password,
            attempts: 0,
            sim_reachable: true,
            sim_connected: false,
        })
    }

    fn credentials(
        ssid: &str,
        password: &str,
    ) -> Result<(heapless::String<32>, heapless::String<64>), CredentialError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut s = heapless::String::new();
        s.push_str(ssid).map_err(|()| CredentialError::InvalidSsid)?;
        let mut p = heapless::String::new();
        p.push_str(password).map_err(|()| CredentialError::InvalidPassword)?;
        Ok((s, p))
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Number of connect attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), esp_idf_svc::sys::EspError> {
        if !self.configured {
            let auth_method = if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };
            self.driver.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: self.ssid.clone(),
                password: self.password.clone(),
                auth_method,
                ..Default::default()
            }))?;
            self.driver.start()?;
            self.configured = true;
        }
        self.driver.connect()?;
        self.driver.wait_netif_up()?;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), &'static str> {
        if !self.sim_reachable {
            return Err("access point out of range");
        }
        self.sim_connected = true;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_connected
    }

    // ── Simulation controls ───────────────────────────────────

    /// Simulation: bring the access point in or out of range.  Going out
    /// of range drops an established association.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_reachable(&mut self, reachable: bool) {
        self.sim_reachable = reachable;
        if !reachable {
            self.sim_connected = false;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.attempts = self.attempts.wrapping_add(1);
        info!("WiFi: connecting to '{}' (attempt {})", self.ssid, self.attempts);

        match self.platform_connect() {
            Ok(()) => {
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {:?}", e);
                Err(CommsError::WifiConnectFailed)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
