//! Settings for finding and connecting to strips.

use std::time::Duration;

/// Advertised name prefix of ELK-BLEDOM controllers
pub const DEFAULT_NAME_PREFIX: &str = "ELK-BLEDOM";

/// Environment variable overriding [`DEFAULT_NAME_PREFIX`]
pub const NAME_PREFIX_ENV: &str = "BLEDOM_PREFIX";

/// How long to listen for advertisements by default
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// How many times a failed session is started over by default
pub const DEFAULT_RETRIES: u32 = 3;

/// Which peripherals to pick up during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Local name prefix a strip must advertise
    pub name_prefix: String,
    /// MAC address or platform id of one specific strip; overrides the prefix
    pub address: Option<String>,
    /// Maximum time to wait for device discovery
    pub scan_timeout: Duration,
    /// Session restarts after a Bluetooth failure
    pub retries: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            address: None,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl ScanConfig {
    /// Defaults, with the name prefix taken from `BLEDOM_PREFIX` when set
    pub fn from_env() -> Self {
        let mut config = ScanConfig::default();
        if let Ok(prefix) = std::env::var(NAME_PREFIX_ENV) {
            if !prefix.trim().is_empty() {
                config.name_prefix = prefix.trim().to_string();
            }
        }
        config
    }

    /// Targets one strip by address or id
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Whether an advertised peripheral is one of ours
    pub fn matches(&self, local_name: Option<&str>, id: &str, address: &str) -> bool {
        match &self.address {
            Some(wanted) => {
                wanted.eq_ignore_ascii_case(id) || wanted.eq_ignore_ascii_case(address)
            }
            // Names can be padded with spaces
            None => local_name.is_some_and(|name| name.trim().starts_with(&self.name_prefix)),
        }
    }

    /// Whether the scan can stop at the first match
    pub fn single_target(&self) -> bool {
        self.address.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.name_prefix, "ELK-BLEDOM");
        assert_eq!(config.scan_timeout, Duration::from_secs(10));
        assert_eq!(config.retries, 3);
        assert!(!config.single_target());
    }

    #[test]
    fn matches_by_prefix() {
        let config = ScanConfig::default();
        assert!(config.matches(Some("ELK-BLEDOM0C"), "hci0/dev_1", "be:58:30:00:cc:11"));
        assert!(config.matches(Some("ELK-BLEDOM   "), "x", "y"));
        assert!(!config.matches(Some("LEDBLE-1234"), "x", "y"));
        assert!(!config.matches(None, "x", "y"));
    }

    #[test]
    fn matches_by_address_ignoring_name() {
        let config = ScanConfig::default().with_address("BE:58:30:00:CC:11");
        assert!(config.single_target());
        assert!(config.matches(None, "hci0/dev_1", "be:58:30:00:cc:11"));
        assert!(config.matches(Some("whatever"), "be:58:30:00:cc:11", "00:00:00:00:00:00"));
        assert!(!config.matches(Some("ELK-BLEDOM"), "x", "00:00:00:00:00:00"));
    }
}
