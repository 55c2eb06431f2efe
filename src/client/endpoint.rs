//! Default lobby server endpoints per platform.
//!
//! Discovery proper belongs to the host app; these are the development
//! defaults the mobile client ships with.

use url::Url;

/// Port the lobby server listens on.
pub const DEFAULT_PORT: u16 = 3000;

/// Where the client is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// Browser build, server on the same machine
    Web,

    /// Android emulator, host loopback is 10.0.2.2
    AndroidEmulator,

    /// Physical device, reaching the machine that serves the bundle.
    /// `debugger_host` is `host:port` as reported by the dev tooling.
    Device { debugger_host: String },
}

impl Platform {
    /// Resolve the WebSocket base URL.
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        let host = match self {
            Self::Web => "localhost",
            Self::AndroidEmulator => "10.0.2.2",
            Self::Device { debugger_host } => {
                debugger_host.split(':').next().unwrap_or(debugger_host)
            }
        };
        Url::parse(&format!("ws://{}:{}", host, DEFAULT_PORT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_and_emulator() {
        assert_eq!(
            Platform::Web.endpoint().unwrap().as_str(),
            "ws://localhost:3000/"
        );
        assert_eq!(
            Platform::AndroidEmulator.endpoint().unwrap().as_str(),
            "ws://10.0.2.2:3000/"
        );
    }

    #[test]
    fn test_device_strips_debugger_port() {
        let platform = Platform::Device {
            debugger_host: "192.168.1.20:8081".to_string(),
        };
        assert_eq!(platform.endpoint().unwrap().as_str(), "ws://192.168.1.20:3000/");
    }

    #[test]
    fn test_device_bad_host() {
        let platform = Platform::Device {
            debugger_host: "".to_string(),
        };
        assert!(platform.endpoint().is_err());
    }
}
