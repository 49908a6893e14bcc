//! Process configuration, read once from the environment at startup.

use std::net::{IpAddr, SocketAddr};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub struct Config {
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| match raw.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    tracing::warn!(value = %raw, "PORT is not a valid u16, falling back to default");
                    None
                }
            })
            .unwrap_or(DEFAULT_PORT);

        let ip = std::env::var("BIND_ADDRESS")
            .ok()
            .and_then(|raw| match raw.parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    tracing::warn!(value = %raw, "BIND_ADDRESS is not a valid IP, falling back to default");
                    None
                }
            })
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.parse().expect("default bind address is valid"));

        Self {
            bind_addr: SocketAddr::new(ip, port),
        }
    }
}
