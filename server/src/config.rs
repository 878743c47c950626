use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use crate::session::DEFAULT_MAX_SESSIONS;

const ADDR_VAR: &str = "TICTACTOE_ADDR";
const STATIC_DIR_VAR: &str = "TICTACTOE_STATIC_DIR";
const MAX_SESSIONS_VAR: &str = "TICTACTOE_MAX_SESSIONS";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STATIC_DIR: &str = "web/dist";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Built front end, served for every path outside `/api`.
    pub static_dir: PathBuf,
    /// Live games kept before the oldest is dropped.
    pub max_sessions: usize,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .with_context(|| format!("{ADDR_VAR}={addr} is not a socket address"))?;
        let static_dir = lookup(STATIC_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));
        let max_sessions = match lookup(MAX_SESSIONS_VAR) {
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|&n: &usize| n > 0)
                .with_context(|| format!("{MAX_SESSIONS_VAR}={raw} is not a positive number"))?,
            None => DEFAULT_MAX_SESSIONS,
        };
        Ok(Self {
            addr,
            static_dir,
            max_sessions,
        })
    }
}
