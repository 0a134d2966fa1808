//! Client platform classification from the `user-agent` header.

use std::fmt;

/// Platform family a client declares in its user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    Windows,
    /// Anything that is not Windows, including clients that send no user agent.
    #[default]
    Other,
}

impl Platform {
    /// Classifies a user-agent value. Matching is case-insensitive and a
    /// missing header classifies as [`Platform::Other`].
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if ua.to_lowercase().contains("windows") => Platform::Windows,
            _ => Platform::Other,
        }
    }

    /// Installer script extension for this platform.
    pub fn script_extension(self) -> &'static str {
        match self {
            Platform::Windows => "ps1",
            Platform::Other => "sh",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::Other => write!(f, "other"),
        }
    }
}
