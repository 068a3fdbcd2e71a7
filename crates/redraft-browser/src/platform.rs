//! Browser/OS detection.
//!
//! Only what the write recipes need: which modifier a paste shortcut uses.

/// Facts about the running browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Platform {
    pub mac: bool,
    pub ios: bool,
}

impl Platform {
    /// Parse a `navigator.userAgent` string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ios = ["iPhone", "iPad", "iPod"]
            .iter()
            .any(|device| user_agent.contains(device));
        let mac = !ios && user_agent.contains("Macintosh");
        Self { mac, ios }
    }

    /// Cmd on Apple platforms, Ctrl elsewhere.
    pub fn primary_is_meta(&self) -> bool {
        self.mac || self.ios
    }
}

/// Detect the current platform. Defaults to a non-Apple platform when the
/// user agent cannot be read.
pub fn platform() -> Platform {
    web_sys::window()
        .and_then(|window| window.navigator().user_agent().ok())
        .map(|ua| Platform::from_user_agent(&ua))
        .unwrap_or_default()
}
