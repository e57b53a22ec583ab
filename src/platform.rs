//! The runtime environment override conditions are evaluated against.
//!
//! [`Environment`] is captured once per process by [`Environment::detect`]
//! and then passed by reference to every predicate, so a single run never
//! sees two different answers for "which host is this".
use std::fmt;

use crate::error::EnvironmentError;
use crate::exec::{self, Executor};

/// Pseudo-OS name matched when the kernel release identifies WSL.
pub const WSL: &str = "WSL";

/// Snapshot of the OS name, kernel release and network host name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    system: String,
    release: String,
    hostname: String,
}

impl Environment {
    /// Create an environment with explicit values.
    #[must_use]
    pub fn new(
        system: impl Into<String>,
        release: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            release: release.into(),
            hostname: hostname.into(),
        }
    }

    /// Query the running system.
    ///
    /// On Unix the values come from `uname -s`, `uname -r` and `uname -n`,
    /// with `/proc` and the `HOSTNAME` variable as fallbacks. Windows reports
    /// `Windows` and the `COMPUTERNAME` variable.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] if the OS name or host name cannot be
    /// determined. A missing kernel release is not an error.
    pub fn detect(executor: &dyn Executor) -> Result<Self, EnvironmentError> {
        let system = detect_system(executor).ok_or_else(|| {
            EnvironmentError::SystemUnavailable(format!(
                "uname -s failed and '{}' has no known name",
                std::env::consts::OS
            ))
        })?;
        let release = detect_release(executor).unwrap_or_default();
        let hostname = detect_hostname(executor).ok_or_else(|| {
            EnvironmentError::HostnameUnavailable(
                "uname -n failed and neither HOSTNAME nor COMPUTERNAME is set".to_string(),
            )
        })?;
        Ok(Self::new(system, release, hostname))
    }

    /// Kernel/system name as reported by `uname -s` (e.g. `Linux`, `Darwin`).
    #[must_use]
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Kernel release string (e.g. `5.15.90.1-microsoft-standard-WSL2`).
    #[must_use]
    pub fn release(&self) -> &str {
        &self.release
    }

    /// Network host name.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Whether the kernel release identifies Windows Subsystem for Linux.
    #[must_use]
    pub fn is_wsl(&self) -> bool {
        self.release.contains(WSL)
    }

    /// Every OS name an `os.<Name>` condition can match on this system,
    /// least specific first.
    ///
    /// Always starts with [`system`](Self::system); [`WSL`] follows when
    /// running under WSL.
    #[must_use]
    pub fn os_identities(&self) -> Vec<&str> {
        let mut names = vec![self.system.as_str()];
        if self.is_wsl() {
            names.push(WSL);
        }
        names
    }

    /// Position of `name` in [`os_identities`](Self::os_identities), or
    /// `None` if it does not name this system. Higher is more specific.
    #[must_use]
    pub fn os_specificity(&self, name: &str) -> Option<usize> {
        self.os_identities().iter().position(|n| *n == name)
    }

    /// Whether `name` is one of [`os_identities`](Self::os_identities).
    /// Comparison is case-sensitive.
    #[must_use]
    pub fn has_os(&self, name: &str) -> bool {
        self.os_specificity(name).is_some()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "os={} host={}", self.os_identities().join("/"), self.hostname)?;
        if !self.release.is_empty() {
            write!(f, " release={}", self.release)?;
        }
        Ok(())
    }
}

/// Map the compile-time target OS to the name `uname -s` would report.
fn system_from_target() -> Option<String> {
    let name = match std::env::consts::OS {
        "linux" | "android" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        _ => return None,
    };
    Some(name.to_string())
}

fn detect_system(executor: &dyn Executor) -> Option<String> {
    if cfg!(windows) {
        return system_from_target();
    }
    exec::query(executor, "uname", &["-s"]).or_else(system_from_target)
}

fn detect_release(executor: &dyn Executor) -> Option<String> {
    if cfg!(windows) {
        return None;
    }
    exec::query(executor, "uname", &["-r"]).or_else(|| read_trimmed("/proc/sys/kernel/osrelease"))
}

fn detect_hostname(executor: &dyn Executor) -> Option<String> {
    let from_env = || {
        ["HOSTNAME", "COMPUTERNAME"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|h| h.trim().to_string())
            .find(|h| !h.is_empty())
    };
    if cfg!(windows) {
        return from_env();
    }
    exec::query(executor, "uname", &["-n"])
        .or_else(|| read_trimmed("/proc/sys/kernel/hostname"))
        .or_else(from_env)
}

fn read_trimmed(path: &str) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
