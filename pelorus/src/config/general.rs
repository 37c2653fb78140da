// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// General section in config.
#[derive(Debug, Deserialize, Clone)]
pub struct General {
    /// Time interval between broker statistics exports into the data
    /// model, in seconds.
    ///
    /// Default is 3s.
    #[serde(default = "General::default_sys_interval")]
    sys_interval: u32,

    /// Write process id to a file.
    ///
    /// Default is `/run/pelorus.pid` for root,
    /// and `/run/user/UID/pelorus.pid` for non-root users.
    #[serde(default = "General::default_pid_file")]
    pid_file: PathBuf,
}

impl General {
    #[must_use]
    pub const fn default_sys_interval() -> u32 {
        3
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn default_pid_file() -> PathBuf {
        PathBuf::from("pelorus.pid")
    }

    #[cfg(unix)]
    #[must_use]
    pub fn default_pid_file() -> PathBuf {
        let uid = unsafe { nc::geteuid() };
        if uid == 0 {
            PathBuf::from("/run/pelorus.pid")
        } else {
            PathBuf::from(&format!("/run/user/{uid}/pelorus.pid"))
        }
    }

    #[must_use]
    pub const fn sys_interval(&self) -> Duration {
        Duration::from_secs(self.sys_interval as u64)
    }

    #[must_use]
    pub fn pid_file(&self) -> &Path {
        self.pid_file.as_path()
    }
}

impl Default for General {
    fn default() -> Self {
        Self {
            sys_interval: Self::default_sys_interval(),
            pid_file: Self::default_pid_file(),
        }
    }
}
