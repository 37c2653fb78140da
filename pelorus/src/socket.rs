// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

#![allow(clippy::module_name_repetitions)]

use tokio::net::TcpStream;

use crate::config::TcpKeepalive;
use crate::error::Error;

/// Enable kernel TCP keep-alive on a client socket so dead peers surface
/// as read errors on the connection task.
#[cfg(target_os = "linux")]
pub fn set_keepalive(stream: &TcpStream, keepalive: TcpKeepalive) -> Result<(), Error> {
    use std::os::unix::io::AsRawFd;

    use crate::error::ErrorKind;

    let socket_fd = stream.as_raw_fd();
    #[allow(clippy::cast_possible_wrap)]
    let options: [(i32, i32, i32); 4] = [
        (nc::SOL_SOCKET, nc::SO_KEEPALIVE, 1),
        (nc::IPPROTO_TCP, nc::TCP_KEEPIDLE, keepalive.idle() as i32),
        (nc::IPPROTO_TCP, nc::TCP_KEEPINTVL, keepalive.interval() as i32),
        (nc::IPPROTO_TCP, nc::TCP_KEEPCNT, keepalive.count() as i32),
    ];

    for (level, name, value) in options {
        let value_ptr = std::ptr::addr_of!(value).cast::<core::ffi::c_void>();
        unsafe {
            #[allow(clippy::cast_possible_truncation)]
            let value_len = std::mem::size_of_val(&value) as nc::socklen_t;
            nc::setsockopt(socket_fd, level, name, value_ptr, value_len).map_err(|errno| {
                Error::from_string(
                    ErrorKind::KernelError,
                    format!(
                        "Failed to set socket option {name}, err: {}",
                        nc::strerror(errno)
                    ),
                )
            })?;
        }
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn set_keepalive(_stream: &TcpStream, _keepalive: TcpKeepalive) -> Result<(), Error> {
    Ok(())
}
