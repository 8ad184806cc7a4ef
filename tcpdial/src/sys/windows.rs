//! Windows platform abstraction layer.
//!
//! This module mirrors the unix layer and exposes identical function
//! names and semantics where possible. `select` and `WSAPoll` stand in
//! for `select(2)` and `poll(2)`.

use crate::sys::common::{Interest, Readiness};

use std::io;
use std::mem;
use std::net::SocketAddrV4;
use std::sync::Once;
use std::time::Duration;

use windows_sys::Win32::Networking::WinSock::{
    AF_INET, FD_SET, FIONBIO, INVALID_SOCKET, POLLERR, POLLHUP, POLLIN, POLLNVAL, POLLOUT,
    SO_ERROR, SOCK_STREAM, SOCKADDR, SOCKADDR_IN, SOCKET, SOCKET_ERROR, SOL_SOCKET, TIMEVAL,
    WSADATA, WSAEWOULDBLOCK, WSAPOLLFD, WSAPoll, WSAStartup, closesocket, connect, getsockopt,
    ioctlsocket, recv, select, send, socket,
};

/// Raw descriptor type on Windows.
pub type RawFd = std::os::windows::io::RawSocket;

/// Previous `FIONBIO` argument.
///
/// WinSock cannot report the current mode, so this is always the
/// blocking value a fresh socket starts with.
pub(crate) type ModeFlags = u32;

/// Creates a MAKEWORD value for Winsock version.
#[inline]
const fn makeword(low: u8, high: u8) -> u16 {
    ((high as u16) << 8) | (low as u16)
}

/// Winsock initialization guard.
static WINSOCK_INIT: Once = Once::new();

/// Initialize Winsock if not already initialized.
fn ensure_winsock() {
    WINSOCK_INIT.call_once(|| unsafe {
        let mut data: WSADATA = mem::zeroed();
        let rc = WSAStartup(makeword(2, 2), &mut data as *mut _);
        assert_eq!(rc, 0, "WSAStartup failed: {}", rc);
    });
}

/// Creates a blocking IPv4 stream socket.
pub(crate) fn sys_socket() -> io::Result<RawFd> {
    ensure_winsock();
    unsafe {
        let fd = socket(AF_INET as i32, SOCK_STREAM, 0);
        if fd == INVALID_SOCKET {
            return Err(io::Error::last_os_error());
        }
        Ok(fd as RawFd)
    }
}

/// Sets a socket to non-blocking mode.
pub(crate) fn sys_set_nonblocking(fd: RawFd) -> io::Result<ModeFlags> {
    set_fionbio(fd, 1)?;
    Ok(0)
}

/// Restores the mode saved by [`sys_set_nonblocking`].
pub(crate) fn sys_restore_mode(fd: RawFd, flags: ModeFlags) -> io::Result<()> {
    set_fionbio(fd, flags)
}

fn set_fionbio(fd: RawFd, value: u32) -> io::Result<()> {
    unsafe {
        let mut arg = value;
        if ioctlsocket(fd as SOCKET, FIONBIO, &mut arg) != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}

/// Connects a socket to an IPv4 address.
pub(crate) fn sys_connect(fd: RawFd, addr: &SocketAddrV4) -> io::Result<()> {
    let mut sa: SOCKADDR_IN = unsafe { mem::zeroed() };
    sa.sin_family = AF_INET;
    sa.sin_port = addr.port().to_be();
    sa.sin_addr.S_un.S_addr = u32::from(*addr.ip()).to_be();

    unsafe {
        let rc = connect(
            fd as SOCKET,
            &sa as *const _ as *const SOCKADDR,
            mem::size_of::<SOCKADDR_IN>() as i32,
        );
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

/// Returns `true` if `err` is WinSock's "connect in progress" signal.
pub(crate) fn sys_is_in_progress(err: &io::Error) -> bool {
    err.raw_os_error() == Some(WSAEWOULDBLOCK)
}

/// Retrieves the pending socket error via `SO_ERROR`.
///
/// Returns the raw code, `0` meaning no error is pending.
pub(crate) fn sys_take_socket_error(fd: RawFd) -> io::Result<i32> {
    unsafe {
        let mut err: i32 = 0;
        let mut len: i32 = mem::size_of::<i32>() as i32;

        let rc = getsockopt(
            fd as SOCKET,
            SOL_SOCKET,
            SO_ERROR,
            &mut err as *mut _ as *mut u8,
            &mut len,
        );

        if rc != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(err)
        }
    }
}

/// Receives from a socket into the given buffer.
pub(crate) fn sys_read(fd: RawFd, buffer: &mut [u8]) -> io::Result<usize> {
    let len = buffer.len().min(i32::MAX as usize) as i32;
    let rc = unsafe { recv(fd as SOCKET, buffer.as_mut_ptr(), len, 0) };
    if rc == SOCKET_ERROR {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc as usize)
    }
}

/// Sends the buffer on a socket.
pub(crate) fn sys_write(fd: RawFd, buffer: &[u8]) -> io::Result<usize> {
    let len = buffer.len().min(i32::MAX as usize) as i32;
    let rc = unsafe { send(fd as SOCKET, buffer.as_ptr(), len, 0) };
    if rc == SOCKET_ERROR {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc as usize)
    }
}

/// Closes a socket.
pub(crate) fn sys_close(fd: RawFd) -> io::Result<()> {
    let rc = unsafe { closesocket(fd as SOCKET) };
    if rc != 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Waits on a single socket with WinSock `select`.
///
/// WinSock reports a failed non-blocking connect through the except
/// set, which is surfaced as [`Readiness::error`].
pub(crate) fn sys_select(
    fd: RawFd,
    interest: Interest,
    timeout: Duration,
) -> io::Result<Option<Readiness>> {
    let socket = fd as SOCKET;

    let mut read_set: FD_SET = unsafe { mem::zeroed() };
    let mut write_set: FD_SET = unsafe { mem::zeroed() };
    let mut except_set: FD_SET = unsafe { mem::zeroed() };

    if interest.read {
        read_set.fd_count = 1;
        read_set.fd_array[0] = socket;
    }
    if interest.write {
        write_set.fd_count = 1;
        write_set.fd_array[0] = socket;
    }
    except_set.fd_count = 1;
    except_set.fd_array[0] = socket;

    let micros = timeout.as_nanos().div_ceil(1_000);
    let tv = TIMEVAL {
        tv_sec: (micros / 1_000_000).min(i32::MAX as u128) as i32,
        tv_usec: (micros % 1_000_000) as i32,
    };

    let rc = unsafe {
        select(
            0,
            &mut read_set,
            &mut write_set,
            &mut except_set,
            &tv as *const TIMEVAL,
        )
    };

    if rc == SOCKET_ERROR {
        return Err(io::Error::last_os_error());
    }
    if rc == 0 {
        return Ok(None);
    }

    Ok(Some(Readiness {
        readable: is_set(&read_set, socket),
        writable: is_set(&write_set, socket),
        error: is_set(&except_set, socket),
    }))
}

fn is_set(set: &FD_SET, socket: SOCKET) -> bool {
    set.fd_array[..set.fd_count as usize].contains(&socket)
}

/// Waits on a single socket with `WSAPoll`.
pub(crate) fn sys_poll(
    fd: RawFd,
    interest: Interest,
    timeout: Duration,
) -> io::Result<Option<Readiness>> {
    let mut events = 0;

    if interest.read {
        events |= POLLIN;
    }
    if interest.write {
        events |= POLLOUT;
    }

    let mut entry = WSAPOLLFD {
        fd: fd as SOCKET,
        events,
        revents: 0,
    };

    let timeout_ms = timeout
        .as_nanos()
        .div_ceil(1_000_000)
        .min(i32::MAX as u128) as i32;

    let rc = unsafe { WSAPoll(&mut entry, 1, timeout_ms) };

    if rc == SOCKET_ERROR {
        return Err(io::Error::last_os_error());
    }
    if rc == 0 {
        return Ok(None);
    }

    Ok(Some(Readiness {
        readable: entry.revents & POLLIN != 0,
        writable: entry.revents & POLLOUT != 0,
        error: entry.revents & (POLLERR | POLLHUP | POLLNVAL) != 0,
    }))
}
