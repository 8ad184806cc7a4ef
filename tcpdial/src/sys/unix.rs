use crate::sys::common::{Interest, Readiness};

use libc::{
    AF_INET, EINPROGRESS, F_GETFL, F_SETFL, FD_ISSET, FD_SET, FD_SETSIZE, FD_ZERO, O_NONBLOCK,
    POLLERR, POLLHUP, POLLIN, POLLNVAL, POLLOUT, SO_ERROR, SOCK_STREAM, SOL_SOCKET, c_int,
    c_short, close, connect, fcntl, fd_set, getsockopt, nfds_t, poll, pollfd, read, select,
    sockaddr, sockaddr_in, socket, socklen_t, suseconds_t, time_t, timeval, write,
};
use std::net::SocketAddrV4;
use std::time::Duration;
use std::{io, mem, ptr};

/// Raw descriptor type on unix.
pub type RawFd = std::os::fd::RawFd;

/// File status flags saved before entering non-blocking mode.
pub(crate) type ModeFlags = c_int;

/// Creates a blocking IPv4 stream socket.
pub(crate) fn sys_socket() -> io::Result<RawFd> {
    let fd = unsafe { socket(AF_INET, SOCK_STREAM, 0) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(fd)
}

/// Sets a file descriptor to non-blocking mode.
///
/// Returns the flags that were in effect before the change so the
/// caller can restore them with [`sys_restore_mode`].
pub(crate) fn sys_set_nonblocking(fd: RawFd) -> io::Result<ModeFlags> {
    let flags = unsafe { fcntl(fd, F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    let rc = unsafe { fcntl(fd, F_SETFL, flags | O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(flags)
}

/// Restores flags previously returned by [`sys_set_nonblocking`].
pub(crate) fn sys_restore_mode(fd: RawFd, flags: ModeFlags) -> io::Result<()> {
    let rc = unsafe { fcntl(fd, F_SETFL, flags) };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Issues `connect(2)` towards an IPv4 address.
///
/// On a non-blocking socket this usually fails with `EINPROGRESS`,
/// see [`sys_is_in_progress`].
pub(crate) fn sys_connect(fd: RawFd, addr: &SocketAddrV4) -> io::Result<()> {
    let (storage, len) = socketaddr_to_sockaddr_in(addr);

    let rc = unsafe { connect(fd, &storage as *const _ as *const sockaddr, len) };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Returns `true` if `err` means the handshake was started but has not
/// completed yet.
pub(crate) fn sys_is_in_progress(err: &io::Error) -> bool {
    err.raw_os_error() == Some(EINPROGRESS)
}

/// Reads the pending socket error via `SO_ERROR`.
///
/// Returns the raw code, `0` meaning no error is pending. The fetch
/// itself failing is reported as `Err`.
pub(crate) fn sys_take_socket_error(fd: RawFd) -> io::Result<i32> {
    let mut err: c_int = 0;
    let mut len = mem::size_of::<c_int>() as socklen_t;

    let rc = unsafe {
        getsockopt(
            fd,
            SOL_SOCKET,
            SO_ERROR,
            &mut err as *mut _ as *mut _,
            &mut len,
        )
    };

    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(err)
    }
}

/// Reads from a file descriptor into the given buffer.
pub(crate) fn sys_read(fd: RawFd, buffer: &mut [u8]) -> io::Result<usize> {
    let n = unsafe { read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

/// Writes the buffer to a file descriptor.
pub(crate) fn sys_write(fd: RawFd, buffer: &[u8]) -> io::Result<usize> {
    let n = unsafe { write(fd, buffer.as_ptr() as *const _, buffer.len()) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

/// Closes a file descriptor.
pub(crate) fn sys_close(fd: RawFd) -> io::Result<()> {
    let rc = unsafe { close(fd) };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Waits on a single descriptor with `select(2)`.
///
/// Returns `Ok(None)` when the timeout expired with nothing ready.
/// `EINTR` is returned as an error; retrying is the caller's decision.
pub(crate) fn sys_select(
    fd: RawFd,
    interest: Interest,
    timeout: Duration,
) -> io::Result<Option<Readiness>> {
    if fd < 0 || fd as usize >= FD_SETSIZE as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "descriptor does not fit in an fd_set",
        ));
    }

    let mut read_set: fd_set = unsafe { mem::zeroed() };
    let mut write_set: fd_set = unsafe { mem::zeroed() };

    unsafe {
        FD_ZERO(&mut read_set);
        FD_ZERO(&mut write_set);

        if interest.read {
            FD_SET(fd, &mut read_set);
        }
        if interest.write {
            FD_SET(fd, &mut write_set);
        }
    }

    // Rounded up so the kernel never sleeps less than asked.
    let micros = timeout.as_nanos().div_ceil(1_000);
    let mut tv = timeval {
        tv_sec: (micros / 1_000_000).min(time_t::MAX as u128) as time_t,
        tv_usec: (micros % 1_000_000) as suseconds_t,
    };

    let rc = unsafe { select(fd + 1, &mut read_set, &mut write_set, ptr::null_mut(), &mut tv) };

    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    if rc == 0 {
        return Ok(None);
    }

    let readiness = unsafe {
        Readiness {
            readable: FD_ISSET(fd, &read_set),
            writable: FD_ISSET(fd, &write_set),
            error: false,
        }
    };

    Ok(Some(readiness))
}

/// Waits on a single descriptor with `poll(2)`.
///
/// Returns `Ok(None)` when the timeout expired with nothing ready.
pub(crate) fn sys_poll(
    fd: RawFd,
    interest: Interest,
    timeout: Duration,
) -> io::Result<Option<Readiness>> {
    let mut events: c_short = 0;

    if interest.read {
        events |= POLLIN;
    }
    if interest.write {
        events |= POLLOUT;
    }

    let mut entry = pollfd {
        fd,
        events,
        revents: 0,
    };

    let timeout_ms = timeout
        .as_nanos()
        .div_ceil(1_000_000)
        .min(c_int::MAX as u128) as c_int;

    let rc = unsafe { poll(&mut entry, 1 as nfds_t, timeout_ms) };

    if rc < 0 {
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

/// Converts an IPv4 `SocketAddrV4` to a `sockaddr_in`.
fn socketaddr_to_sockaddr_in(addr: &SocketAddrV4) -> (sockaddr_in, socklen_t) {
    let mut sa: sockaddr_in = unsafe { mem::zeroed() };

    sa.sin_family = AF_INET as _;
    sa.sin_port = addr.port().to_be();
    sa.sin_addr.s_addr = u32::from(*addr.ip()).to_be();

    (sa, mem::size_of::<sockaddr_in>() as socklen_t)
}
