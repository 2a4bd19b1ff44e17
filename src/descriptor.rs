// src/descriptor.rs

//! Borrowed references to the things that can be polled.

use std::fs::File;
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::{UnixListener, UnixStream};

/// A socket or file handle, reduced to its native descriptor.
///
/// The crate never opens, closes or duplicates these. Whoever built the
/// `Descriptor` must keep the underlying handle open for as long as a poll
/// or pollset refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Descriptor {
    Socket(RawFd),
    File(RawFd),
}

impl Descriptor {
    pub fn socket<S: AsRawFd + ?Sized>(socket: &S) -> Self {
        Descriptor::Socket(socket.as_raw_fd())
    }

    pub fn file<F: AsRawFd + ?Sized>(file: &F) -> Self {
        Descriptor::File(file.as_raw_fd())
    }

    /// The native descriptor the kernel sees.
    pub fn raw_fd(&self) -> RawFd {
        match *self {
            Descriptor::Socket(fd) | Descriptor::File(fd) => fd,
        }
    }

    pub fn is_socket(&self) -> bool {
        matches!(self, Descriptor::Socket(_))
    }
}

impl From<&File> for Descriptor {
    fn from(file: &File) -> Self {
        Descriptor::file(file)
    }
}

macro_rules! socket_descriptor {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<&$ty> for Descriptor {
                fn from(socket: &$ty) -> Self {
                    Descriptor::socket(socket)
                }
            }
        )*
    };
}

socket_descriptor!(TcpStream, TcpListener, UdpSocket, UnixStream, UnixListener);
