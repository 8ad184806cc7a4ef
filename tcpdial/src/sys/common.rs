/// Readiness the caller wants to be notified about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interest {
    pub read: bool,
    pub write: bool,
}

impl Interest {
    /// Read and write readiness, the interest of a pending connect.
    pub const BOTH: Interest = Interest {
        read: true,
        write: true,
    };

    pub const READ: Interest = Interest {
        read: true,
        write: false,
    };

    pub const WRITE: Interest = Interest {
        read: false,
        write: true,
    };
}

/// Readiness reported by a wait backend for a single descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Readiness {
    /// The descriptor is readable (or has reached end of stream).
    pub readable: bool,

    /// The descriptor is writable.
    pub writable: bool,

    /// The backend flagged an error or hang-up condition.
    pub error: bool,
}

impl Readiness {
    /// Returns `true` if any bit fired.
    pub fn any(&self) -> bool {
        self.readable || self.writable || self.error
    }
}
