//! File open flags

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::{H5Error, Result};

/// How `File::open` treats the path.
///
/// Flags combine with `|`; the combination is checked when the file is
/// opened.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpenFlags(u32);

impl OpenFlags {
    /// Open an existing file for reading
    pub const READ_ONLY: Self = Self(0);
    /// Open an existing file for reading and writing
    pub const READ_WRITE: Self = Self(1);
    /// Discard any existing contents
    pub const TRUNCATE: Self = Self(1 << 1);
    /// Fail if the file already exists
    pub const EXCL: Self = Self(1 << 2);
    /// Create the file if it does not exist
    pub const CREATE: Self = Self(1 << 3);
    /// Same as `TRUNCATE`
    pub const OVERWRITE: Self = Self::TRUNCATE;
    /// `READ_WRITE | CREATE`
    pub const OPEN_OR_CREATE: Self = Self(Self::READ_WRITE.0 | Self::CREATE.0);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if every flag in `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if the flags ask for write access
    pub const fn is_writable(self) -> bool {
        self.0 != 0
    }

    /// Reject contradictory combinations
    pub fn validate(self) -> Result<()> {
        if self.contains(Self::TRUNCATE) && self.contains(Self::EXCL) {
            return Err(H5Error::InvalidFlags(
                "TRUNCATE and EXCL are mutually exclusive".to_string(),
            ));
        }
        if self.contains(Self::TRUNCATE)
            && !self.contains(Self::CREATE)
            && !self.contains(Self::READ_WRITE)
        {
            return Err(H5Error::InvalidFlags(
                "TRUNCATE requires CREATE or READ_WRITE".to_string(),
            ));
        }
        Ok(())
    }
}

impl BitOr for OpenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for OpenFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for OpenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(OpenFlags, &str); 4] = [
            (OpenFlags::READ_WRITE, "READ_WRITE"),
            (OpenFlags::TRUNCATE, "TRUNCATE"),
            (OpenFlags::EXCL, "EXCL"),
            (OpenFlags::CREATE, "CREATE"),
        ];

        let set: Vec<_> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            f.write_str("READ_ONLY")
        } else {
            f.write_str(&set.join(" | "))
        }
    }
}
