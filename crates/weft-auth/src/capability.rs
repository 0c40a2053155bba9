//! Registry capability bitset.
//!
//! Each registry operation is gated by exactly one bit. Two derived
//! groups cover the common grants:
//!
//! ```text
//! READ  = EXISTS | GET
//! WRITE = REGISTER | REGISTERREF | SET | SETREF | UNREGISTER
//! ```
//!
//! `GETREF` is deliberately outside `READ`: handing out a live alias to
//! internal state is a stronger grant than handing out a copy.
//!
//! An empty mask pre-grants nothing; every call must then come from the
//! owner.
//!
//! # Example
//!
//! ```
//! use weft_auth::Capability;
//!
//! let shared_readonly = Capability::READ;
//! assert!(shared_readonly.contains(Capability::GET));
//! assert!(!shared_readonly.contains(Capability::GETREF));
//! assert!(!shared_readonly.intersects(Capability::WRITE));
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Operations a non-owner caller may perform on a registry.
    ///
    /// | Capability | Operation |
    /// |------------|-----------|
    /// | [`EXISTS`](Self::EXISTS) | `exists` |
    /// | [`GET`](Self::GET) | `get` |
    /// | [`GETREF`](Self::GETREF) | `get_ref` |
    /// | [`REGISTER`](Self::REGISTER) | `register` |
    /// | [`REGISTERREF`](Self::REGISTERREF) | `register_ref` |
    /// | [`SET`](Self::SET) | `set` |
    /// | [`SETREF`](Self::SETREF) | `set_ref` |
    /// | [`UNREGISTER`](Self::UNREGISTER) | `unregister` |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capability: u16 {
        const EXISTS      = 0b0000_0001;
        const GET         = 0b0000_0010;
        const GETREF      = 0b0000_0100;
        const REGISTER    = 0b0000_1000;
        const REGISTERREF = 0b0001_0000;
        const SET         = 0b0010_0000;
        const SETREF      = 0b0100_0000;
        const UNREGISTER  = 0b1000_0000;
    }
}

impl Capability {
    /// Read access by value: EXISTS | GET.
    pub const READ: Self = Self::EXISTS.union(Self::GET);

    /// Every mutating operation.
    pub const WRITE: Self = Self::REGISTER
        .union(Self::REGISTERREF)
        .union(Self::SET)
        .union(Self::SETREF)
        .union(Self::UNREGISTER);

    /// All capabilities.
    pub const ALL: Self = Self::READ.union(Self::GETREF).union(Self::WRITE);

    /// Builds a mask from raw bits, rejecting unknown bits.
    ///
    /// Unlike [`from_bits_truncate`](Self::from_bits_truncate), a value
    /// with stray bits is treated as malformed rather than silently
    /// narrowed.
    ///
    /// ```
    /// use weft_auth::Capability;
    ///
    /// assert_eq!(Capability::from_raw(0b11), Some(Capability::READ));
    /// assert_eq!(Capability::from_raw(0x100), None);
    /// ```
    #[must_use]
    pub fn from_raw(bits: u16) -> Option<Self> {
        Self::from_bits(bits)
    }

    /// Returns the capabilities in `required` that this mask lacks.
    #[must_use]
    pub fn missing(self, required: Self) -> Self {
        required - self
    }

    /// Returns a human-readable list of the single-bit names present.
    ///
    /// ```
    /// use weft_auth::Capability;
    ///
    /// assert_eq!(Capability::READ.names(), vec!["EXISTS", "GET"]);
    /// ```
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }

    /// Parses a capability or group name (case-insensitive).
    ///
    /// Accepts the single bits, the `READ`/`WRITE`/`ALL` groups, `NONE`,
    /// and underscore spellings such as `GET_REF`.
    ///
    /// ```
    /// use weft_auth::Capability;
    ///
    /// assert_eq!(Capability::parse("get"), Some(Capability::GET));
    /// assert_eq!(Capability::parse("set_ref"), Some(Capability::SETREF));
    /// assert_eq!(Capability::parse("read"), Some(Capability::READ));
    /// assert_eq!(Capability::parse("bogus"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().replace('_', "").as_str() {
            "EXISTS" => Some(Self::EXISTS),
            "GET" => Some(Self::GET),
            "GETREF" => Some(Self::GETREF),
            "REGISTER" => Some(Self::REGISTER),
            "REGISTERREF" => Some(Self::REGISTERREF),
            "SET" => Some(Self::SET),
            "SETREF" => Some(Self::SETREF),
            "UNREGISTER" => Some(Self::UNREGISTER),
            "READ" => Some(Self::READ),
            "WRITE" => Some(Self::WRITE),
            "ALL" => Some(Self::ALL),
            "NONE" => Some(Self::empty()),
            _ => None,
        }
    }

    /// Parses a list of names into a combined mask.
    ///
    /// Returns the combined mask and the names that were not recognized.
    #[must_use]
    pub fn parse_list<'a>(names: &[&'a str]) -> (Self, Vec<&'a str>) {
        let mut caps = Self::empty();
        let mut unknown = Vec::new();
        for name in names {
            match Self::parse(name) {
                Some(c) => caps |= c,
                None => unknown.push(*name),
            }
        }
        (caps, unknown)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}
