// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! IPv4 CIDR blocks.

use crate::errors::CloudError;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 network in CIDR notation.
///
/// The host bits of the parsed address are masked off, so `10.255.255.255/8`
/// and `10.0.0.0/8` are the same block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Cidr {
    /// Parse `a.b.c.d/n`, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::InvalidCidr`] if the address or prefix is malformed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use managed_api_verify::gcp::Ipv4Cidr;
    ///
    /// let block = Ipv4Cidr::parse("10.255.255.255/8").unwrap();
    /// assert_eq!(block.to_string(), "10.0.0.0/8");
    /// ```
    pub fn parse(value: &str) -> Result<Self, CloudError> {
        let invalid = |reason: &str| CloudError::InvalidCidr {
            cidr: value.to_string(),
            reason: reason.to_string(),
        };

        let (addr, prefix) = value
            .trim()
            .split_once('/')
            .ok_or_else(|| invalid("missing prefix length"))?;
        let addr = Ipv4Addr::from_str(addr).map_err(|e| invalid(&e.to_string()))?;
        let prefix_len: u8 = prefix
            .parse()
            .map_err(|_| invalid("prefix length is not a number"))?;
        if prefix_len > 32 {
            return Err(invalid("prefix length must be at most 32"));
        }

        Ok(Self {
            network: Ipv4Addr::from(u32::from(addr) & mask(prefix_len)),
            prefix_len,
        })
    }

    #[must_use]
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    #[must_use]
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Whether `other` lies entirely within this block.
    #[must_use]
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.prefix_len >= self.prefix_len
            && u32::from(other.network) & mask(self.prefix_len) == u32::from(self.network)
    }
}

fn mask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n => u32::MAX << (32 - u32::from(n)),
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "cidr_tests.rs"]
mod cidr_tests;
