// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Listen-address descriptor module
//!
//! This module provides the self-describing `/ip4/<host>/tcp/<port>` listen
//! address notation used to configure HTTP interfaces. The notation is
//! reparseable in both directions: descriptors are consumed when a server is
//! configured and re-emitted after binding, so an ephemeral-port request
//! (`/tcp/0`) resolves to a concrete, connectable descriptor.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    str::FromStr,
};

use thiserror::Error;

/// A parsed listen-address descriptor
///
/// Wraps the socket address a descriptor resolves to, remembering the network
/// family so the descriptor can be re-emitted in the same notation it was
/// parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    addr: SocketAddr,
}

impl Endpoint {
    /// Socket address to bind or dial
    pub fn socket_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Host part of the endpoint
    pub fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    /// Port part of the endpoint; `0` requests an OS-assigned port
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr.ip() {
            IpAddr::V4(ip) => write!(f, "/ip4/{ip}/tcp/{}", self.addr.port()),
            IpAddr::V6(ip) => write!(f, "/ip6/{ip}/tcp/{}", self.addr.port()),
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        if descriptor.is_empty() {
            return Err(EndpointError::Empty);
        }
        let Some(rest) = descriptor.strip_prefix('/') else {
            return Err(EndpointError::MissingLeadingSlash {
                descriptor: descriptor.to_owned(),
            });
        };

        let mut segments = rest.split('/');
        let family = next_segment(&mut segments, descriptor)?;
        let host = next_segment(&mut segments, descriptor)?;
        let transport = next_segment(&mut segments, descriptor)?;
        let port = next_segment(&mut segments, descriptor)?;
        if segments.next().is_some() {
            return Err(EndpointError::TrailingSegments {
                descriptor: descriptor.to_owned(),
            });
        }

        let ip = match family {
            "ip4" => host
                .parse::<Ipv4Addr>()
                .map(IpAddr::V4)
                .map_err(|_| EndpointError::InvalidHost {
                    host: host.to_owned(),
                    family: family.to_owned(),
                })?,
            "ip6" => host
                .parse::<Ipv6Addr>()
                .map(IpAddr::V6)
                .map_err(|_| EndpointError::InvalidHost {
                    host: host.to_owned(),
                    family: family.to_owned(),
                })?,
            other => {
                return Err(EndpointError::UnsupportedFamily {
                    family: other.to_owned(),
                });
            }
        };

        if transport != "tcp" {
            return Err(EndpointError::UnsupportedTransport {
                transport: transport.to_owned(),
            });
        }

        let port = port.parse::<u16>().map_err(|_| EndpointError::InvalidPort {
            port: port.to_owned(),
        })?;

        Ok(Self {
            addr: SocketAddr::new(ip, port),
        })
    }
}

fn next_segment<'a>(
    segments: &mut std::str::Split<'a, char>,
    descriptor: &str,
) -> Result<&'a str, EndpointError> {
    segments.next().ok_or_else(|| EndpointError::Incomplete {
        descriptor: descriptor.to_owned(),
    })
}

/// Failures parsing a listen-address descriptor
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// The descriptor string was empty
    #[error("Listen address is empty")]
    Empty,

    /// Descriptors are absolute paths of the form `/<family>/<host>/tcp/<port>`
    #[error("Listen address `{descriptor}` must start with `/`")]
    MissingLeadingSlash {
        /// Offending descriptor
        descriptor: String,
    },

    /// Fewer segments than `/<family>/<host>/tcp/<port>` requires
    #[error("Listen address `{descriptor}` is incomplete, expected /<family>/<host>/tcp/<port>")]
    Incomplete {
        /// Offending descriptor
        descriptor: String,
    },

    /// More segments than `/<family>/<host>/tcp/<port>` allows
    #[error("Listen address `{descriptor}` has trailing segments")]
    TrailingSegments {
        /// Offending descriptor
        descriptor: String,
    },

    /// Network family other than `ip4` or `ip6`
    #[error("Unsupported network family `{family}`, expected ip4 or ip6")]
    UnsupportedFamily {
        /// Family segment that was not recognized
        family: String,
    },

    /// Host segment does not parse as an address of the declared family
    #[error("Host `{host}` is not a valid {family} address")]
    InvalidHost {
        /// Host segment that failed to parse
        host: String,
        /// Family the host was declared under
        family: String,
    },

    /// Transport other than `tcp`
    #[error("Unsupported transport `{transport}`, expected tcp")]
    UnsupportedTransport {
        /// Transport segment that was not recognized
        transport: String,
    },

    /// Port segment does not parse as a 16-bit port number
    #[error("Port `{port}` is not a valid TCP port")]
    InvalidPort {
        /// Port segment that failed to parse
        port: String,
    },
}
