//! Session Description Protocol support
//!
//! A deliberately narrow SDP reader: it tracks the connection address,
//! the media descriptions and the `AS`/`RS`/`RR` bandwidth modifiers, and
//! ignores everything else.

pub mod bandwidth;
pub mod parser;
pub mod types;

pub use bandwidth::{RtcpBandwidth, resolve_rtcp, rtcp_total_bps};
pub use types::{BandwidthModifier, MediaEntry, SessionDocument};
