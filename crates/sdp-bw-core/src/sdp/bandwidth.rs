// RTCP bandwidth defaults (RFC 3556)
//
// When a media entry does not carry b=RS / b=RR, RTCP gets 5% of the
// application bandwidth, split 25% to senders and 75% to receivers.
// Both results are capped whether they were derived or given explicitly.

use serde::Serialize;

use crate::sdp::types::MediaEntry;

/// Share of the application bandwidth given to RTCP, in percent
pub const RTCP_SHARE_PERCENT: u64 = 5;

/// Share of the RTCP bandwidth given to senders, in percent
pub const RTCP_SENDER_SHARE_PERCENT: u64 = 25;

/// Share of the RTCP bandwidth given to receivers, in percent
pub const RTCP_RECEIVER_SHARE_PERCENT: u64 = 75;

/// Ceiling for the RTCP sender bandwidth, bps
pub const MAX_RTCP_SEND_BPS: u32 = 4000;

/// Ceiling for the RTCP receiver bandwidth, bps
pub const MAX_RTCP_RECEIVE_BPS: u32 = 5000;

/// Concrete RTCP bandwidth of a media entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RtcpBandwidth {
    pub send_bps: u32,
    pub receive_bps: u32,
}

/// Total RTCP bandwidth implied by an application bandwidth, bps
pub fn rtcp_total_bps(application_kbps: u32) -> u64 {
    u64::from(application_kbps) * 1000 * RTCP_SHARE_PERCENT / 100
}

/// Compute the RTCP bandwidth for the given inputs
///
/// Unspecified values are derived from `application_kbps`; explicit ones
/// are kept. The ceilings apply to both.
pub fn resolve_rtcp(
    application_kbps: u32,
    send_bps: Option<u32>,
    receive_bps: Option<u32>,
) -> RtcpBandwidth {
    let total = rtcp_total_bps(application_kbps);

    let send = send_bps
        .map(u64::from)
        .unwrap_or(total * RTCP_SENDER_SHARE_PERCENT / 100);
    let receive = receive_bps
        .map(u64::from)
        .unwrap_or(total * RTCP_RECEIVER_SHARE_PERCENT / 100);

    RtcpBandwidth {
        send_bps: send.min(u64::from(MAX_RTCP_SEND_BPS)) as u32,
        receive_bps: receive.min(u64::from(MAX_RTCP_RECEIVE_BPS)) as u32,
    }
}

impl MediaEntry {
    /// Replace unspecified RTCP values with concrete, clamped ones
    ///
    /// Idempotent: once resolved, both fields are set and within the
    /// ceilings, so a second call changes nothing.
    pub fn resolve_rtcp(&mut self) -> RtcpBandwidth {
        let resolved = resolve_rtcp(
            self.application_bandwidth_kbps,
            self.rtcp_send_bps,
            self.rtcp_receive_bps,
        );
        self.rtcp_send_bps = Some(resolved.send_bps);
        self.rtcp_receive_bps = Some(resolved.receive_bps);
        resolved
    }

    /// Whether both RTCP values are concrete
    pub fn is_rtcp_resolved(&self) -> bool {
        self.rtcp_send_bps.is_some() && self.rtcp_receive_bps.is_some()
    }
}
