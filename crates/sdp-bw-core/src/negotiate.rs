//! Offer/answer matching (RFC 3264)
//!
//! Media entries are paired by position. A pair is accepted when both
//! sides have a non-zero port; each accepted pair yields four permit
//! flows and adds to the uplink totals of both parties.
//!
//! Flows for a pair, in order:
//! 1. offer application bandwidth, offer port to answer port (kbps)
//! 2. offer RTCP sender bandwidth, offer port+1 to answer port+1 (bps)
//! 3. answer application bandwidth, answer port to offer port (kbps)
//! 4. answer RTCP receiver bandwidth, answer port+1 to offer port+1 (bps)

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{AddressScope, MatcherConfig};
use crate::error::MediaCountMismatch;
use crate::sdp::types::{MediaEntry, SessionDocument};

/// Which party sends on a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    OfferToAnswer,
    AnswerToOffer,
}

/// What a flow carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Application,
    RtcpSend,
    RtcpReceive,
}

/// Unit of a flow's bandwidth value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BandwidthUnit {
    Kbps,
    Bps,
}

/// An address/port pair
///
/// The port is wider than 16 bits so that the RTCP port of a stream on
/// 65535 is represented as 65536 rather than wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u32,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u32) -> Self {
        Endpoint {
            address: address.into(),
            port,
        }
    }
}

/// One directional permit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowDescriptor {
    /// Position of the media pair this flow belongs to
    pub pair_index: usize,
    pub direction: FlowDirection,
    pub kind: FlowKind,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub value: u32,
    pub unit: BandwidthUnit,
}

/// Aggregate uplink bandwidth of one party
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UplinkTotal {
    pub address: String,
    pub kbps: f64,
}

/// Result of matching an offer against an answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Negotiation {
    pub flows: Vec<FlowDescriptor>,
    pub offer_uplink: UplinkTotal,
    pub answer_uplink: UplinkTotal,
    pub mismatch: Option<MediaCountMismatch>,
    pub accepted_pairs: usize,
    pub rejected_pairs: usize,
}

/// Whether a positional pair survived negotiation
pub fn is_accepted(offer: &MediaEntry, answer: &MediaEntry) -> bool {
    offer.port > 0 && answer.port > 0
}

/// Match `offer` against `answer`
///
/// RTCP bandwidth of both entries of every accepted pair is resolved in
/// place. Entries past the shorter document are ignored; a count mismatch
/// is logged and reported in [`Negotiation::mismatch`].
pub fn negotiate(
    offer: &mut SessionDocument,
    answer: &mut SessionDocument,
    config: &MatcherConfig,
) -> Negotiation {
    let mismatch = if offer.media_count() != answer.media_count() {
        let mismatch = MediaCountMismatch {
            offer: offer.media_count(),
            answer: answer.media_count(),
        };
        warn!("{}", mismatch);
        Some(mismatch)
    } else {
        None
    };

    let offer_session = offer.session_address.clone();
    let answer_session = answer.session_address.clone();

    let mut flows = Vec::new();
    let mut offer_total = 0.0_f64;
    let mut answer_total = 0.0_f64;
    let mut accepted_pairs = 0;
    let mut rejected_pairs = 0;

    let pairs = offer.media_mut().iter_mut().zip(answer.media_mut().iter_mut());
    for (pair_index, (o, a)) in pairs.enumerate() {
        if !is_accepted(o, a) {
            debug!(
                pair = pair_index,
                offer_port = o.port,
                answer_port = a.port,
                "Skipping rejected media pair"
            );
            rejected_pairs += 1;
            continue;
        }

        let o_rtcp = o.resolve_rtcp();
        let a_rtcp = a.resolve_rtcp();

        let (o_addr, a_addr) = match config.address_scope {
            AddressScope::Session => (offer_session.as_str(), answer_session.as_str()),
            AddressScope::Media => (o.connection_address.as_str(), a.connection_address.as_str()),
        };
        let o_port = u32::from(o.port);
        let a_port = u32::from(a.port);

        let flow = |direction: FlowDirection,
                    kind: FlowKind,
                    source: Endpoint,
                    destination: Endpoint,
                    value: u32,
                    unit: BandwidthUnit| {
            FlowDescriptor {
                pair_index,
                direction,
                kind,
                source,
                destination,
                value,
                unit,
            }
        };

        flows.push(flow(
            FlowDirection::OfferToAnswer,
            FlowKind::Application,
            Endpoint::new(o_addr, o_port),
            Endpoint::new(a_addr, a_port),
            o.application_bandwidth_kbps,
            BandwidthUnit::Kbps,
        ));
        flows.push(flow(
            FlowDirection::OfferToAnswer,
            FlowKind::RtcpSend,
            Endpoint::new(o_addr, o_port + 1),
            Endpoint::new(a_addr, a_port + 1),
            o_rtcp.send_bps,
            BandwidthUnit::Bps,
        ));
        flows.push(flow(
            FlowDirection::AnswerToOffer,
            FlowKind::Application,
            Endpoint::new(a_addr, a_port),
            Endpoint::new(o_addr, o_port),
            a.application_bandwidth_kbps,
            BandwidthUnit::Kbps,
        ));
        flows.push(flow(
            FlowDirection::AnswerToOffer,
            FlowKind::RtcpReceive,
            Endpoint::new(a_addr, a_port + 1),
            Endpoint::new(o_addr, o_port + 1),
            a_rtcp.receive_bps,
            BandwidthUnit::Bps,
        ));

        // The answer side counts its receiver share, not its sender share
        offer_total +=
            f64::from(o.application_bandwidth_kbps) + f64::from(o_rtcp.send_bps) / 1000.0;
        answer_total +=
            f64::from(a.application_bandwidth_kbps) + f64::from(a_rtcp.receive_bps) / 1000.0;
        accepted_pairs += 1;
    }

    debug!(
        accepted = accepted_pairs,
        rejected = rejected_pairs,
        flows = flows.len(),
        "Negotiation complete"
    );

    Negotiation {
        flows,
        offer_uplink: UplinkTotal {
            address: offer_session,
            kbps: offer_total,
        },
        answer_uplink: UplinkTotal {
            address: answer_session,
            kbps: answer_total,
        },
        mismatch,
        accepted_pairs,
        rejected_pairs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    fn doc(text: &str) -> SessionDocument {
        SessionDocument::parse_str(text, &ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_single_accepted_pair() {
        let mut offer = doc("c=IN IP6 2001:db8::1\nb=AS:64\nm=audio 5004 RTP/AVP 0\n");
        let mut answer = doc("c=IN IP6 2001:db8::2\nb=AS:32\nm=audio 6004 RTP/AVP 0\n");

        let result = negotiate(&mut offer, &mut answer, &MatcherConfig::default());
        assert_eq!(result.accepted_pairs, 1);
        assert_eq!(result.rejected_pairs, 0);
        assert!(result.mismatch.is_none());
        assert_eq!(result.flows.len(), 4);

        let f = &result.flows[0];
        assert_eq!(f.direction, FlowDirection::OfferToAnswer);
        assert_eq!(f.kind, FlowKind::Application);
        assert_eq!(f.source, Endpoint::new("2001:db8::1", 5004));
        assert_eq!(f.destination, Endpoint::new("2001:db8::2", 6004));
        assert_eq!((f.value, f.unit), (64, BandwidthUnit::Kbps));

        let f = &result.flows[1];
        assert_eq!(f.kind, FlowKind::RtcpSend);
        assert_eq!(f.source.port, 5005);
        assert_eq!(f.destination.port, 6005);
        assert_eq!((f.value, f.unit), (800, BandwidthUnit::Bps));

        let f = &result.flows[2];
        assert_eq!(f.direction, FlowDirection::AnswerToOffer);
        assert_eq!(f.source, Endpoint::new("2001:db8::2", 6004));
        assert_eq!(f.destination, Endpoint::new("2001:db8::1", 5004));
        assert_eq!((f.value, f.unit), (32, BandwidthUnit::Kbps));

        let f = &result.flows[3];
        assert_eq!(f.kind, FlowKind::RtcpReceive);
        assert_eq!(f.source.port, 6005);
        assert_eq!(f.destination.port, 5005);
        assert_eq!((f.value, f.unit), (1200, BandwidthUnit::Bps));

        assert!((result.offer_uplink.kbps - 64.8).abs() < 1e-9);
        assert!((result.answer_uplink.kbps - 33.2).abs() < 1e-9);
        assert_eq!(result.offer_uplink.address, "2001:db8::1");
        assert_eq!(result.answer_uplink.address, "2001:db8::2");
    }

    #[test]
    fn test_rejected_pair_contributes_nothing() {
        let mut offer = doc("b=AS:64\nm=audio 5004\nm=video 0\n");
        let mut answer = doc("b=AS:64\nm=audio 0\nm=video 6006\n");

        let result = negotiate(&mut offer, &mut answer, &MatcherConfig::default());
        assert!(result.flows.is_empty());
        assert_eq!(result.accepted_pairs, 0);
        assert_eq!(result.rejected_pairs, 2);
        assert_eq!(result.offer_uplink.kbps, 0.0);
        assert_eq!(result.answer_uplink.kbps, 0.0);

        // Rejected entries are left unresolved
        assert_eq!(offer.media()[0].rtcp_send_bps, None);
    }

    #[test]
    fn test_count_mismatch_truncates() {
        let mut offer = doc("b=AS:64\nm=audio 5004\nm=video 5006\nm=audio 5008\n");
        let mut answer = doc("b=AS:64\nm=audio 6004\n");

        let result = negotiate(&mut offer, &mut answer, &MatcherConfig::default());
        assert_eq!(result.mismatch, Some(MediaCountMismatch { offer: 3, answer: 1 }));
        assert_eq!(result.accepted_pairs, 1);
        assert_eq!(result.flows.len(), 4);
        assert!(result.flows.iter().all(|f| f.pair_index == 0));
        assert_eq!(offer.media()[1].rtcp_send_bps, None);
    }

    #[test]
    fn test_flows_keep_pair_order() {
        let mut offer = doc("b=AS:10\nm=audio 5004\nm=video 0\nm=video 5008\n");
        let mut answer = doc("b=AS:20\nm=audio 6004\nm=video 6006\nm=video 6008\n");

        let result = negotiate(&mut offer, &mut answer, &MatcherConfig::default());
        let indices: Vec<usize> = result.flows.iter().map(|f| f.pair_index).collect();
        assert_eq!(indices, vec![0, 0, 0, 0, 2, 2, 2, 2]);
        assert_eq!(result.flows[4].source.port, 5008);
    }

    #[test]
    fn test_answer_total_uses_receiver_share() {
        // Answer RS is deliberately large; only its RR counts towards its total
        let mut offer = doc("b=AS:100\nm=audio 5004\n");
        let mut answer = doc("b=AS:100\nb=RS:3000\nb=RR:2000\nm=audio 6004\n");

        let result = negotiate(&mut offer, &mut answer, &MatcherConfig::default());
        assert!((result.answer_uplink.kbps - 102.0).abs() < 1e-9);
        // Offer: 100 kbps -> 5000 bps of RTCP -> 1250 sender share
        assert!((result.offer_uplink.kbps - 101.25).abs() < 1e-9);
    }

    #[test]
    fn test_media_address_scope() {
        let mut offer = doc("c=IN IP6 2001:db8::1\nm=audio 5004\nc=IN IP6 2001:db8::a\n");
        let mut answer = doc("c=IN IP6 2001:db8::2\nm=audio 6004\n");
        let config = MatcherConfig {
            address_scope: AddressScope::Media,
        };

        let result = negotiate(&mut offer.clone(), &mut answer.clone(), &config);
        assert_eq!(result.flows[0].source.address, "2001:db8::a");
        assert_eq!(result.flows[0].destination.address, "2001:db8::2");
        // Totals always name the session address
        assert_eq!(result.offer_uplink.address, "2001:db8::1");

        let result = negotiate(&mut offer, &mut answer, &MatcherConfig::default());
        assert_eq!(result.flows[0].source.address, "2001:db8::1");
    }

    #[test]
    fn test_rtcp_port_of_highest_port_does_not_wrap() {
        let mut offer = doc("m=audio 65535\n");
        let mut answer = doc("m=audio 65535\n");
        let result = negotiate(&mut offer, &mut answer, &MatcherConfig::default());
        assert_eq!(result.flows[1].source.port, 65536);
    }
}
