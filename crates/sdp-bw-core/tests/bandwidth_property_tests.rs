// Property tests for RTCP resolution, inheritance and positional matching

use proptest::prelude::*;
use sdp_bw_core::sdp::bandwidth::{MAX_RTCP_RECEIVE_BPS, MAX_RTCP_SEND_BPS};
use sdp_bw_core::{
    MatcherConfig, MediaEntry, ParserConfig, SessionDocument, negotiate, resolve_rtcp,
};

proptest! {
    /// Unspecified RTCP values follow the 5% / 25% / 75% formula with caps.
    #[test]
    fn rtcp_defaults_follow_formula(a in 0u32..1_000_000) {
        let a64 = u64::from(a);
        let rtcp = resolve_rtcp(a, None, None);
        prop_assert_eq!(u64::from(rtcp.send_bps), (a64 * 1000 * 5 / 100 * 25 / 100).min(4000));
        prop_assert_eq!(u64::from(rtcp.receive_bps), (a64 * 1000 * 5 / 100 * 75 / 100).min(5000));
    }

    /// Explicit values are kept unless above the ceiling.
    #[test]
    fn explicit_values_are_only_clamped(
        a in 0u32..100_000,
        rs in any::<u32>(),
        rr in any::<u32>(),
    ) {
        let rtcp = resolve_rtcp(a, Some(rs), Some(rr));
        prop_assert_eq!(rtcp.send_bps, rs.min(MAX_RTCP_SEND_BPS));
        prop_assert_eq!(rtcp.receive_bps, rr.min(MAX_RTCP_RECEIVE_BPS));
    }

    /// Resolving an entry twice gives the same entry.
    #[test]
    fn resolution_is_idempotent(
        a in any::<u32>(),
        rs in proptest::option::of(any::<u32>()),
        rr in proptest::option::of(any::<u32>()),
    ) {
        let mut media = MediaEntry::new("audio", 5004);
        media.application_bandwidth_kbps = a;
        media.rtcp_send_bps = rs;
        media.rtcp_receive_bps = rr;

        let first = media.resolve_rtcp();
        let once = media.clone();
        let second = media.resolve_rtcp();
        prop_assert_eq!(first, second);
        prop_assert_eq!(media, once);
    }

    /// Session values before the first m= reach every entry that does not
    /// override them.
    #[test]
    fn session_values_are_inherited(
        session_as in 0u32..10_000,
        overrides in proptest::collection::vec(proptest::option::of(0u32..10_000), 1..=8),
    ) {
        let mut text = format!("c=IN IP6 2001:db8::1\nb=AS:{}\n", session_as);
        for (i, value) in overrides.iter().enumerate() {
            text.push_str(&format!("m=audio {}\n", 5000 + 2 * i));
            if let Some(v) = value {
                text.push_str(&format!("b=AS:{}\n", v));
            }
        }

        let doc = SessionDocument::parse_str(&text, &ParserConfig::default()).unwrap();
        prop_assert_eq!(doc.media_count(), overrides.len());
        prop_assert_eq!(doc.session_application_bandwidth_kbps, session_as);
        for (media, value) in doc.media().iter().zip(&overrides) {
            prop_assert_eq!(media.application_bandwidth_kbps, value.unwrap_or(session_as));
            prop_assert_eq!(media.connection_address.as_str(), "2001:db8::1");
        }
    }

    /// Matching is positional, truncates to the shorter side, and yields
    /// four flows for every pair with two non-zero ports.
    #[test]
    fn matching_is_positional(
        offer_ports in proptest::collection::vec(prop_oneof![Just(0u16), 1u16..65535], 0..=8),
        answer_ports in proptest::collection::vec(prop_oneof![Just(0u16), 1u16..65535], 0..=8),
    ) {
        let build = |ports: &[u16]| {
            let mut text = String::from("b=AS:64\n");
            for port in ports {
                text.push_str(&format!("m=audio {}\n", port));
            }
            SessionDocument::parse_str(&text, &ParserConfig::default()).unwrap()
        };
        let mut offer = build(&offer_ports[..]);
        let mut answer = build(&answer_ports[..]);

        let result = negotiate(&mut offer, &mut answer, &MatcherConfig::default());

        let accepted: Vec<usize> = offer_ports
            .iter()
            .zip(&answer_ports)
            .enumerate()
            .filter(|(_, (o, a))| **o > 0 && **a > 0)
            .map(|(i, _)| i)
            .collect();

        prop_assert_eq!(result.accepted_pairs, accepted.len());
        prop_assert_eq!(
            result.accepted_pairs + result.rejected_pairs,
            offer_ports.len().min(answer_ports.len())
        );
        prop_assert_eq!(result.flows.len(), 4 * accepted.len());
        prop_assert_eq!(result.mismatch.is_some(), offer_ports.len() != answer_ports.len());

        let expected_pairs: Vec<usize> = accepted.iter().flat_map(|i| [*i; 4]).collect();
        let actual_pairs: Vec<usize> = result.flows.iter().map(|f| f.pair_index).collect();
        prop_assert_eq!(actual_pairs, expected_pairs);

        // 64 kbps plus 0.8 kbps of RTCP per accepted pair on the offer side
        let expected_total = 64.8 * accepted.len() as f64;
        prop_assert!((result.offer_uplink.kbps - expected_total).abs() < 1e-6);
    }
}
