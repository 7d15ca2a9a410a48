//! # SDP-BW Core: Offer/Answer Bandwidth Permits
//!
//! Derives directional bandwidth permit rules from an SDP offer/answer
//! exchange.
//!
//! ## Pipeline
//!
//! - **Parsing** ([`sdp::parser`]): `c=IN IP6`, `m=` and `b=AS/RS/RR`
//!   lines; session-level values seed media entries created after them
//! - **RTCP defaults** ([`sdp::bandwidth`]): 5% of the application
//!   bandwidth split 25/75 between senders and receivers, capped at
//!   4000 / 5000 bps
//! - **Matching** ([`negotiate`]): positional offer/answer pairing; pairs
//!   with a zero port on either side are rejected
//! - **Rendering** ([`emit`]): `permit ...` lines and uplink totals
//!
//! ## Usage
//!
//! ```rust
//! use sdp_bw_core::{Config, negotiate_documents};
//!
//! let offer = "c=IN IP6 2001:db8::1\nb=AS:64\nm=audio 5004 RTP/AVP 0\n";
//! let answer = "c=IN IP6 2001:db8::2\nb=AS:32\nm=audio 6004 RTP/AVP 0\n";
//!
//! let report = negotiate_documents(offer, answer, &Config::default())?;
//! assert_eq!(report.negotiation.flows.len(), 4);
//! assert_eq!(
//!     report.negotiation.flows[0].to_string(),
//!     "permit 64kbps from 2001:db8::1 5004 to 2001:db8::2 6004"
//! );
//! # Ok::<(), sdp_bw_core::Error>(())
//! ```

pub mod config;
pub mod emit;
pub mod error;
pub mod negotiate;
pub mod sdp;

use std::path::Path;

use serde::Serialize;

pub use config::{AddressScope, Config, LongLinePolicy, MatcherConfig, ParserConfig};
pub use error::{Error, MediaCountMismatch, ParseWarning, Result};
pub use negotiate::{
    BandwidthUnit, Endpoint, FlowDescriptor, FlowDirection, FlowKind, Negotiation, UplinkTotal,
    negotiate,
};
pub use sdp::parser::{ParsedDocument, parse_document, read_document};
pub use sdp::{MediaEntry, RtcpBandwidth, SessionDocument, resolve_rtcp};

/// Both parsed documents and the outcome of matching them
///
/// The documents are kept after matching, so accepted entries show their
/// resolved RTCP bandwidth.
#[derive(Debug, Clone, Serialize)]
pub struct NegotiationReport {
    pub offer: ParsedDocument,
    pub answer: ParsedDocument,
    pub negotiation: Negotiation,
}

impl NegotiationReport {
    fn build(mut offer: ParsedDocument, mut answer: ParsedDocument, config: &Config) -> Self {
        let negotiation = negotiate(&mut offer.document, &mut answer.document, &config.matcher);
        NegotiationReport {
            offer,
            answer,
            negotiation,
        }
    }

    /// Number of recoverable problems seen across parsing and matching
    pub fn warning_count(&self) -> usize {
        self.offer.warnings.len()
            + self.answer.warnings.len()
            + usize::from(self.negotiation.mismatch.is_some())
    }
}

/// Parse two in-memory documents and match them
pub fn negotiate_documents(offer: &str, answer: &str, config: &Config) -> Result<NegotiationReport> {
    config.validate()?;
    let offer = parse_document(offer, &config.parser)?;
    let answer = parse_document(answer, &config.parser)?;
    Ok(NegotiationReport::build(offer, answer, config))
}

/// Read two documents from disk and match them
///
/// The offer is read completely before the answer is opened.
pub fn negotiate_files(
    offer: impl AsRef<Path>,
    answer: impl AsRef<Path>,
    config: &Config,
) -> Result<NegotiationReport> {
    config.validate()?;
    let offer = read_document(offer, &config.parser)?;
    let answer = read_document(answer, &config.parser)?;
    Ok(NegotiationReport::build(offer, answer, config))
}
