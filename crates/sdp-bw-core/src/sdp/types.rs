// SDP document model
//
// Session-level state plus the ordered media entries of one parsed document.

use serde::Serialize;

use crate::error::{Error, Result};

/// Longest media type token kept from an `m=` line
pub const MAX_MEDIA_TYPE_LEN: usize = 15;

/// Longest address token kept from a `c=` line
pub const MAX_ADDRESS_LEN: usize = 63;

/// The three bandwidth modifiers the parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BandwidthModifier {
    /// `b=AS:` application specific, kbps
    As,
    /// `b=RS:` RTCP senders, bps
    Rs,
    /// `b=RR:` RTCP receivers, bps
    Rr,
}

impl BandwidthModifier {
    /// The modifier name as it appears after `b=`
    pub fn as_str(&self) -> &'static str {
        match self {
            BandwidthModifier::As => "AS",
            BandwidthModifier::Rs => "RS",
            BandwidthModifier::Rr => "RR",
        }
    }
}

/// One negotiated media stream (one `m=` line and the lines that follow it)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaEntry {
    /// Connection address, seeded from the session address
    pub connection_address: String,
    /// Transport port; 0 means rejected
    pub port: u16,
    /// Media type token, e.g. "audio"
    pub media_type: String,
    /// Application bandwidth in kbps
    pub application_bandwidth_kbps: u32,
    /// RTCP sender bandwidth in bps, `None` until specified or resolved
    pub rtcp_send_bps: Option<u32>,
    /// RTCP receiver bandwidth in bps, `None` until specified or resolved
    pub rtcp_receive_bps: Option<u32>,
    valid: bool,
}

impl MediaEntry {
    /// Create an entry with no bandwidth information
    pub fn new(media_type: impl Into<String>, port: u16) -> Self {
        MediaEntry {
            connection_address: String::new(),
            port,
            media_type: media_type.into(),
            application_bandwidth_kbps: 0,
            rtcp_send_bps: None,
            rtcp_receive_bps: None,
            valid: true,
        }
    }

    /// Whether the entry is usable; set on creation
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the port marks the stream as rejected
    pub fn is_rejected(&self) -> bool {
        self.port == 0
    }

    pub(crate) fn set_bandwidth(&mut self, modifier: BandwidthModifier, value: u32) {
        match modifier {
            BandwidthModifier::As => self.application_bandwidth_kbps = value,
            BandwidthModifier::Rs => self.rtcp_send_bps = Some(value),
            BandwidthModifier::Rr => self.rtcp_receive_bps = Some(value),
        }
    }
}

/// A parsed session description
///
/// Session-level values act as defaults for media entries created after
/// them. Media entries are kept in the order they appeared, which is the
/// order used for offer/answer matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionDocument {
    /// Session-level connection address, empty if none was given
    pub session_address: String,
    /// Session-level application bandwidth in kbps
    pub session_application_bandwidth_kbps: u32,
    /// Session-level RTCP sender bandwidth in bps
    pub session_rtcp_send_bps: Option<u32>,
    /// Session-level RTCP receiver bandwidth in bps
    pub session_rtcp_receive_bps: Option<u32>,
    media_entries: Vec<MediaEntry>,
}

impl SessionDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Media entries in appearance order
    pub fn media(&self) -> &[MediaEntry] {
        &self.media_entries
    }

    /// Mutable access to the media entries
    pub fn media_mut(&mut self) -> &mut [MediaEntry] {
        &mut self.media_entries
    }

    /// Number of media entries
    pub fn media_count(&self) -> usize {
        self.media_entries.len()
    }

    /// The most recently opened media entry, if any
    pub fn current_media_mut(&mut self) -> Option<&mut MediaEntry> {
        self.media_entries.last_mut()
    }

    /// Open a new media entry seeded from the current session state
    ///
    /// The entry copies the session address and the session bandwidth
    /// values as they are now; session lines parsed later never reach it.
    /// Fails with [`Error::CapacityExceeded`] once `limit` entries exist.
    pub fn open_media(
        &mut self,
        media_type: impl Into<String>,
        port: u16,
        limit: usize,
    ) -> Result<&mut MediaEntry> {
        if self.media_entries.len() >= limit {
            return Err(Error::CapacityExceeded { limit });
        }

        let mut entry = MediaEntry::new(media_type, port);
        entry.application_bandwidth_kbps = self.session_application_bandwidth_kbps;
        entry.rtcp_send_bps = self.session_rtcp_send_bps;
        entry.rtcp_receive_bps = self.session_rtcp_receive_bps;
        entry.connection_address = self.session_address.clone();

        self.media_entries.push(entry);
        let last = self.media_entries.len() - 1;
        Ok(&mut self.media_entries[last])
    }

    pub(crate) fn set_session_bandwidth(&mut self, modifier: BandwidthModifier, value: u32) {
        match modifier {
            BandwidthModifier::As => self.session_application_bandwidth_kbps = value,
            BandwidthModifier::Rs => self.session_rtcp_send_bps = Some(value),
            BandwidthModifier::Rr => self.session_rtcp_receive_bps = Some(value),
        }
    }
}
