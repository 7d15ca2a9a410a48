//! SDP line classification
//!
//! Only four line classes matter for bandwidth negotiation, recognised by
//! prefix with the first match winning:
//! - `c=IN IP6 <address>` (Connection Information)
//! - `m=<media> <port> ...` (Media Description)
//! - `b=AS:<kbps>`, `b=RS:<bps>`, `b=RR:<bps>` (Bandwidth, RFC 8866 / RFC 3556)
//!
//! Every other line is [`SdpLine::Ignored`]. A `c=` line that is not an
//! `IN IP6` address is ignored as well.
//!
//! This module uses the `nom` parser combinator library for the individual
//! line grammars.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{digit1, one_of, space0, space1},
    combinator::{opt, recognize, value},
    sequence::{pair, preceded, tuple},
};

use crate::sdp::types::{BandwidthModifier, MAX_ADDRESS_LEN, MAX_MEDIA_TYPE_LEN};

/// A classified SDP line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdpLine<'a> {
    /// `c=IN IP6 <address>`
    Connection(&'a str),
    /// `m=` line
    Media(MediaLine<'a>),
    /// `b=AS:`, `b=RS:` or `b=RR:` with a usable value
    Bandwidth(BandwidthModifier, u32),
    /// A recognised bandwidth modifier whose value is not an unsigned integer
    MalformedBandwidth(BandwidthModifier),
    /// Anything else
    Ignored,
}

/// The fields of an `m=` line that matter here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLine<'a> {
    pub media_type: &'a str,
    pub port: PortField<'a>,
}

/// The port token of an `m=` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortField<'a> {
    /// No numeric port token
    Missing,
    /// A port within 0..=65535
    Valid(u16),
    /// A number outside 0..=65535, kept as written
    OutOfRange(&'a str),
}

fn token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

fn signed_digits(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(one_of("+-")), digit1))(input)
}

/// Cut `s` to at most `max` characters
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Parse the address of a `c=IN IP6 <address>` line
///
/// # Examples
///
/// ```
/// use sdp_bw_core::sdp::parser::parse_connection_address;
///
/// let (_, addr) = parse_connection_address("c=IN IP6 2001:db8::1").unwrap();
/// assert_eq!(addr, "2001:db8::1");
///
/// assert!(parse_connection_address("c=IN IP4 192.0.2.1").is_err());
/// ```
pub fn parse_connection_address(input: &str) -> IResult<&str, &str> {
    let (input, _) = tuple((tag("c=IN"), space1, tag("IP6"), space1))(input)?;
    token(input)
}

/// Parse the media type and port of an `m=` line
///
/// Both fields are optional; a bare `m=` yields an empty type and a
/// missing port. Anything after the port token is left unparsed.
pub fn parse_media_line(input: &str) -> IResult<&str, MediaLine<'_>> {
    let (input, _) = tag("m=")(input)?;
    let (input, _) = space0(input)?;
    let (input, media_type) = opt(token)(input)?;

    let Some(media_type) = media_type else {
        return Ok((
            input,
            MediaLine {
                media_type: "",
                port: PortField::Missing,
            },
        ));
    };

    // The port is the next whole token even when the type is cut below;
    // the tail of an over-long type is never read as the port.
    let (input, port) = opt(preceded(space1, signed_digits))(input)?;
    let port = match port {
        Some(digits) => port_field(digits),
        None => PortField::Missing,
    };

    Ok((
        input,
        MediaLine {
            media_type: truncate_chars(media_type, MAX_MEDIA_TYPE_LEN),
            port,
        },
    ))
}

fn port_field(digits: &str) -> PortField<'_> {
    match digits.parse::<i64>() {
        Ok(port) => u16::try_from(port)
            .map(PortField::Valid)
            .unwrap_or(PortField::OutOfRange(digits)),
        // Does not even fit in 64 bits
        Err(_) => PortField::OutOfRange(digits),
    }
}

/// Parse the modifier of a `b=AS:`, `b=RS:` or `b=RR:` line
pub fn parse_bandwidth_modifier(input: &str) -> IResult<&str, BandwidthModifier> {
    alt((
        value(BandwidthModifier::As, tag("b=AS:")),
        value(BandwidthModifier::Rs, tag("b=RS:")),
        value(BandwidthModifier::Rr, tag("b=RR:")),
    ))(input)
}

/// Parse a bandwidth value: optional blanks, then an unsigned 32-bit number
///
/// Trailing text after the digits is accepted and left in the remainder.
pub fn parse_bandwidth_value(input: &str) -> Option<u32> {
    let (_, digits) = preceded(space0, signed_digits)(input).ok()?;
    // u32::from_str rejects the '-' sign and anything past 32 bits
    digits.parse::<u32>().ok()
}

/// Classify one line (terminator already removed)
pub fn classify_line(line: &str) -> SdpLine<'_> {
    if line.starts_with("c=") {
        return match parse_connection_address(line) {
            Ok((_, addr)) => SdpLine::Connection(truncate_chars(addr, MAX_ADDRESS_LEN)),
            Err(_) => SdpLine::Ignored,
        };
    }

    if line.starts_with("m=") {
        return match parse_media_line(line) {
            Ok((_, media)) => SdpLine::Media(media),
            Err(_) => SdpLine::Media(MediaLine {
                media_type: "",
                port: PortField::Missing,
            }),
        };
    }

    if let Ok((rest, modifier)) = parse_bandwidth_modifier(line) {
        return match parse_bandwidth_value(rest) {
            Some(v) => SdpLine::Bandwidth(modifier, v),
            None => SdpLine::MalformedBandwidth(modifier),
        };
    }

    SdpLine::Ignored
}
