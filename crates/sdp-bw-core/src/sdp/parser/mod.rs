//! SDP parsing
//!
//! [`line_parser`] classifies single lines; [`document`] applies the
//! session/media scoping rules over a whole document.

pub mod document;
pub mod line_parser;

pub use document::{DocumentParser, ParsedDocument, parse_document, read_document};
pub use line_parser::{
    MediaLine, PortField, SdpLine, classify_line, parse_bandwidth_modifier,
    parse_bandwidth_value, parse_connection_address, parse_media_line,
};
