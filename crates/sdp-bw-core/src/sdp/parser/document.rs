// Document parsing
//
// Drives the line classifier over a whole document and applies the
// session/media scoping rules.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::{LongLinePolicy, ParserConfig};
use crate::error::{Error, ParseWarning, Result};
use crate::sdp::parser::line_parser::{PortField, SdpLine, classify_line, truncate_chars};
use crate::sdp::types::SessionDocument;

/// A parsed document together with the warnings raised while parsing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    pub document: SessionDocument,
    pub warnings: Vec<ParseWarning>,
}

/// Parser state for one document
///
/// Until the first `m=` line every `c=` and `b=` line updates the session.
/// After it, they update the most recently opened media entry.
#[derive(Debug)]
pub struct DocumentParser<'c> {
    config: &'c ParserConfig,
    document: SessionDocument,
    warnings: Vec<ParseWarning>,
    line_number: usize,
    source: Option<&'c Path>,
}

impl<'c> DocumentParser<'c> {
    /// Create a parser using `config`
    pub fn new(config: &'c ParserConfig) -> Self {
        DocumentParser {
            config,
            document: SessionDocument::new(),
            warnings: Vec::new(),
            line_number: 0,
            source: None,
        }
    }

    /// Name `path` as the origin of any warnings
    pub fn with_source(mut self, path: &'c Path) -> Self {
        self.source = Some(path);
        self
    }

    /// Feed one line, with or without its terminator
    pub fn feed_line(&mut self, raw: &str) -> Result<()> {
        self.line_number += 1;
        let line = raw
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(raw);

        let line = self.apply_length_limit(line)?;

        match classify_line(line) {
            SdpLine::Connection(addr) => {
                match self.document.current_media_mut() {
                    Some(media) => media.connection_address = addr.to_string(),
                    None => self.document.session_address = addr.to_string(),
                }
            }
            SdpLine::Media(media_line) => {
                let port = match media_line.port {
                    PortField::Valid(port) => port,
                    PortField::Missing => {
                        debug!(line = self.line_number, "m= line without a port");
                        0
                    }
                    PortField::OutOfRange(port) => {
                        let warning = ParseWarning::PortOutOfRange {
                            document: self.source.map(Path::to_path_buf),
                            line_number: self.line_number,
                            port: port.to_string(),
                        };
                        warn!("{}", warning);
                        self.warnings.push(warning);
                        0
                    }
                };

                let limit = self.config.max_media_entries;
                let media = self.document.open_media(media_line.media_type, port, limit)?;
                trace!(
                    line = self.line_number,
                    media_type = %media.media_type,
                    port = media.port,
                    "Opened media entry"
                );
            }
            SdpLine::Bandwidth(modifier, value) => {
                trace!(
                    line = self.line_number,
                    modifier = modifier.as_str(),
                    value,
                    "Bandwidth line"
                );
                match self.document.current_media_mut() {
                    Some(media) => media.set_bandwidth(modifier, value),
                    None => self.document.set_session_bandwidth(modifier, value),
                }
            }
            SdpLine::MalformedBandwidth(_) => {
                let warning = ParseWarning::InvalidBandwidthValue {
                    document: self.source.map(Path::to_path_buf),
                    line_number: self.line_number,
                    line: line.to_string(),
                };
                warn!("{}", warning);
                self.warnings.push(warning);
            }
            SdpLine::Ignored => {}
        }

        Ok(())
    }

    fn apply_length_limit<'l>(&self, line: &'l str) -> Result<&'l str> {
        let limit = self.config.max_line_length;
        // Byte length is an upper bound on the character count
        if line.len() <= limit {
            return Ok(line);
        }
        let length = line.chars().count();
        if length <= limit {
            return Ok(line);
        }

        match self.config.long_line_policy {
            LongLinePolicy::Truncate => {
                debug!(
                    line = self.line_number,
                    length, limit, "Truncating long line"
                );
                Ok(truncate_chars(line, limit))
            }
            LongLinePolicy::Reject => Err(Error::LineTooLong {
                line_number: self.line_number,
                length,
                limit,
            }),
        }
    }

    /// Finish parsing and hand out the document
    pub fn finish(self) -> ParsedDocument {
        debug!(
            lines = self.line_number,
            media = self.document.media_count(),
            warnings = self.warnings.len(),
            "Parsed session document"
        );
        ParsedDocument {
            document: self.document,
            warnings: self.warnings,
        }
    }
}

/// Parse a document held in memory
pub fn parse_document(text: &str, config: &ParserConfig) -> Result<ParsedDocument> {
    config.validate()?;
    let mut parser = DocumentParser::new(config);
    for line in text.lines() {
        parser.feed_line(line)?;
    }
    Ok(parser.finish())
}

/// Read and parse a document from `path`
///
/// The file is closed when this returns, whether parsing succeeded or not.
pub fn read_document(path: impl AsRef<Path>, config: &ParserConfig) -> Result<ParsedDocument> {
    let path = path.as_ref();
    config.validate()?;

    let file = File::open(path).map_err(|e| Error::document_access(path, e))?;
    let mut reader = BufReader::new(file);
    let mut parser = DocumentParser::new(config).with_source(path);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| Error::document_access(path, e))?;
        if n == 0 {
            break;
        }
        parser.feed_line(&String::from_utf8_lossy(&buf))?;
    }

    debug!(path = %path.display(), "Read session document");
    Ok(parser.finish())
}

impl SessionDocument {
    /// Parse a document held in memory, discarding warnings after logging them
    pub fn parse_str(text: &str, config: &ParserConfig) -> Result<SessionDocument> {
        parse_document(text, config).map(|parsed| parsed.document)
    }

    /// Read and parse a document from a file
    pub fn from_path(path: impl AsRef<Path>, config: &ParserConfig) -> Result<SessionDocument> {
        read_document(path, config).map(|parsed| parsed.document)
    }
}
