//! Permit rule rendering
//!
//! Text form, one rule per line:
//!
//! ```text
//! permit 64kbps from 2001:db8::1 5004 to 2001:db8::2 6004
//! permit 800bps from 2001:db8::1 5005 to 2001:db8::2 6005
//! ...
//! Total uplink from 2001:db8::1 ---> 64.8 kbps
//! Total uplink from 2001:db8::2 ---> 33.2 kbps
//! ```

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::negotiate::{BandwidthUnit, FlowDescriptor, Negotiation, UplinkTotal};

impl fmt::Display for BandwidthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandwidthUnit::Kbps => write!(f, "kbps"),
            BandwidthUnit::Bps => write!(f, "bps"),
        }
    }
}

impl fmt::Display for FlowDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "permit {}{} from {} {} to {} {}",
            self.value,
            self.unit,
            self.source.address,
            self.source.port,
            self.destination.address,
            self.destination.port
        )
    }
}

impl fmt::Display for UplinkTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total uplink from {} ---> {:.1} kbps", self.address, self.kbps)
    }
}

/// Write every permit rule followed by the offer and answer totals
pub fn write_text<W: Write>(out: &mut W, negotiation: &Negotiation) -> io::Result<()> {
    for flow in &negotiation.flows {
        writeln!(out, "{}", flow)?;
    }
    writeln!(out, "{}", negotiation.offer_uplink)?;
    writeln!(out, "{}", negotiation.answer_uplink)?;
    Ok(())
}

/// Write a negotiation (or a whole report) as one pretty-printed JSON document
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
