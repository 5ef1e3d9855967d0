//! walking the answer section of received responses

use std::io::{Error, ErrorKind, Result};

use log::debug;

use crate::dns::buffer::{BytePacketBuffer, PacketBuffer};
use crate::dns::name::{skip_name, NameDecoding};
use crate::dns::protocol::{DnsHeader, DnsRecord, QueryType};
use crate::dns::rdata::decode_rdata;

const HEADER_LEN: usize = 12;

/// Extracts the answers of one record type from a response message.
#[derive(Clone, Copy, Debug)]
pub struct ResponseParser {
    wanted: QueryType,
    decoding: NameDecoding,
}

impl ResponseParser {
    pub fn new(wanted: QueryType) -> ResponseParser {
        ResponseParser {
            wanted,
            decoding: NameDecoding::default(),
        }
    }

    pub fn with_decoding(mut self, decoding: NameDecoding) -> ResponseParser {
        self.decoding = decoding;
        self
    }

    /// Decode every answer of the wanted type, in message order.
    ///
    /// Only a message too short to hold a header is an error. Answers of
    /// other types are stepped over, and a section cut short simply ends
    /// the walk with whatever was collected.
    pub fn try_parse(&self, response: &[u8]) -> Result<Vec<DnsRecord>> {
        if response.len() < HEADER_LEN {
            return Err(Error::new(ErrorKind::InvalidData, "Message shorter than header"));
        }

        let mut buffer = BytePacketBuffer::new(response);

        let mut header = DnsHeader::new();
        header.read(&mut buffer)?;
        if header.rescode != 0 {
            debug!("response {:#06x} carries rcode {}", header.id, header.rescode);
        }

        let mut answers = Vec::new();
        if header.answers == 0 {
            return Ok(answers);
        }

        // Skip the question: name, type and class
        buffer.seek(skip_name(response, HEADER_LEN) + 4)?;

        for _ in 0..header.answers {
            if buffer.remaining() == 0 {
                break;
            }

            let (domain, name_len) = self.decoding.decode(response, buffer.pos(), response);
            buffer.step(name_len)?;

            if buffer.remaining() < 10 {
                break;
            }

            let rtype = QueryType::from_num(buffer.read_u16()?);
            let _ = buffer.read_u16()?; // class
            let ttl = buffer.read_u32()?;
            let data_len = buffer.read_u16()? as usize;

            if rtype != self.wanted {
                debug!("skipping {} answer for {}", rtype, domain);
            } else if data_len <= buffer.remaining() {
                let rdata = buffer.get_range(buffer.pos(), data_len)?;
                if let Some(data) = decode_rdata(self.wanted, rdata, response, self.decoding) {
                    answers.push(DnsRecord::new(domain, ttl, data));
                }
            }

            buffer.step(data_len)?;
        }

        Ok(answers)
    }
}

/// Whether `response` is a reply to `query`: the transaction id matches, the
/// QR bit is set, and the single question is echoed back unchanged (ignoring
/// ASCII case).
pub fn matches_query(query: &[u8], response: &[u8]) -> bool {
    if query.len() < HEADER_LEN || response.len() < HEADER_LEN {
        return false;
    }

    let mut sent = DnsHeader::new();
    let mut received = DnsHeader::new();
    if sent.read(&mut BytePacketBuffer::new(query)).is_err()
        || received.read(&mut BytePacketBuffer::new(response)).is_err()
    {
        return false;
    }

    if sent.id != received.id || !received.response || received.questions != 1 {
        return false;
    }

    let question = &query[HEADER_LEN..];
    match response.get(HEADER_LEN..HEADER_LEN + question.len()) {
        Some(echoed) => echoed.eq_ignore_ascii_case(question),
        None => false,
    }
}
