//! assembly of outgoing query messages

use std::io::Result;

use crate::dns::buffer::VectorPacketBuffer;
use crate::dns::protocol::{DnsHeader, DnsQuestion, QueryType};

/// Transaction id used when id randomization is switched off.
pub const LEGACY_TRANSACTION_ID: u16 = 0x1234;

/// Build a recursive standard query for `domain` with a single question.
pub fn build_query(domain: &str, qtype: QueryType, id: u16) -> Result<Vec<u8>> {
    let mut header = DnsHeader::new();
    header.id = id;
    header.recursion_desired = true;
    header.questions = 1;

    let question = DnsQuestion::new(domain.to_string(), qtype);

    let mut buffer = VectorPacketBuffer::new();
    header.write(&mut buffer)?;
    question.write(&mut buffer)?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_build_query() {
        let query = build_query("example.com", QueryType::MX, LEGACY_TRANSACTION_ID).unwrap();

        assert_eq!(
            &[0x12, 0x34, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0],
            &query[0..12]
        );
        assert_eq!(
            &[7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0],
            &query[12..25]
        );
        assert_eq!(&[0, 15, 0, 1], &query[25..]);
    }

    #[test]
    fn test_build_query_id() {
        let query = build_query("a.b", QueryType::A, 0xfffe).unwrap();

        assert_eq!(&[0xff, 0xfe], &query[0..2]);
        assert_eq!(12 + 5 + 4, query.len());
    }
}
