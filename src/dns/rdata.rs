//! decoding of type specific record payloads

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::dns::name::NameDecoding;
use crate::dns::protocol::{QueryType, RecordData};

/// Decode `rdata` as a record of type `qtype`. Names inside the payload may
/// point anywhere in `message`.
///
/// Returns `None` when the payload has the wrong shape for its type, decodes
/// to nothing, or the type is not one we handle.
pub fn decode_rdata(
    qtype: QueryType,
    rdata: &[u8],
    message: &[u8],
    decoding: NameDecoding,
) -> Option<RecordData> {
    match qtype {
        QueryType::A => {
            if rdata.len() != 4 {
                return None;
            }

            Some(RecordData::A(Ipv4Addr::new(
                rdata[0], rdata[1], rdata[2], rdata[3],
            )))
        }
        QueryType::AAAA => {
            if rdata.len() != 16 {
                return None;
            }

            let mut octets = [0; 16];
            octets.copy_from_slice(rdata);

            Some(RecordData::AAAA(Ipv6Addr::from(octets)))
        }
        QueryType::MX => {
            if rdata.len() < 3 {
                return None;
            }

            let priority = ((rdata[0] as u16) << 8) | (rdata[1] as u16);
            let (host, _) = decoding.decode(rdata, 2, message);

            Some(RecordData::MX { priority, host })
        }
        QueryType::NS => decode_host(rdata, message, decoding).map(RecordData::NS),
        QueryType::CNAME => decode_host(rdata, message, decoding).map(RecordData::CNAME),
        QueryType::PTR => decode_host(rdata, message, decoding).map(RecordData::PTR),
        QueryType::TXT => {
            let text = decode_character_strings(rdata);
            if text.is_empty() {
                return None;
            }

            Some(RecordData::TXT(text))
        }
        QueryType::SOA => Some(RecordData::SOA),
        QueryType::UNKNOWN(_) => None,
    }
}

fn decode_host(rdata: &[u8], message: &[u8], decoding: NameDecoding) -> Option<String> {
    let (host, _) = decoding.decode(rdata, 0, message);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Concatenate the length-prefixed character strings of a TXT payload. A
/// segment claiming more bytes than remain ends the scan.
fn decode_character_strings(rdata: &[u8]) -> String {
    let mut text = String::new();

    let mut pos = 0;
    while pos < rdata.len() {
        let len = rdata[pos] as usize;
        let segment = match rdata.get(pos + 1..pos + 1 + len) {
            Some(x) => x,
            None => break,
        };

        text.push_str(&String::from_utf8_lossy(segment));
        pos += len + 1;
    }

    text
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::dns::name::encode_name;

    fn decode(qtype: QueryType, rdata: &[u8]) -> Option<String> {
        decode_rdata(qtype, rdata, rdata, NameDecoding::SingleJump).map(|x| x.to_string())
    }

    #[test]
    fn test_a() {
        assert_eq!(
            Some("93.184.216.34".to_string()),
            decode(QueryType::A, &[93, 184, 216, 34])
        );
        assert_eq!(None, decode(QueryType::A, &[93, 184, 216]));
    }

    #[test]
    fn test_aaaa() {
        let mut rdata = [0; 16];
        rdata[15] = 1;

        assert_eq!(
            Some("0000:0000:0000:0000:0000:0000:0000:0001".to_string()),
            decode(QueryType::AAAA, &rdata)
        );
        assert_eq!(None, decode(QueryType::AAAA, &rdata[..4]));
    }

    #[test]
    fn test_mx() {
        let mut rdata = vec![0, 10];
        rdata.extend_from_slice(&encode_name("mail.example.com"));

        assert_eq!(
            Some("Priority: 10, Server: mail.example.com".to_string()),
            decode(QueryType::MX, &rdata)
        );
        assert_eq!(None, decode(QueryType::MX, &[0, 10]));
    }

    #[test]
    fn test_mx_with_pointer() {
        let message = encode_name("example.com");
        let rdata = [0, 5, 4, b'm', b'a', b'i', b'l', 0xC0, 0x00];

        let data = decode_rdata(QueryType::MX, &rdata, &message, NameDecoding::SingleJump);
        assert_eq!(
            Some(RecordData::MX {
                priority: 5,
                host: "mail.example.com".to_string()
            }),
            data
        );
    }

    #[test]
    fn test_names() {
        let rdata = encode_name("ns1.example.com");

        assert_eq!(Some("ns1.example.com".to_string()), decode(QueryType::NS, &rdata));
        assert_eq!(Some("ns1.example.com".to_string()), decode(QueryType::CNAME, &rdata));
        assert_eq!(Some("ns1.example.com".to_string()), decode(QueryType::PTR, &rdata));
        assert_eq!(None, decode(QueryType::NS, &[0]));
    }

    #[test]
    fn test_txt() {
        assert_eq!(
            Some("abcd".to_string()),
            decode(QueryType::TXT, &[2, b'a', b'b', 2, b'c', b'd'])
        );
        assert_eq!(
            Some("ab".to_string()),
            decode(QueryType::TXT, &[2, b'a', b'b', 9, b'c', b'd'])
        );
        assert_eq!(
            Some("a\u{fffd}".to_string()),
            decode(QueryType::TXT, &[2, b'a', 0xff])
        );
        assert_eq!(None, decode(QueryType::TXT, &[]));
    }

    #[test]
    fn test_soa_and_unknown() {
        assert_eq!(
            Some(RecordData::SOA),
            decode_rdata(QueryType::SOA, &[1, 2, 3], &[], NameDecoding::SingleJump)
        );
        assert_eq!(None, decode(QueryType::UNKNOWN(33), &[0, 0, 0]));
    }
}
