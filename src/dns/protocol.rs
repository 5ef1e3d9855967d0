//! implements the DNS protocol in a transport agnostic fashion

use std::fmt;
use std::io::Result;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::dns::buffer::PacketBuffer;
use crate::dns::name::encode_name;

/// Record types this tool knows how to ask for and decode. Any other type code
/// seen on the wire is kept as `UNKNOWN` with its number.
#[derive(PartialEq, Eq, Debug, Clone, Hash, Copy)]
pub enum QueryType {
    UNKNOWN(u16),
    A,     // 1
    NS,    // 2
    CNAME, // 5
    SOA,   // 6
    PTR,   // 12
    MX,    // 15
    TXT,   // 16
    AAAA,  // 28
}

impl QueryType {
    /// The record types covered by a full lookup, in reporting order.
    pub const LOOKUP_ALL: [QueryType; 7] = [
        QueryType::A,
        QueryType::AAAA,
        QueryType::MX,
        QueryType::NS,
        QueryType::CNAME,
        QueryType::TXT,
        QueryType::SOA,
    ];

    pub fn to_num(&self) -> u16 {
        match *self {
            QueryType::UNKNOWN(x) => x,
            QueryType::A => 1,
            QueryType::NS => 2,
            QueryType::CNAME => 5,
            QueryType::SOA => 6,
            QueryType::PTR => 12,
            QueryType::MX => 15,
            QueryType::TXT => 16,
            QueryType::AAAA => 28,
        }
    }

    pub fn from_num(num: u16) -> QueryType {
        match num {
            1 => QueryType::A,
            2 => QueryType::NS,
            5 => QueryType::CNAME,
            6 => QueryType::SOA,
            12 => QueryType::PTR,
            15 => QueryType::MX,
            16 => QueryType::TXT,
            28 => QueryType::AAAA,
            _ => QueryType::UNKNOWN(num),
        }
    }

    /// Case insensitive lookup of a record type mnemonic.
    pub fn from_name(name: &str) -> Option<QueryType> {
        match name.to_ascii_uppercase().as_str() {
            "A" => Some(QueryType::A),
            "NS" => Some(QueryType::NS),
            "CNAME" => Some(QueryType::CNAME),
            "SOA" => Some(QueryType::SOA),
            "PTR" => Some(QueryType::PTR),
            "MX" => Some(QueryType::MX),
            "TXT" => Some(QueryType::TXT),
            "AAAA" => Some(QueryType::AAAA),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            QueryType::UNKNOWN(_) => "UNKNOWN",
            QueryType::A => "A",
            QueryType::NS => "NS",
            QueryType::CNAME => "CNAME",
            QueryType::SOA => "SOA",
            QueryType::PTR => "PTR",
            QueryType::MX => "MX",
            QueryType::TXT => "TXT",
            QueryType::AAAA => "AAAA",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            QueryType::UNKNOWN(x) => write!(f, "TYPE{}", x),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Text reported for SOA records, which are not decoded field by field.
pub const SOA_PLACEHOLDER: &str = "SOA record (parsing simplified)";

/// The decoded payload of a single resource record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    MX { priority: u16, host: String },
    NS(String),
    CNAME(String),
    PTR(String),
    TXT(String),
    SOA,
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RecordData::A(ref addr) => write!(f, "{}", addr),
            RecordData::AAAA(ref addr) => {
                // Always the full form: eight groups of four hex digits.
                let groups = addr
                    .segments()
                    .iter()
                    .map(|x| format!("{:04x}", x))
                    .collect::<Vec<String>>();
                write!(f, "{}", groups.join(":"))
            }
            RecordData::MX {
                priority,
                ref host,
            } => write!(f, "Priority: {}, Server: {}", priority, host),
            RecordData::NS(ref host) | RecordData::CNAME(ref host) | RecordData::PTR(ref host) => {
                write!(f, "{}", host)
            }
            RecordData::TXT(ref text) => write!(f, "{}", text),
            RecordData::SOA => write!(f, "{}", SOA_PLACEHOLDER),
        }
    }
}

/// A resource record taken from the answer section of a response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsRecord {
    pub domain: String,
    pub ttl: u32,
    pub data: RecordData,
}

impl DnsRecord {
    pub fn new(domain: String, ttl: u32, data: RecordData) -> DnsRecord {
        DnsRecord { domain, ttl, data }
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

/// The fields of a message header this client sets or inspects. Opcode is
/// always a standard query; the authority and additional counts are written
/// as zero and skipped on read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub response: bool,
    pub recursion_desired: bool,
    pub rescode: u8,
    pub questions: u16,
    pub answers: u16,
}

impl DnsHeader {
    const QR: u16 = 0x8000;
    const RD: u16 = 0x0100;
    const RCODE: u16 = 0x000F;

    pub fn new() -> DnsHeader {
        DnsHeader::default()
    }

    pub fn write<T: PacketBuffer>(&self, buffer: &mut T) -> Result<()> {
        let mut flags = u16::from(self.rescode) & DnsHeader::RCODE;
        if self.response {
            flags |= DnsHeader::QR;
        }
        if self.recursion_desired {
            flags |= DnsHeader::RD;
        }

        buffer.write_u16(self.id)?;
        buffer.write_u16(flags)?;
        buffer.write_u16(self.questions)?;
        buffer.write_u16(self.answers)?;
        buffer.write_u16(0)?;
        buffer.write_u16(0)?;

        Ok(())
    }

    pub fn read<T: PacketBuffer>(&mut self, buffer: &mut T) -> Result<()> {
        self.id = buffer.read_u16()?;

        let flags = buffer.read_u16()?;
        self.response = flags & DnsHeader::QR != 0;
        self.recursion_desired = flags & DnsHeader::RD != 0;
        self.rescode = (flags & DnsHeader::RCODE) as u8;

        self.questions = buffer.read_u16()?;
        self.answers = buffer.read_u16()?;
        buffer.step(4)?;

        Ok(())
    }
}

/// Representation of a DNS question. Questions are always sent in class IN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String,
    pub qtype: QueryType,
}

impl DnsQuestion {
    pub fn new(name: String, qtype: QueryType) -> DnsQuestion {
        DnsQuestion { name, qtype }
    }

    pub fn write<T: PacketBuffer>(&self, buffer: &mut T) -> Result<()> {
        buffer.write_bytes(&encode_name(&self.name))?;

        buffer.write_u16(self.qtype.to_num())?;
        buffer.write_u16(1)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::dns::buffer::{BytePacketBuffer, VectorPacketBuffer};

    #[test]
    fn test_querytype_names() {
        assert_eq!(Some(QueryType::AAAA), QueryType::from_name("aaaa"));
        assert_eq!(Some(QueryType::PTR), QueryType::from_name("PTR"));
        assert_eq!(None, QueryType::from_name("ZZZ"));
        assert_eq!(QueryType::MX, QueryType::from_num(15));
        assert_eq!(QueryType::UNKNOWN(99), QueryType::from_num(99));
        assert_eq!(99, QueryType::UNKNOWN(99).to_num());
        assert_eq!("TYPE99", QueryType::UNKNOWN(99).to_string());
    }

    #[test]
    fn test_record_display() {
        assert_eq!(
            "93.184.216.34",
            RecordData::A(Ipv4Addr::new(93, 184, 216, 34)).to_string()
        );
        assert_eq!(
            "2001:0db8:0000:0000:0000:0000:0000:0001",
            RecordData::AAAA("2001:db8::1".parse().unwrap()).to_string()
        );
        assert_eq!(
            "Priority: 10, Server: mail.example.com",
            RecordData::MX {
                priority: 10,
                host: "mail.example.com".to_string()
            }
            .to_string()
        );
        assert_eq!(SOA_PLACEHOLDER, RecordData::SOA.to_string());
    }

    #[test]
    fn test_header_roundtrip() {
        let mut header = DnsHeader::new();
        header.id = 0xbeef;
        header.recursion_desired = true;
        header.response = true;
        header.rescode = 3;
        header.questions = 1;
        header.answers = 2;

        let mut out = VectorPacketBuffer::new();
        header.write(&mut out).unwrap();
        let data = out.into_inner();
        assert_eq!(12, data.len());
        assert_eq!(&[0xbe, 0xef, 0x81, 0x03], &data[0..4]);

        let mut parsed = DnsHeader::new();
        parsed.read(&mut BytePacketBuffer::new(&data)).unwrap();
        assert_eq!(header, parsed);
    }
}
