//! encoding and decoding of domain names in wire format
//!
//! A name is a sequence of length-prefixed labels terminated by an empty
//! label. A length byte with both high bits set is a compression pointer: the
//! low 14 bits of it and the following byte form an offset from the start of
//! the message where the rest of the name lives.

/// Upper bound on pointer jumps when fully resolving compression chains.
pub const MAX_POINTER_JUMPS: usize = 16;

/// How compression pointers are followed when decoding a name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameDecoding {
    /// Follow at most one pointer. A second pointer reached after the jump
    /// ends the name at that point.
    SingleJump,
    /// Follow pointer chains up to `MAX_POINTER_JUMPS` jumps.
    FullChain,
}

impl Default for NameDecoding {
    fn default() -> NameDecoding {
        NameDecoding::SingleJump
    }
}

impl NameDecoding {
    pub fn decode(self, data: &[u8], offset: usize, message: &[u8]) -> (String, usize) {
        match self {
            NameDecoding::SingleJump => decode_name(data, offset, message),
            NameDecoding::FullChain => decode_name_chain(data, offset, message),
        }
    }
}

enum Walk {
    /// Hit the terminating zero byte; holds the position just past it.
    End(usize),
    /// Hit a pointer; holds the position just past it and the target offset.
    Pointer(usize, usize),
    /// Ran off the end of the buffer; holds the position reached.
    Truncated(usize),
}

fn is_pointer(len: u8) -> bool {
    (len & 0xC0) == 0xC0
}

fn walk_labels(buf: &[u8], mut pos: usize, labels: &mut Vec<String>) -> Walk {
    loop {
        let len = match buf.get(pos) {
            Some(&len) => len,
            None => return Walk::Truncated(pos),
        };

        if len == 0 {
            return Walk::End(pos + 1);
        }

        if is_pointer(len) {
            return match buf.get(pos + 1) {
                Some(&b2) => {
                    let target = (((len & 0x3F) as usize) << 8) | (b2 as usize);
                    Walk::Pointer(pos + 2, target)
                }
                None => Walk::Truncated(pos),
            };
        }

        let start = pos + 1;
        let end = start + len as usize;
        match buf.get(start..end) {
            Some(label) => labels.push(String::from_utf8_lossy(label).into_owned()),
            None => return Walk::Truncated(pos),
        }

        pos = end;
    }
}

fn decode_with_limit(
    data: &[u8],
    offset: usize,
    message: &[u8],
    max_jumps: usize,
) -> (String, usize) {
    let mut labels = Vec::new();

    let (consumed, mut next) = match walk_labels(data, offset, &mut labels) {
        Walk::End(pos) | Walk::Truncated(pos) => (pos - offset, None),
        Walk::Pointer(pos, target) => (pos - offset, Some(target)),
    };

    let mut jumps = 0;
    while let Some(target) = next.take() {
        if jumps == max_jumps || target >= message.len() {
            break;
        }
        jumps += 1;

        if let Walk::Pointer(_, target) = walk_labels(message, target, &mut labels) {
            next = Some(target);
        }
    }

    (labels.join("."), consumed)
}

/// Encode `domain` as a label sequence. Empty segments are skipped, so a
/// trailing dot is harmless. Label lengths are not validated.
pub fn encode_name(domain: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(domain.len() + 2);

    for label in domain.split('.').filter(|x| !x.is_empty()) {
        result.push(label.len() as u8);
        result.extend_from_slice(label.as_bytes());
    }

    result.push(0);

    result
}

/// Decode the name starting at `offset` in `data`, resolving a compression
/// pointer against `message`. Only one pointer is followed per call.
///
/// Returns the dotted name and the number of bytes it occupies in `data`.
/// Running off the end of either buffer yields the labels read so far.
pub fn decode_name(data: &[u8], offset: usize, message: &[u8]) -> (String, usize) {
    decode_with_limit(data, offset, message, 1)
}

/// Like `decode_name`, but follows pointer chains. Loops are cut off after
/// `MAX_POINTER_JUMPS` jumps.
pub fn decode_name_chain(data: &[u8], offset: usize, message: &[u8]) -> (String, usize) {
    decode_with_limit(data, offset, message, MAX_POINTER_JUMPS)
}

/// Position just past the name starting at `offset`, without decoding it.
/// A pointer ends the walk and occupies two bytes.
pub fn skip_name(message: &[u8], offset: usize) -> usize {
    let mut pos = offset;
    while let Some(&len) = message.get(pos) {
        if len == 0 {
            return pos + 1;
        }
        if is_pointer(len) {
            return pos + 2;
        }
        pos += len as usize + 1;
    }

    pos
}
