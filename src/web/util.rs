fn hex_to_num(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 0xA),
        b'A'..=b'F' => Some(c - b'A' + 0xA),
        _ => None,
    }
}

/// Decode `%XX` escapes and `+` as space. Malformed escapes are kept
/// verbatim.
pub fn url_decode(instr: &str) -> String {
    let src_buffer = instr.as_bytes();

    let mut pos = 0;
    let len = src_buffer.len();
    let mut buffer = Vec::with_capacity(len);
    while pos < len {
        let cur = src_buffer[pos];
        if cur == b'%' && pos + 2 < len {
            match (hex_to_num(src_buffer[pos + 1]), hex_to_num(src_buffer[pos + 2])) {
                (Some(a), Some(b)) => {
                    buffer.push((a << 4) | b);
                    pos += 3;
                    continue;
                }
                _ => buffer.push(cur),
            }
        } else if cur == b'+' {
            buffer.push(b' ');
        } else {
            buffer.push(cur);
        }

        pos += 1;
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

/// Split a query string into decoded key/value pairs. Pairs without exactly
/// one `=` are dropped.
pub fn parse_query(data: &str) -> Vec<(String, String)> {
    data.split('&')
        .filter_map(|x| {
            let s = x.split('=').collect::<Vec<&str>>();
            match s.len() {
                2 => Some((url_decode(s[0]), url_decode(s[1]))),
                _ => None,
            }
        })
        .collect::<Vec<(String, String)>>()
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_url_decode() {
        assert_eq!("@foo barA", url_decode("%40foo%20bar%41"));
        assert_eq!("a b", url_decode("a+b"));
        assert_eq!("100%", url_decode("100%"));
        assert_eq!("%zz", url_decode("%zz"));
    }

    #[test]
    fn test_parse_query() {
        let result = parse_query("name=example.com&type=15");

        assert_eq!(2, result.len());
        assert_eq!(("name".to_string(), "example.com".to_string()), result[0]);
        assert_eq!(("type".to_string(), "15".to_string()), result[1]);

        assert_eq!(0, parse_query("foo=bar=baz").len());

        let result = parse_query("name=foo&&");
        assert_eq!(1, result.len());
        assert_eq!(("name".to_string(), "foo".to_string()), result[0]);
    }
}
