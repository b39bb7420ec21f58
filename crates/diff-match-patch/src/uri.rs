//! The percent-encoding dialect shared by the delta and patch wire formats.
//!
//! The encode direction leaves the `encodeURI` unreserved set untouched and
//! additionally keeps a literal space (the wire formats rewrite `%20` to a
//! space). The decode direction is strict: a dangling or non-hex `%` escape
//! is an error, and so is a decoded byte sequence that is not UTF-8.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::unit::{self, Units};

const URI_WIRE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b' ')
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@')
    .remove(b'_')
    .remove(b'~');

pub(crate) fn encode(units: &[u16]) -> String {
    utf8_percent_encode(&unit::decode(units), URI_WIRE).to_string()
}

pub(crate) fn decode(input: &str) -> Result<Units, ()> {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return Err(());
            }
            let hi = hex_value(bytes[i + 1]).ok_or(())?;
            let lo = hex_value(bytes[i + 2]).ok_or(())?;
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    let text = String::from_utf8(out).map_err(|_| ())?;
    Ok(unit::encode(&text))
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit;

    #[test]
    fn encode_keeps_uri_unreserved_set() {
        let text = "AZaz09;,/?:@&=+$-_.!~*'()# ";
        assert_eq!(encode(&unit::encode(text)), text);
    }

    #[test]
    fn encode_escapes_the_rest() {
        assert_eq!(encode(&unit::encode("[^%\n]")), "%5B%5E%25%0A%5D");
        assert_eq!(encode(&unit::encode("\u{00e9}")), "%C3%A9");
    }

    #[test]
    fn decode_round_trips() {
        let text = "da\u{00e9}b \n %+";
        let units = unit::encode(text);
        assert_eq!(decode(&encode(&units)), Ok(units));
    }

    #[test]
    fn decode_rejects_malformed_escapes() {
        assert!(decode("%").is_err());
        assert!(decode("%2").is_err());
        assert!(decode("%zz").is_err());
        assert!(decode("%c3%28").is_err());
    }
}
