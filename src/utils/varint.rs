// LEB128-style unsigned varints, 7 bits per byte, high bit set on all but
// the last byte

/// Append `value` to `out`
pub fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Read a varint at `*pos`, advancing it past the encoding.
///
/// Returns `None` on truncated input, on overflow past 64 bits, and on
/// non-canonical encodings with trailing zero groups.
pub fn read_varint(bytes: &[u8], pos: &mut usize) -> Option<u64> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = *bytes.get(*pos)?;
        *pos += 1;

        let group = (byte & 0x7f) as u64;
        if shift == 63 && group > 1 {
            return None;
        }
        value |= group << shift;

        if byte & 0x80 == 0 {
            if byte == 0 && shift > 0 {
                return None;
            }
            return Some(value);
        }
        shift += 7;
        if shift > 63 {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encodings() {
        let mut out = Vec::new();
        write_varint(0, &mut out);
        write_varint(127, &mut out);
        write_varint(128, &mut out);
        write_varint(300, &mut out);
        assert_eq!(out, vec![0x00, 0x7f, 0x80, 0x01, 0xac, 0x02]);

        let mut pos = 0;
        assert_eq!(read_varint(&out, &mut pos), Some(0));
        assert_eq!(read_varint(&out, &mut pos), Some(127));
        assert_eq!(read_varint(&out, &mut pos), Some(128));
        assert_eq!(read_varint(&out, &mut pos), Some(300));
        assert_eq!(pos, out.len());
    }

    #[test]
    fn test_max_value() {
        let mut out = Vec::new();
        write_varint(u64::MAX, &mut out);
        assert_eq!(out.len(), 10);
        let mut pos = 0;
        assert_eq!(read_varint(&out, &mut pos), Some(u64::MAX));
    }

    #[test]
    fn test_rejects_malformed() {
        let mut pos = 0;
        assert_eq!(read_varint(&[0x80], &mut pos), None);

        let mut pos = 0;
        assert_eq!(read_varint(&[0x80, 0x00], &mut pos), None);

        let mut pos = 0;
        let overflow = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert_eq!(read_varint(&overflow, &mut pos), None);
    }
}
