use crate::errors::{BitstreamError, BitstreamResult};

const EMULATION_PREVENTION_BYTE: u8 = 0x03;

/// Strips emulation prevention bytes from a coded unit.
///
/// The first `header_length` bytes are the unit header and are not copied.
/// Whenever two zero bytes are followed by `0x03`, the `0x03` is dropped and
/// the zero run restarts; a third zero restarts the run at one. With
/// `stop_at_start_code`, two zero bytes followed by a byte <= `0x01` mark the
/// beginning of the next unit: extraction stops there and the two zeros are
/// left out.
pub fn extract_rbsp(
    payload: &[u8],
    header_length: usize,
    stop_at_start_code: bool,
) -> BitstreamResult<Vec<u8>> {
    if payload.len() < header_length {
        return Err(BitstreamError::TruncatedUnit {
            length: payload.len(),
            header_length,
        });
    }

    let body = &payload[header_length..];
    let mut rbsp = Vec::with_capacity(body.len());
    let mut zero_count = 0;
    for (pos, &byte) in body.iter().enumerate() {
        if zero_count == 2 {
            if byte == EMULATION_PREVENTION_BYTE {
                zero_count = 0;
                continue;
            }
            if stop_at_start_code && byte <= 0x01 {
                tracing::trace!(
                    "start code found inside unit at offset {}, truncating rbsp",
                    header_length + pos
                );
                rbsp.truncate(rbsp.len() - 2);
                return Ok(rbsp);
            }
        }
        zero_count = match (byte, zero_count) {
            (0, 2) => 1,
            (0, n) => n + 1,
            _ => 0,
        };
        rbsp.push(byte);
    }
    Ok(rbsp)
}

/// Inverse of [`extract_rbsp`]: inserts `0x03` wherever two zero bytes are
/// followed by a byte <= `0x03`.
pub fn insert_emulation_prevention(rbsp: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(rbsp.len() + rbsp.len() / 2);
    let mut zero_count = 0;
    for &byte in rbsp {
        if zero_count == 2 && byte <= EMULATION_PREVENTION_BYTE {
            result.push(EMULATION_PREVENTION_BYTE);
            zero_count = 0;
        }
        if byte == 0 {
            zero_count += 1;
        } else {
            zero_count = 0;
        }
        result.push(byte);
    }
    result
}

#[cfg(test)]
mod test {
    use crate::errors::BitstreamError;

    use super::{extract_rbsp, insert_emulation_prevention};

    #[test]
    fn test_emulation_prevention_removed() {
        let payload = [0x06, 0x00, 0x00, 0x03, 0x01, 0x00, 0x00, 0x03, 0x00, 0xAB];
        let rbsp = extract_rbsp(&payload, 1, false).unwrap();
        assert_eq!(rbsp, vec![0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xAB]);
    }

    #[test]
    fn test_three_without_two_zeros_is_kept() {
        let payload = [0x67, 0x00, 0x03, 0x00, 0x00, 0x00, 0x03];
        let rbsp = extract_rbsp(&payload, 1, false).unwrap();
        // a third zero restarts the run at one, so the last 0x03 is data
        assert_eq!(rbsp, vec![0x00, 0x03, 0x00, 0x00, 0x00, 0x03]);
    }

    #[test]
    fn test_stops_at_next_start_code() {
        let payload = [0x65, 0x88, 0x84, 0x00, 0x00, 0x01, 0x41, 0x9A];
        let rbsp = extract_rbsp(&payload, 1, true).unwrap();
        assert_eq!(rbsp, vec![0x88, 0x84]);

        let rbsp = extract_rbsp(&payload, 1, false).unwrap();
        assert_eq!(rbsp, vec![0x88, 0x84, 0x00, 0x00, 0x01, 0x41, 0x9A]);
    }

    #[test]
    fn test_truncated_unit() {
        let err = extract_rbsp(&[0x40], 2, true).unwrap_err();
        assert!(matches!(
            err,
            BitstreamError::TruncatedUnit {
                length: 1,
                header_length: 2
            }
        ));
        assert!(extract_rbsp(&[0x40, 0x01], 2, true).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let samples: [&[u8]; 6] = [
            &[0x00, 0x00, 0x00, 0x00],
            &[0x00, 0x00, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00, 0x03],
            &[0x12, 0x00, 0x00, 0x04, 0x00, 0x00],
            &[0x00, 0x00, 0x1F, 0x00, 0x00, 0x00, 0x01],
            &[0xFF; 16],
            &[],
        ];
        for rbsp in samples {
            let escaped = insert_emulation_prevention(rbsp);
            for window in escaped.windows(3) {
                assert!(!(window[0] == 0 && window[1] == 0 && window[2] <= 0x02));
            }
            assert_eq!(extract_rbsp(&escaped, 0, false).unwrap(), rbsp);
            assert_eq!(extract_rbsp(&escaped, 0, true).unwrap(), rbsp);
        }
    }

    #[test]
    fn test_round_trip_all_byte_pairs() {
        for a in 0..=0xFF_u8 {
            for b in [0x00_u8, 0x01, 0x02, 0x03, 0x04, 0x80] {
                let rbsp = [0x00, 0x00, a, 0x00, 0x00, b, a];
                let escaped = insert_emulation_prevention(&rbsp);
                assert_eq!(extract_rbsp(&escaped, 0, true).unwrap(), rbsp);
            }
        }
    }
}
