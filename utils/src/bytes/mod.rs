use std::fmt;

pub fn hex_to_bytes(s: &str) -> Option<Vec<u8>> {
    let s: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if !s.len().is_multiple_of(2) {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|sub| u8::from_str_radix(sub, 16).ok())
        })
        .collect()
}

/// Lazily formats the first `limit` bytes of a buffer as hex, for log lines.
pub struct HexPreview<'a> {
    bytes: &'a [u8],
    limit: usize,
}

impl<'a> HexPreview<'a> {
    pub fn new(bytes: &'a [u8], limit: usize) -> Self {
        Self { bytes, limit }
    }
}

impl fmt::Display for HexPreview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.bytes.iter().take(self.limit) {
            write!(f, "{:02x}", b)?;
        }
        if self.bytes.len() > self.limit {
            write!(f, "..({} bytes)", self.bytes.len())?;
        }
        Ok(())
    }
}
