//! Binary spectrum packets sent by the server over the WebSocket.
//!
//! Layout, network byte order:
//!
//! ```text
//! i32 sps | i32 centre_hz | i32 start_sec | i32 end_sec | i32 n | n × f32 spectrum | n × f32 peaks
//! ```

const HEADER_LEN: usize = 5 * 4;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WireError {
    #[error("Packet too short: {len} bytes, need {need}")]
    Truncated { len: usize, need: usize },
    #[error("Negative bin count {0}")]
    NegativeLength(i32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpectrumPacket {
    /// Sample rate, which is also the displayed span.
    pub sps: i32,
    pub centre_hz: i32,
    pub start_sec: i32,
    pub end_sec: i32,
    pub spectrum: Vec<f32>,
    pub peaks: Vec<f32>,
}

fn be_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_be_bytes(word)
}

fn be_f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Decode one packet. Trailing bytes past the two arrays are ignored.
pub fn decode_spectrum_packet(bytes: &[u8]) -> Result<SpectrumPacket, WireError> {
    if bytes.len() < HEADER_LEN {
        return Err(WireError::Truncated {
            len: bytes.len(),
            need: HEADER_LEN,
        });
    }
    let n = be_i32(bytes, 16);
    if n < 0 {
        return Err(WireError::NegativeLength(n));
    }
    let n = n as usize;
    let need = n
        .checked_mul(8)
        .and_then(|b| b.checked_add(HEADER_LEN))
        .unwrap_or(usize::MAX);
    if bytes.len() < need {
        return Err(WireError::Truncated {
            len: bytes.len(),
            need,
        });
    }

    let spectrum_end = HEADER_LEN + n * 4;
    Ok(SpectrumPacket {
        sps: be_i32(bytes, 0),
        centre_hz: be_i32(bytes, 4),
        start_sec: be_i32(bytes, 8),
        end_sec: be_i32(bytes, 12),
        spectrum: be_f32s(&bytes[HEADER_LEN..spectrum_end]),
        peaks: be_f32s(&bytes[spectrum_end..need]),
    })
}
