//! Fixed codec vocabulary — known to both encoder and decoder.
//! Never transmitted. Single source of truth for parameter bounds,
//! tag bits, and derived sizes.

/// Smallest usable window exponent (16-byte window).
pub const MIN_WINDOW_BITS: u8 = 4;
/// Largest usable window exponent (32 KiB window).
pub const MAX_WINDOW_BITS: u8 = 15;
/// Smallest usable lookahead exponent (8-byte max copy).
pub const MIN_LOOKAHEAD_BITS: u8 = 3;

// ── Tag bits (value, always 1 bit wide) ──────────────────────────────────────
pub const TAG_LITERAL: u8 = 0x01;
pub const TAG_BACKREF: u8 = 0x00;

/// Capacity of the decoder's input staging buffer.
pub const INPUT_BUFFER_SIZE: usize = 1 << 16;

/// Window/lookahead exponents for one codec session. Both sides of a
/// stream must agree on these out of band; nothing in the bitstream
/// records them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    window_bits: u8,
    lookahead_bits: u8,
}

impl Params {
    /// Validates the exponent pair. Returns `None` unless
    /// `window_bits` is in `[MIN_WINDOW_BITS, MAX_WINDOW_BITS]` and
    /// `lookahead_bits` is in `[MIN_LOOKAHEAD_BITS, window_bits - 1]`.
    pub fn new(window_bits: u8, lookahead_bits: u8) -> Option<Self> {
        if window_bits < MIN_WINDOW_BITS || window_bits > MAX_WINDOW_BITS {
            return None;
        }
        if lookahead_bits < MIN_LOOKAHEAD_BITS || lookahead_bits >= window_bits {
            return None;
        }
        Some(Params { window_bits, lookahead_bits })
    }

    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    pub fn lookahead_bits(&self) -> u8 {
        self.lookahead_bits
    }

    /// Window size in bytes: the reach of a back-reference offset.
    #[inline]
    pub fn window_size(&self) -> usize {
        1 << self.window_bits
    }

    /// Maximum back-reference copy length in bytes.
    #[inline]
    pub fn lookahead_size(&self) -> usize {
        1 << self.lookahead_bits
    }

    /// Bit cost of one back-reference: tag + index + count.
    ///
    /// A match is only worth encoding when its length strictly exceeds
    /// `break_even_point() / 8`; otherwise plain literals (9 bits each)
    /// are no larger. Integer division is deliberate; it is what keeps
    /// the output bit-exact with other implementations of the format.
    #[inline]
    pub fn break_even_point(&self) -> usize {
        1 + self.window_bits as usize + self.lookahead_bits as usize
    }
}
