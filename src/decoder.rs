// src/decoder.rs
//! Streaming LZSS decoder.
//!
//! Parses the tagged bitstream and reconstructs bytes through a circular
//! window. Every state parks itself when the bit reader cannot satisfy its
//! request, so the stream can be fed in arbitrary fragments: `sink` stages
//! compressed bytes, `poll` runs the machine until it starves, `finish`
//! reports whether trailing zero padding is all that remains.

use crate::bitreader::BitReader;
use crate::params::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Read the 1-bit literal/backref tag.
    TagBit,
    /// Read the 8-bit literal byte.
    YieldLiteral,
    /// Read the high bits of a wide backref index.
    BackrefIndexMsb,
    /// Read the low bits of the backref index.
    BackrefIndexLsb,
    /// Read the high bits of a wide backref count.
    BackrefCountMsb,
    /// Read the low bits of the backref count.
    BackrefCountLsb,
    /// Copy `output_count` bytes from the window.
    YieldBackref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkResult {
    Ok,
    /// Input staging buffer is full; poll to drain it first.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult {
    /// No further progress without more input.
    Empty,
    /// More output pending; poll again.
    More,
    /// The stream asked for a copy outside the agreed geometry.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishResult {
    Done,
    More,
}

pub struct Decoder {
    params: Params,
    /// Reconstruction window, addressed modulo its power-of-two size.
    window: Vec<u8>,
    /// Total bytes emitted; only ever used masked by the window size.
    head_index: usize,
    /// Remaining bytes of the in-flight back-reference.
    output_count: usize,
    /// Negative offset of the in-flight back-reference.
    output_index: usize,
    state: State,
    input: BitReader,
    out: Vec<u8>,
}

impl Decoder {
    pub fn new(params: Params) -> Self {
        Decoder {
            params,
            window: vec![0u8; params.window_size()],
            head_index: 0,
            output_count: 0,
            output_index: 0,
            state: State::TagBit,
            input: BitReader::new(),
            out: Vec::new(),
        }
    }

    /// Return the instance to its freshly-constructed state so it can be
    /// reused for another stream.
    pub fn reset(&mut self) {
        self.window.fill(0);
        self.head_index = 0;
        self.output_count = 0;
        self.output_index = 0;
        self.state = State::TagBit;
        self.input.reset();
        self.out.clear();
    }

    /// Stage compressed bytes. Returns `Full` with nothing consumed when
    /// the staging buffer has no room.
    pub fn sink(&mut self, data: &[u8]) -> (SinkResult, usize) {
        if self.input.is_full() {
            return (SinkResult::Full, 0);
        }
        let n = self.input.sink(data);
        (SinkResult::Ok, n)
    }

    /// Run the state machine until it can no longer advance.
    pub fn poll(&mut self) -> PollResult {
        loop {
            let in_state = self.state;
            let next = match in_state {
                State::TagBit => self.step_tag_bit(),
                State::YieldLiteral => self.step_yield_literal(),
                State::BackrefIndexMsb => self.step_backref_index_msb(),
                State::BackrefIndexLsb => self.step_backref_index_lsb(),
                State::BackrefCountMsb => self.step_backref_count_msb(),
                State::BackrefCountLsb => self.step_backref_count_lsb(),
                State::YieldBackref => {
                    if self.output_index > self.params.window_size()
                        || self.output_count > self.params.lookahead_size()
                    {
                        // Corrupt stream (or disagreeing parameters);
                        // refuse to copy rather than abort the host.
                        return PollResult::Error;
                    }
                    self.step_yield_backref()
                }
            };
            if next == in_state {
                return PollResult::Empty;
            }
            self.state = next;
        }
    }

    /// `Done` when any remaining input could only be the zero padding of
    /// the final byte. A back-reference caught mid-copy is never terminal.
    pub fn finish(&self) -> FinishResult {
        match self.state {
            State::TagBit
            | State::BackrefIndexMsb
            | State::BackrefIndexLsb
            | State::BackrefCountMsb
            | State::BackrefCountLsb
            | State::YieldLiteral => {
                if self.input.is_drained() {
                    FinishResult::Done
                } else {
                    FinishResult::More
                }
            }
            State::YieldBackref => FinishResult::More,
        }
    }

    /// Reconstructed bytes accumulated so far.
    pub fn output(&self) -> &[u8] {
        &self.out
    }

    pub fn into_output(self) -> Vec<u8> {
        self.out
    }

    // ── State steps ──────────────────────────────────────────────────────────

    fn step_tag_bit(&mut self) -> State {
        match self.input.get_bits(1) {
            None => State::TagBit,
            Some(0) => {
                if self.params.window_bits() > 8 {
                    State::BackrefIndexMsb
                } else {
                    self.output_index = 0;
                    State::BackrefIndexLsb
                }
            }
            Some(_) => State::YieldLiteral,
        }
    }

    fn step_yield_literal(&mut self) -> State {
        match self.input.get_bits(8) {
            None => State::YieldLiteral,
            Some(bits) => {
                let mask = self.params.window_size() - 1;
                let c = bits as u8;
                self.window[self.head_index & mask] = c;
                self.head_index += 1;
                self.out.push(c);
                State::TagBit
            }
        }
    }

    fn step_backref_index_msb(&mut self) -> State {
        let bit_count = self.params.window_bits() - 8;
        match self.input.get_bits(bit_count) {
            None => State::BackrefIndexMsb,
            Some(bits) => {
                self.output_index = (bits as usize) << 8;
                State::BackrefIndexLsb
            }
        }
    }

    fn step_backref_index_lsb(&mut self) -> State {
        let bit_count = self.params.window_bits().min(8);
        match self.input.get_bits(bit_count) {
            None => State::BackrefIndexLsb,
            Some(bits) => {
                self.output_index |= bits as usize;
                // The encoder stored offset - 1.
                self.output_index += 1;
                self.output_count = 0;
                if self.params.lookahead_bits() > 8 {
                    State::BackrefCountMsb
                } else {
                    State::BackrefCountLsb
                }
            }
        }
    }

    fn step_backref_count_msb(&mut self) -> State {
        let bit_count = self.params.lookahead_bits() - 8;
        match self.input.get_bits(bit_count) {
            None => State::BackrefCountMsb,
            Some(bits) => {
                self.output_count = (bits as usize) << 8;
                State::BackrefCountLsb
            }
        }
    }

    fn step_backref_count_lsb(&mut self) -> State {
        let bit_count = self.params.lookahead_bits().min(8);
        match self.input.get_bits(bit_count) {
            None => State::BackrefCountLsb,
            Some(bits) => {
                self.output_count |= bits as usize;
                // The encoder stored length - 1.
                self.output_count += 1;
                State::YieldBackref
            }
        }
    }

    /// Copy the back-reference byte by byte so that a count larger than
    /// the offset re-reads bytes written earlier in the same copy,
    /// producing the intended repetition.
    fn step_yield_backref(&mut self) -> State {
        let mask = self.params.window_size() - 1;
        let neg_offset = self.output_index;
        for _ in 0..self.output_count {
            let c = self.window[self.head_index.wrapping_sub(neg_offset) & mask];
            self.out.push(c);
            self.window[self.head_index & mask] = c;
            self.head_index += 1;
        }
        self.output_count = 0;
        State::TagBit
    }
}
