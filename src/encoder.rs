// src/encoder.rs
//! Streaming LZSS encoder.
//!
//! Input is staged in the upper half of a double-width buffer; the lower
//! half holds the backlog of already-processed bytes so matches can reach
//! across sink boundaries. A per-byte-value predecessor index keeps the
//! longest-match search proportional to chain length instead of window
//! size. The whole thing is a cooperative state machine: `sink` feeds it,
//! `poll` runs it until it needs more input, `finish` drains the tail.

use crate::bitwriter::BitWriter;
use crate::params::{Params, TAG_BACKREF, TAG_LITERAL};

/// End-of-chain sentinel in the predecessor index.
const NO_PREDECESSOR: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Input region can accept more bytes.
    NotFull,
    /// Input region is full (or finishing); index not yet built.
    Filled,
    /// Scanning the input region for matches.
    Search,
    /// Emit the literal/backref tag for the pending result.
    YieldTagBit,
    /// Emit the literal byte itself.
    YieldLiteral,
    /// Drain the backref index field.
    YieldBrIndex,
    /// Drain the backref count field.
    YieldBrLength,
    /// Slide unprocessed input down into the backlog.
    SaveBacklog,
    /// Pad and emit the trailing partial byte.
    FlushBits,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkResult {
    Ok,
    /// Sink after `finish`, or while the input region is being processed.
    Misuse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult {
    /// Input region exhausted; sink more or finish.
    Empty,
    /// More output pending; poll again.
    More,
    Misuse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishResult {
    Done,
    /// Output remains; poll, then finish again.
    More,
}

pub struct Encoder {
    params: Params,
    /// `[0, W)` backlog, `[W, W + input_size)` current input.
    buffer: Vec<u8>,
    /// For each buffer position, the nearest earlier position holding the
    /// same byte value, or `NO_PREDECESSOR`.
    search_index: Vec<i32>,
    input_size: usize,
    match_scan_index: usize,
    match_pos: usize,
    match_length: usize,
    /// Staging register for fields wider than one push.
    outgoing_bits: u16,
    outgoing_bits_count: u8,
    finishing: bool,
    state: State,
    out: BitWriter,
}

impl Encoder {
    pub fn new(params: Params) -> Self {
        let buf_size = 2 * params.window_size();
        Encoder {
            params,
            buffer: vec![0u8; buf_size],
            search_index: vec![NO_PREDECESSOR; buf_size],
            input_size: 0,
            match_scan_index: 0,
            match_pos: 0,
            match_length: 0,
            outgoing_bits: 0,
            outgoing_bits_count: 0,
            finishing: false,
            state: State::NotFull,
            out: BitWriter::new(),
        }
    }

    /// Return the instance to its freshly-constructed state so it can be
    /// reused for another stream.
    pub fn reset(&mut self) {
        self.buffer.fill(0);
        self.input_size = 0;
        self.match_scan_index = 0;
        self.match_pos = 0;
        self.match_length = 0;
        self.outgoing_bits = 0;
        self.outgoing_bits_count = 0;
        self.finishing = false;
        self.state = State::NotFull;
        self.out.reset();
    }

    /// Copy as much of `data` as fits into the input region. Returns the
    /// status and the number of bytes consumed.
    pub fn sink(&mut self, data: &[u8]) -> (SinkResult, usize) {
        if self.finishing {
            return (SinkResult::Misuse, 0);
        }
        if self.state != State::NotFull {
            return (SinkResult::Misuse, 0);
        }

        let window = self.params.window_size();
        let write_offset = window + self.input_size;
        let rem = window - self.input_size;
        let n = rem.min(data.len());

        self.buffer[write_offset..write_offset + n].copy_from_slice(&data[..n]);
        self.input_size += n;
        if n == rem {
            self.state = State::Filled;
        }
        (SinkResult::Ok, n)
    }

    /// Run the state machine until the input region is exhausted.
    pub fn poll(&mut self) -> PollResult {
        loop {
            match self.state {
                State::NotFull | State::Done => return PollResult::Empty,
                State::Filled => {
                    self.build_index();
                    self.state = State::Search;
                }
                State::Search => self.state = self.step_search(),
                State::YieldTagBit => self.state = self.yield_tag_bit(),
                State::YieldLiteral => self.state = self.yield_literal(),
                State::YieldBrIndex => self.state = self.yield_br_index(),
                State::YieldBrLength => self.state = self.yield_br_length(),
                State::SaveBacklog => {
                    self.save_backlog();
                    self.state = State::NotFull;
                }
                State::FlushBits => self.state = self.flush_bit_buffer(),
            }
        }
    }

    /// Latch end-of-input. A partially filled region is promoted so its
    /// tail gets processed; returns `Done` once the machine has flushed.
    pub fn finish(&mut self) -> FinishResult {
        self.finishing = true;
        if self.state == State::NotFull {
            self.state = State::Filled;
        }
        if self.state == State::Done {
            FinishResult::Done
        } else {
            FinishResult::More
        }
    }

    /// Completed output bytes accumulated so far.
    pub fn output(&self) -> &[u8] {
        self.out.bytes()
    }

    pub fn into_output(self) -> Vec<u8> {
        self.out.into_bytes()
    }

    // ── Indexing ─────────────────────────────────────────────────────────────

    /// One pass over backlog + input builds flattened per-byte-value
    /// chains: `search_index[i]` points at the previous occurrence of
    /// `buffer[i]`, threaded through a 256-entry last-seen table.
    fn build_index(&mut self) {
        let end = self.params.window_size() + self.input_size;
        let mut last = [NO_PREDECESSOR; 256];
        for i in 0..end {
            let v = self.buffer[i] as usize;
            self.search_index[i] = last[v];
            last[v] = i as i32;
        }
    }

    // ── Search ───────────────────────────────────────────────────────────────

    fn step_search(&mut self) -> State {
        let window = self.params.window_size();
        let lookahead = self.params.lookahead_size();
        let msi = self.match_scan_index;

        // While more input may arrive, keep a full lookahead in reserve so
        // matches straddling the next sink are not cut short. Once
        // finishing, scan to the last byte.
        let bias = if self.finishing { 1 } else { lookahead };
        if msi + bias > self.input_size {
            return if self.finishing { State::FlushBits } else { State::SaveBacklog };
        }

        let end = window + msi;
        let start = end - window;
        let max_possible = lookahead.min(self.input_size - msi);

        match self.find_longest_match(start, end, max_possible) {
            Some((pos, length)) => {
                debug_assert!(pos <= window);
                self.match_pos = pos;
                self.match_length = length;
                State::YieldTagBit
            }
            None => {
                self.match_scan_index += 1;
                self.match_length = 0;
                State::YieldTagBit
            }
        }
    }

    /// Longest match for the needle at `buffer[end..end + maxlen]` among
    /// positions in `[start, end)`, walking the predecessor chain. Returns
    /// the (negative offset, length) pair, or `None` when the best
    /// candidate does not beat the break-even point.
    fn find_longest_match(&self, start: usize, end: usize, maxlen: usize) -> Option<(usize, usize)> {
        let buf = &self.buffer;
        let mut best_len = 0usize;
        let mut best_index: Option<usize> = None;

        let mut pos = self.search_index[end];
        while pos >= start as i32 {
            let p = pos as usize;

            // A candidate that cannot beat the current best is skipped on
            // a single byte compare. The chain already guarantees byte 0
            // matches, so this probe is at the first position that counts.
            if buf[p + best_len] != buf[end + best_len] {
                pos = self.search_index[p];
                continue;
            }

            let mut len = 1;
            while len < maxlen {
                if buf[p + len] != buf[end + len] {
                    break;
                }
                len += 1;
            }

            if len > best_len {
                best_len = len;
                best_index = Some(p);
                if len == maxlen {
                    break; // won't find better
                }
            }
            pos = self.search_index[p];
        }

        // Compare lengths against break_even/8 instead of bit counts
        // against 8*len so nothing can overflow; the quotient is at least
        // 1 for every legal geometry.
        if best_len > self.params.break_even_point() / 8 {
            best_index.map(|idx| (end - idx, best_len))
        } else {
            None
        }
    }

    // ── Emission ─────────────────────────────────────────────────────────────

    fn yield_tag_bit(&mut self) -> State {
        if self.match_length == 0 {
            self.out.push_bits(1, TAG_LITERAL);
            State::YieldLiteral
        } else {
            self.out.push_bits(1, TAG_BACKREF);
            self.outgoing_bits = (self.match_pos - 1) as u16;
            self.outgoing_bits_count = self.params.window_bits();
            State::YieldBrIndex
        }
    }

    fn yield_literal(&mut self) -> State {
        // The no-match branch of the search pre-incremented the scan
        // index, so the literal to emit sits one byte back.
        let processed = self.match_scan_index - 1;
        let c = self.buffer[self.params.window_size() + processed];
        self.out.push_bits(8, c);
        State::Search
    }

    fn yield_br_index(&mut self) -> State {
        if self.push_outgoing_bits() > 0 {
            State::YieldBrIndex
        } else {
            self.outgoing_bits = (self.match_length - 1) as u16;
            self.outgoing_bits_count = self.params.lookahead_bits();
            State::YieldBrLength
        }
    }

    fn yield_br_length(&mut self) -> State {
        if self.push_outgoing_bits() > 0 {
            State::YieldBrLength
        } else {
            self.match_scan_index += self.match_length;
            self.match_length = 0;
            State::Search
        }
    }

    /// Drain up to 8 bits from the top of the staging register. A zero
    /// return means the register is empty.
    fn push_outgoing_bits(&mut self) -> u8 {
        let (count, bits) = if self.outgoing_bits_count > 8 {
            (8, (self.outgoing_bits >> (self.outgoing_bits_count - 8)) as u8)
        } else {
            (self.outgoing_bits_count, self.outgoing_bits as u8)
        };
        if count > 0 {
            self.out.push_bits(count, bits);
            self.outgoing_bits_count -= count;
        }
        count
    }

    // ── Backlog / flush ──────────────────────────────────────────────────────

    /// Slide everything from the scan point onward down to the start of
    /// the buffer: the window preceding the unprocessed tail becomes the
    /// new backlog, and the tail becomes the head of the next input region.
    fn save_backlog(&mut self) {
        let msi = self.match_scan_index;
        self.buffer.copy_within(msi.., 0);
        self.match_scan_index = 0;
        self.input_size -= msi;
    }

    fn flush_bit_buffer(&mut self) -> State {
        self.out.flush();
        State::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(window_bits: u8, lookahead_bits: u8, input: &[u8]) -> Vec<u8> {
        let mut enc = Encoder::new(Params::new(window_bits, lookahead_bits).unwrap());
        let mut consumed = 0;
        while consumed < input.len() {
            let (res, n) = enc.sink(&input[consumed..]);
            assert_eq!(res, SinkResult::Ok);
            consumed += n;
            enc.poll();
        }
        while enc.finish() == FinishResult::More {
            enc.poll();
        }
        enc.into_output()
    }

    #[test]
    fn empty_input_produces_empty_output() {
        assert_eq!(encode(8, 3, b""), Vec::<u8>::new());
    }

    #[test]
    fn golden_single_literal() {
        // Tag 1 + 'A' + 7 pad bits.
        assert_eq!(encode(8, 3, b"A"), vec![0xA0, 0x80]);
    }

    #[test]
    fn golden_repeated_byte_self_overlaps() {
        // 'A' as a literal, then one backref at offset 1 covering the
        // remaining 7 bytes: 1 01000001 | 0 00000000 110 | pad.
        assert_eq!(encode(8, 3, b"AAAAAAAA"), vec![0xA0, 0x80, 0x30]);
    }

    #[test]
    fn golden_periodic_input() {
        // A, B, C literals, backref (offset 3, length 8), literal C:
        // 48 bits exactly, no padding.
        assert_eq!(
            encode(8, 3, b"ABCABCABCABC"),
            vec![0xA0, 0xD0, 0xA8, 0x60, 0x2F, 0x43]
        );
    }

    #[test]
    fn two_byte_match_beats_break_even_at_small_geometry() {
        // At (8, 3) the break-even quotient is 1, so a 2-byte repeat is
        // already encoded as a backref: output must shrink below the
        // 9-bits-per-literal floor.
        let out = encode(8, 3, b"ababababab");
        assert!(out.len() * 8 < 9 * 10, "no backrefs emitted: {:?}", out);
    }

    #[test]
    fn sink_after_finish_is_misuse() {
        let mut enc = Encoder::new(Params::new(8, 3).unwrap());
        enc.sink(b"abc");
        enc.finish();
        let (res, n) = enc.sink(b"def");
        assert_eq!(res, SinkResult::Misuse);
        assert_eq!(n, 0);
    }

    #[test]
    fn sink_while_processing_is_misuse() {
        // A 16-byte window fills immediately and flips the machine out of
        // the accepting state until polled.
        let mut enc = Encoder::new(Params::new(4, 3).unwrap());
        let (res, n) = enc.sink(&[0u8; 16]);
        assert_eq!(res, SinkResult::Ok);
        assert_eq!(n, 16);
        let (res, n) = enc.sink(b"x");
        assert_eq!(res, SinkResult::Misuse);
        assert_eq!(n, 0);
        assert_eq!(enc.poll(), PollResult::Empty);
        let (res, _) = enc.sink(b"x");
        assert_eq!(res, SinkResult::Ok);
    }

    #[test]
    fn partial_sink_reports_consumed_count() {
        let mut enc = Encoder::new(Params::new(4, 3).unwrap());
        let (res, n) = enc.sink(&[7u8; 40]);
        assert_eq!(res, SinkResult::Ok);
        assert_eq!(n, 16);
    }

    #[test]
    fn reset_clears_backlog_between_streams() {
        let mut enc = Encoder::new(Params::new(8, 3).unwrap());
        enc.sink(b"first stream first stream");
        enc.poll();
        while enc.finish() == FinishResult::More {
            enc.poll();
        }
        let first = enc.output().to_vec();

        enc.reset();
        enc.sink(b"first stream first stream");
        enc.poll();
        while enc.finish() == FinishResult::More {
            enc.poll();
        }
        assert_eq!(enc.output(), &first[..]);
    }

    #[test]
    fn output_is_available_incrementally() {
        let mut enc = Encoder::new(Params::new(4, 3).unwrap());
        // Two full windows: the first is processed as soon as we poll.
        enc.sink(&[b'z'; 16]);
        enc.poll();
        assert!(!enc.output().is_empty());
        let prefix = enc.output().to_vec();

        enc.sink(&[b'z'; 16]);
        enc.poll();
        while enc.finish() == FinishResult::More {
            enc.poll();
        }
        assert_eq!(&enc.output()[..prefix.len()], &prefix[..]);
    }
}
