// src/lib.rs — streaming LZSS codec, bitstream-compatible with heatshrink
//
// Wire format, MSB-first with zero padding on the final byte:
//   stream  := element*
//   element := "1" byte8
//            | "0" index[window_bits] count[lookahead_bits]
// index is the back-reference offset minus one, count its length minus
// one. There is no header: window_bits and lookahead_bits are agreed out
// of band, and the stream simply ends at a byte boundary.

pub mod bitreader;
pub mod bitwriter;
pub mod decoder;
pub mod encoder;
pub mod params;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use params::Params;

use std::io;

fn validate(window_bits: u8, lookahead_bits: u8) -> io::Result<Params> {
    Params::new(window_bits, lookahead_bits).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "invalid codec parameters: window_bits {} lookahead_bits {}",
                window_bits, lookahead_bits
            ),
        )
    })
}

/// Compress `input` in one shot: sink and poll the streaming encoder
/// until everything is consumed, then finish and collect the output.
pub fn compress(window_bits: u8, lookahead_bits: u8, input: &[u8]) -> io::Result<Vec<u8>> {
    let params = validate(window_bits, lookahead_bits)?;
    let mut enc = Encoder::new(params);

    let mut consumed = 0;
    while consumed < input.len() {
        let (res, n) = enc.sink(&input[consumed..]);
        // The façade controls the call sequence, so misuse here would be
        // a bug in this loop, not in the caller.
        debug_assert_eq!(res, encoder::SinkResult::Ok);
        consumed += n;
        enc.poll();
    }
    while enc.finish() == encoder::FinishResult::More {
        enc.poll();
    }
    Ok(enc.into_output())
}

/// Decompress `input` in one shot. Fails with `InvalidData` if the stream
/// requests a copy outside the agreed window/lookahead geometry.
pub fn decompress(window_bits: u8, lookahead_bits: u8, input: &[u8]) -> io::Result<Vec<u8>> {
    let params = validate(window_bits, lookahead_bits)?;
    let mut dec = Decoder::new(params);

    let corrupt = || io::Error::new(io::ErrorKind::InvalidData, "corrupt compressed stream");

    let mut consumed = 0;
    while consumed < input.len() {
        let (_, n) = dec.sink(&input[consumed..]);
        consumed += n;
        if dec.poll() == decoder::PollResult::Error {
            return Err(corrupt());
        }
    }
    while dec.finish() == decoder::FinishResult::More {
        if dec.poll() == decoder::PollResult::Error {
            return Err(corrupt());
        }
    }
    Ok(dec.into_output())
}
