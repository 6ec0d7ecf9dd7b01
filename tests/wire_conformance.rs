//! Bit-level conformance: golden byte strings, an element-level re-parse
//! of encoder output through an independent BigEndian bit reader, and the
//! break-even rule audited on the wire.

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use lzring::compress;

/// One parsed wire element.
#[derive(Debug, Clone, PartialEq)]
enum Element {
    Lit { byte: u8 },
    Backref { offset: u32, length: u32 },
}

/// Walk a compressed stream with an independent reader. Stops at the
/// first element the remaining bits cannot complete; the zero padding of
/// the final byte can never hold a whole element.
fn parse_elements(stream: &[u8], window_bits: u32, lookahead_bits: u32) -> Vec<Element> {
    let mut elements = Vec::new();
    let mut reader = BitReader::endian(std::io::Cursor::new(stream), BigEndian);

    loop {
        let tag = match reader.read::<u32>(1) {
            Ok(b) => b,
            Err(_) => break,
        };
        if tag == 1 {
            match reader.read::<u32>(8) {
                Ok(b) => elements.push(Element::Lit { byte: b as u8 }),
                Err(_) => break,
            }
        } else {
            let index = match reader.read::<u32>(window_bits) {
                Ok(v) => v,
                Err(_) => break,
            };
            let count = match reader.read::<u32>(lookahead_bits) {
                Ok(v) => v,
                Err(_) => break,
            };
            elements.push(Element::Backref { offset: index + 1, length: count + 1 });
        }
    }
    elements
}

/// Reconstruct the original bytes from parsed elements, copying
/// back-references byte by byte so self-overlap repeats.
fn reconstruct(elements: &[Element]) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    for element in elements {
        match element {
            Element::Lit { byte } => output.push(*byte),
            Element::Backref { offset, length } => {
                let start = output.len().saturating_sub(*offset as usize);
                for k in 0..*length as usize {
                    let byte = output[start + (k % *offset as usize)];
                    output.push(byte);
                }
            }
        }
    }
    output
}

/// Re-serialize parsed elements with the independent writer.
fn rebuild(elements: &[Element], window_bits: u32, lookahead_bits: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = BitWriter::endian(&mut out, BigEndian);
        for element in elements {
            match element {
                Element::Lit { byte } => {
                    writer.write(1, 1u32).unwrap();
                    writer.write(8, *byte as u32).unwrap();
                }
                Element::Backref { offset, length } => {
                    writer.write(1, 0u32).unwrap();
                    writer.write(window_bits, offset - 1).unwrap();
                    writer.write(lookahead_bits, length - 1).unwrap();
                }
            }
        }
        writer.byte_align().unwrap();
    }
    out
}

#[test]
fn golden_byte_strings() {
    assert_eq!(compress(8, 3, b"").unwrap(), Vec::<u8>::new());
    assert_eq!(compress(8, 3, b"A").unwrap(), vec![0xA0, 0x80]);
    assert_eq!(compress(8, 3, b"AAAAAAAA").unwrap(), vec![0xA0, 0x80, 0x30]);
    assert_eq!(
        compress(8, 3, b"ABCABCABCABC").unwrap(),
        vec![0xA0, 0xD0, 0xA8, 0x60, 0x2F, 0x43]
    );
}

#[test]
fn independent_reader_accepts_encoder_output() {
    let input = b"HELLO WORLD THINKS WORLD GREAT";
    let packed = compress(8, 3, input).unwrap();

    let elements = parse_elements(&packed, 8, 3);
    assert_eq!(reconstruct(&elements), input.to_vec());

    // Re-serializing the parsed elements must reproduce the stream
    // byte for byte.
    assert_eq!(rebuild(&elements, 8, 3), packed);
}

#[test]
fn independent_reader_accepts_wide_geometry_output() {
    let input: Vec<u8> = b"wide window, wide lookahead, same wire discipline. ".repeat(30);
    let packed = compress(12, 9, &input).unwrap();

    let elements = parse_elements(&packed, 12, 9);
    assert_eq!(reconstruct(&elements), input);
    assert_eq!(rebuild(&elements, 12, 9), packed);
}

#[test]
fn every_backref_clears_break_even() {
    // The tag + index + count cost must be strictly under the literal
    // cost of the bytes it replaces, i.e. length > (1 + w + l) / 8.
    for (w, l) in [(8u32, 3u32), (10, 4), (11, 4), (13, 7)] {
        let input: Vec<u8> =
            b"she sells sea shells by the sea shore; the shells she sells are sea shells "
                .repeat(12);
        let packed = compress(w as u8, l as u8, &input).unwrap();
        let elements = parse_elements(&packed, w, l);

        let floor = (1 + w + l) / 8;
        let mut backrefs = 0;
        for element in &elements {
            if let Element::Backref { length, .. } = element {
                assert!(*length > floor, "backref of length {} at ({}, {})", length, w, l);
                backrefs += 1;
            }
        }
        assert!(backrefs > 0, "repetitive input produced no backrefs at ({}, {})", w, l);
    }
}
