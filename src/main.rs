//! lzring CLI
//! Usage:
//!   lzring compress   <input_file> <output_file> [window_bits] [lookahead_bits]
//!   lzring decompress <input_file> <output_file> [window_bits] [lookahead_bits]
//!
//! Both sides of a stream must use the same parameter pair; nothing in
//! the output records it. Defaults are 11/4.

use std::{env, fs, process};

const DEFAULT_WINDOW_BITS: u8 = 11;
const DEFAULT_LOOKAHEAD_BITS: u8 = 4;

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  lzring compress   <input> <output> [window_bits] [lookahead_bits]");
    eprintln!("  lzring decompress <input> <output> [window_bits] [lookahead_bits]");
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 4 || args.len() > 6 {
        usage();
    }

    let command     = &args[1];
    let input_path  = &args[2];
    let output_path = &args[3];

    let window_bits = match args.get(4) {
        Some(s) => s.parse().unwrap_or_else(|_| usage()),
        None => DEFAULT_WINDOW_BITS,
    };
    let lookahead_bits = match args.get(5) {
        Some(s) => s.parse().unwrap_or_else(|_| usage()),
        None => DEFAULT_LOOKAHEAD_BITS,
    };

    let input = fs::read(input_path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", input_path, e);
        process::exit(1);
    });

    let result = match command.as_str() {
        "compress"   => lzring::compress(window_bits, lookahead_bits, &input),
        "decompress" => lzring::decompress(window_bits, lookahead_bits, &input),
        _ => {
            eprintln!("Unknown command: {}", command);
            process::exit(1);
        }
    };

    match result {
        Ok(output) => {
            fs::write(output_path, &output).unwrap_or_else(|e| {
                eprintln!("Failed to write {}: {}", output_path, e);
                process::exit(1);
            });
            println!("Done. {} bytes → {} bytes", input.len(), output.len());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
