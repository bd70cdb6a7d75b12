#![no_main]

use bitstream::{BitReader, BitSource};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 3;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_bit();
            }
            1 => {
                let bits = u32::from(data[idx.saturating_sub(1)] % 32).saturating_add(1);
                let _ = reader.read_bits(bits);
            }
            _ => {
                // Over-wide requests must error, never panic.
                let _ = reader.read_bits(33 + u32::from(data[idx.saturating_sub(1)]));
            }
        }
    }
});
