#![no_main]

use bitstream::BitReader;
use codec::{receive_destroy, receive_new, receive_update};
use demo_types::{demo_registry, ComponentStore};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let registry = demo_registry().expect("demo registry must build");
    let mut store = ComponentStore::new();

    // Interpret the input as a sequence of framed messages: one control
    // byte (op + type id), one entity byte, then payload bits for the rest
    // of the frame. Malformed payloads must error, never panic.
    let mut idx = 0usize;
    while idx + 2 < data.len() && idx < 4096 {
        let op = data[idx] % 3;
        let data_type_id = u32::from(data[idx] >> 2);
        let entity_id = u32::from(data[idx + 1]);
        let len = (data[idx + 2] as usize % 16).saturating_add(1);
        idx += 3;

        let end = (idx + len).min(data.len());
        let frame = &data[idx..end];
        idx = end;

        let mut reader = BitReader::new(frame);
        match op {
            0 => {
                let _ = receive_new(&registry, &mut reader, entity_id, data_type_id, &mut store);
            }
            1 => {
                let _ = receive_update(&registry, &mut reader, entity_id, data_type_id, &mut store);
            }
            _ => {
                receive_destroy(&registry, entity_id, data_type_id, &mut store);
            }
        }
    }
});
