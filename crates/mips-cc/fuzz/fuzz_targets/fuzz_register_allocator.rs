//! Fuzz target: arbitrary request/release sequences over the `$t0..$t7` allocator.
//!
//! Every operation returns `Result`; exhausting the pool or releasing an idle/non-temporary
//! register is an ordinary `Err`, not a panic (§4.2/§8's "register-allocator balance" property). A
//! crash here means some sequence of acquire/release calls got the bit-vector into a state that
//! panics instead of erroring.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mips_cc::RegisterAllocator;

fuzz_target!(|data: &[u8]| {
    let mut alloc = RegisterAllocator::new();
    let mut live: Vec<String> = Vec::new();

    for &byte in data {
        match byte % 3 {
            0 => {
                if let Ok(reg) = alloc.request_free() {
                    live.push(reg);
                }
            }
            1 => {
                if live.is_empty() {
                    continue;
                }
                let idx = usize::from(byte) % live.len();
                let reg = live.remove(idx);
                let _ = alloc.release(&reg);
            }
            _ => {
                // Exercise the snapshot accessor; its length must never exceed the pool size.
                assert!(alloc.live_set().len() <= 8);
            }
        }
    }
});
