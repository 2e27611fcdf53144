//! Fuzz target: constant-fold arbitrary expression trees.
//!
//! `fold_constant` is a total function over any `Node`: non-constant subtrees and overflow-free
//! wraparound arithmetic are both `Result::Err`/defined behavior, never a panic. A crash here means
//! the folder hit a node shape its `match` doesn't actually handle safely, or an arithmetic op that
//! isn't using the wrapping variant it should.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mips_cc::{fold_constant, Node};

fuzz_target!(|node: Node| {
    let _ = fold_constant(&node);
});
