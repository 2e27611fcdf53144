//! Fixed pool of the eight caller-saved temporaries `$t0..$t7`.
//!
//! The code generator never spills individual expression sub-results; running out of temporaries
//! mid-expression is a hard failure (call sites spill the *live set* around calls instead, see
//! `codegen::call`).

use crate::error::CompileError;

const NUM_TEMPS: usize = 8;

#[derive(Debug, Default)]
pub struct RegisterAllocator {
    used: [bool; NUM_TEMPS],
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the lowest-indexed free `$tN`, marking it used.
    pub fn request_free(&mut self) -> Result<String, CompileError> {
        let slot = self
            .used
            .iter()
            .position(|&used| !used)
            .ok_or_else(|| CompileError::internal("no free temporary registers (all $t0..$t7 in use)"))?;
        self.used[slot] = true;
        Ok(format!("$t{slot}"))
    }

    /// Marks `reg` free again. Fails if `reg` was not in use or is not a temporary register.
    pub fn release(&mut self, reg: &str) -> Result<(), CompileError> {
        let slot = temp_index(reg)
            .ok_or_else(|| CompileError::internal(format!("{reg} is not a temporary register")))?;
        if !self.used[slot] {
            return Err(CompileError::internal(format!("double release of {reg}")));
        }
        self.used[slot] = false;
        Ok(())
    }

    /// Snapshot of every currently-live temporary, lowest index first.
    pub fn live_set(&self) -> Vec<String> {
        (0..NUM_TEMPS)
            .filter(|&slot| self.used[slot])
            .map(|slot| format!("$t{slot}"))
            .collect()
    }

    pub fn is_idle(&self) -> bool {
        self.used.iter().all(|&used| !used)
    }
}

fn temp_index(reg: &str) -> Option<usize> {
    let suffix = reg.strip_prefix("$t")?;
    let idx: usize = suffix.parse().ok()?;
    (idx < NUM_TEMPS).then_some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_lowest_free_slot_first() {
        let mut alloc = RegisterAllocator::new();
        assert_eq!(alloc.request_free().unwrap(), "$t0");
        assert_eq!(alloc.request_free().unwrap(), "$t1");
        alloc.release("$t0").unwrap();
        assert_eq!(alloc.request_free().unwrap(), "$t0");
    }

    #[test]
    fn exhausting_all_slots_is_an_error() {
        let mut alloc = RegisterAllocator::new();
        for _ in 0..8 {
            alloc.request_free().unwrap();
        }
        assert!(alloc.request_free().is_err());
    }

    #[test]
    fn double_release_is_an_error() {
        let mut alloc = RegisterAllocator::new();
        let r = alloc.request_free().unwrap();
        alloc.release(&r).unwrap();
        assert!(alloc.release(&r).is_err());
    }

    #[test]
    fn balanced_sequence_ends_idle() {
        let mut alloc = RegisterAllocator::new();
        let a = alloc.request_free().unwrap();
        let b = alloc.request_free().unwrap();
        alloc.release(&b).unwrap();
        let c = alloc.request_free().unwrap();
        alloc.release(&c).unwrap();
        alloc.release(&a).unwrap();
        assert!(alloc.is_idle());
    }
}
