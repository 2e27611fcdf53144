//! Per-function compilation state: stack-frame layout, the scoped symbol table, and the label
//! stacks that `break`/`continue`/`default`/the epilogue jump read from.

use indexmap::IndexMap;

use crate::error::CompileError;

const WORD: i32 = 4;
/// Outgoing-argument storage reserved for calls made *from* this frame (§3.2's `6*word + 8*word +
/// 20*word` sum); distinct from [`CALL_ARGS_SIZE`], the 16 bytes this frame itself reserves at its
/// own low end for *its caller's* callee-accessible outgoing-argument storage.
const OUTGOING_ARGS_SIZE: i32 = 20 * WORD;
const OVERHEAD: i32 = 6 * WORD;
const SPILL_AREA: i32 = 8 * WORD;
/// `call_args_size` per §3.2/§4.3: the first 16 bytes of every frame (`0..15($fp)`) are reserved for
/// callee-accessible outgoing-argument storage, so the local-variable area starts at byte 16.
const CALL_ARGS_SIZE: i32 = 16;

/// `frame_size = declarations_bytes + 6*word (overhead) + 8*word (spill area) + 20*word (outgoing
/// args)`.
pub fn frame_size_for(declarations_bytes: i32) -> i32 {
    declarations_bytes + OVERHEAD + SPILL_AREA + OUTGOING_ARGS_SIZE
}

type SymbolKey = (String, String);

#[derive(Debug)]
pub struct FunctionContext {
    pub frame_size: i32,
    pub epilogue_label: String,
    offset_by_key: IndexMap<SymbolKey, i32>,
    key_by_offset: IndexMap<i32, SymbolKey>,
    scopes: Vec<String>,
    next_local_offset: i32,
    break_targets: Vec<String>,
    continue_targets: Vec<String>,
    default_targets: Vec<String>,
}

impl FunctionContext {
    pub fn new(frame_size: i32, epilogue_label: impl Into<String>) -> Self {
        Self {
            frame_size,
            epilogue_label: epilogue_label.into(),
            offset_by_key: IndexMap::new(),
            key_by_offset: IndexMap::new(),
            scopes: Vec::new(),
            next_local_offset: CALL_ARGS_SIZE,
            break_targets: Vec::new(),
            continue_targets: Vec::new(),
            default_targets: Vec::new(),
        }
    }

    pub fn enter_scope(&mut self, scope_id: impl Into<String>) {
        self.scopes.push(scope_id.into());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn local_area_limit(&self) -> i32 {
        self.frame_size - 2 * WORD
    }

    /// Reserves a fresh local slot for `name` in the innermost active scope. Returns the existing
    /// offset (without reserving again) if `name` was already declared in that exact scope.
    pub fn place_local(&mut self, name: &str) -> Result<i32, CompileError> {
        let scope = self
            .scopes
            .last()
            .cloned()
            .ok_or_else(|| CompileError::internal("place_local called with no active scope"))?;
        let key = (name.to_string(), scope);
        if let Some(&offset) = self.offset_by_key.get(&key) {
            return Ok(offset);
        }
        let offset = self.next_local_offset;
        if offset >= self.local_area_limit() {
            return Err(CompileError::internal(format!(
                "frame has no room left for local `{name}` (offset {offset} >= limit {})",
                self.local_area_limit()
            )));
        }
        self.next_local_offset += WORD;
        self.key_by_offset.insert(offset, key.clone());
        self.offset_by_key.insert(key, offset);
        Ok(offset)
    }

    /// Records `name` at a fixed offset outside this frame (an incoming argument slot).
    pub fn place_argument(&mut self, name: &str, offset: i32) -> Result<(), CompileError> {
        if offset < self.frame_size {
            return Err(CompileError::internal(format!(
                "argument slot for `{name}` at {offset} falls inside the local frame (size {})",
                self.frame_size
            )));
        }
        let scope = self
            .scopes
            .last()
            .cloned()
            .ok_or_else(|| CompileError::internal("place_argument called with no active scope"))?;
        let key = (name.to_string(), scope);
        self.key_by_offset.insert(offset, key.clone());
        self.offset_by_key.insert(key, offset);
        Ok(())
    }

    /// Reserves `size` contiguous word slots for an array, plus a `name -> base` alias entry.
    pub fn reserve_array(&mut self, name: &str, size: i32) -> Result<i32, CompileError> {
        let scope = self
            .scopes
            .last()
            .cloned()
            .ok_or_else(|| CompileError::internal("reserve_array called with no active scope"))?;
        if self.offset_by_key.contains_key(&(name.to_string(), scope.clone())) {
            return Err(CompileError::unsupported("Variable", format!("array `{name}` redeclared in the same scope")));
        }
        let base = self.next_local_offset;
        let needed = size * WORD;
        if base + needed > self.local_area_limit() {
            return Err(CompileError::internal(format!(
                "frame has no room left for array `{name}[{size}]`"
            )));
        }
        for i in 0..size {
            let elem_key = (format!("{name}@{i}"), scope.clone());
            let elem_offset = base + i * WORD;
            self.key_by_offset.insert(elem_offset, elem_key.clone());
            self.offset_by_key.insert(elem_key, elem_offset);
        }
        self.next_local_offset += needed;
        self.offset_by_key.insert((name.to_string(), scope), base);
        Ok(base)
    }

    /// Searches active scopes innermost-out for `name`'s stack offset.
    pub fn offset_of(&self, name: &str) -> Result<i32, CompileError> {
        for scope in self.scopes.iter().rev() {
            if let Some(&offset) = self.offset_by_key.get(&(name.to_string(), scope.clone())) {
                return Ok(offset);
            }
        }
        Err(CompileError::internal(format!("local `{name}` not found in any active scope")))
    }

    /// Same lookup as [`Self::offset_of`], named for array-base use sites for readability.
    pub fn array_base_offset(&self, name: &str) -> Result<i32, CompileError> {
        self.offset_of(name)
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .rev()
            .any(|scope| self.offset_by_key.contains_key(&(name.to_string(), scope.clone())))
    }

    pub fn push_loop_labels(&mut self, continue_label: impl Into<String>, break_label: impl Into<String>) {
        self.continue_targets.push(continue_label.into());
        self.break_targets.push(break_label.into());
    }

    pub fn pop_loop_labels(&mut self) {
        self.continue_targets.pop();
        self.break_targets.pop();
    }

    pub fn push_switch_labels(&mut self, default_label: impl Into<String>, break_label: impl Into<String>) {
        self.default_targets.push(default_label.into());
        self.break_targets.push(break_label.into());
    }

    pub fn pop_switch_labels(&mut self) {
        self.default_targets.pop();
        self.break_targets.pop();
    }

    pub fn break_label(&self) -> Result<&str, CompileError> {
        self.break_targets
            .last()
            .map(String::as_str)
            .ok_or_else(|| CompileError::unsupported("Break", "break outside a loop or switch"))
    }

    pub fn continue_label(&self) -> Result<&str, CompileError> {
        self.continue_targets
            .last()
            .map(String::as_str)
            .ok_or_else(|| CompileError::unsupported("Continue", "continue outside a loop"))
    }

    pub fn default_label(&self) -> Result<&str, CompileError> {
        self.default_targets
            .last()
            .map(String::as_str)
            .ok_or_else(|| CompileError::internal("default label requested outside a switch"))
    }
}
