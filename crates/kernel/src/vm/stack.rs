// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use crate::vm::ScriptError;
use arcstr::ArcStr;
use intvm_var::{Obj, Var, Variant};

/// LIFO storage for runtime values. Each execution owns two: the data stack for operands and
/// arguments, and the return stack for return addresses and saved frame bases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStack {
    values: Vec<Var>,
}

impl ValueStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, v: Var) {
        self.values.push(v);
    }

    pub fn pop(&mut self) -> Result<Var, ScriptError> {
        self.values.pop().ok_or(ScriptError::StackUnderflow)
    }

    pub fn top(&self) -> Result<&Var, ScriptError> {
        self.values.last().ok_or(ScriptError::StackUnderflow)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    /// Slot access counted from the bottom of the stack, for base-relative addressing.
    pub fn get(&self, index: usize) -> Result<&Var, ScriptError> {
        self.values
            .get(index)
            .ok_or(ScriptError::SlotOutOfRange(index as i64))
    }

    pub fn set(&mut self, index: usize, v: Var) -> Result<(), ScriptError> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(ScriptError::SlotOutOfRange(index as i64))?;
        *slot = v;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Var> {
        self.values.iter()
    }

    pub fn pop_integer(&mut self) -> Result<i64, ScriptError> {
        let v = self.pop()?;
        match v.variant() {
            Variant::Int(i) => Ok(*i),
            _ => Err(mismatch("integer", &v)),
        }
    }

    /// An integer or a float, left as-is.
    pub fn pop_number(&mut self) -> Result<Var, ScriptError> {
        let v = self.pop()?;
        match v.variant() {
            Variant::Int(_) | Variant::Float(_) => Ok(v),
            _ => Err(mismatch("number", &v)),
        }
    }

    pub fn pop_string(&mut self) -> Result<ArcStr, ScriptError> {
        let v = self.pop()?;
        match v.variant() {
            Variant::Str(s) => Ok(s.clone()),
            _ => Err(mismatch("string", &v)),
        }
    }

    /// An object handle; integer `0` is accepted as the null handle.
    pub fn pop_object(&mut self) -> Result<Obj, ScriptError> {
        let v = self.pop()?;
        v.as_obj().ok_or_else(|| mismatch("object", &v))
    }

    pub fn pop_logical(&mut self) -> Result<bool, ScriptError> {
        Ok(self.pop()?.is_true())
    }
}

fn mismatch(expected: &'static str, found: &Var) -> ScriptError {
    ScriptError::TypeMismatch {
        expected,
        found: found.type_code(),
    }
}
