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

use intvm_var::{VarError, VarType};
use thiserror::Error;

/// A fault raised by an opcode handler. These never escape a run: the engine logs them, resets
/// the stacks and carries on as if the call had completed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("stack underflow")]
    StackUnderflow,
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: VarType,
    },
    #[error("address {0} is outside the code segment")]
    AddressOutOfRange(i64),
    #[error("unknown opcode {0:#06x}")]
    UnknownOpcode(u16),
    #[error("division by zero")]
    DivisionByZero,
    #[error("local variable {index} out of range ({count} slots)")]
    LocalOutOfRange { index: i64, count: usize },
    #[error("stack slot {0} out of range")]
    SlotOutOfRange(i64),
    #[error("no string table entry at offset {0}")]
    UnresolvedString(u32),
    #[error("unknown procedure {0}")]
    UnknownProcedure(String),
    #[error("procedure `{procedure}` takes {expected} arguments, called with {actual}")]
    ArgumentCountMismatch {
        procedure: String,
        expected: u32,
        actual: i64,
    },
    #[error("tick limit of {0} instructions exceeded")]
    TickLimitExceeded(usize),
    #[error(transparent)]
    Value(VarError),
}

impl From<VarError> for ScriptError {
    fn from(e: VarError) -> Self {
        match e {
            VarError::DivisionByZero => ScriptError::DivisionByZero,
            e => ScriptError::Value(e),
        }
    }
}
