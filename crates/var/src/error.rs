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

use crate::VarType;
use thiserror::Error;

/// Failures of the value-level operations (arithmetic, comparison, coercion).
/// The VM lifts these into its own script error type.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum VarError {
    #[error("type mismatch in `{op}`: {lhs} and {rhs}")]
    BinaryTypeMismatch {
        op: &'static str,
        lhs: VarType,
        rhs: VarType,
    },
    #[error("type mismatch in `{op}`: {operand}")]
    UnaryTypeMismatch { op: &'static str, operand: VarType },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in `{0}`")]
    Overflow(&'static str),
}
