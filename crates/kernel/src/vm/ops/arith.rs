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

//! Arithmetic, comparison and logic operators. Operands are popped right-hand side first.

use crate::vm::dispatch::HandlerTable;
use crate::vm::{ExecState, Flow, ScriptError, ScriptHost};
use intvm_container::Opcode;
use intvm_var::v_bool_int;
use std::cmp::Ordering;

macro_rules! binary_op {
    ($name:ident, $method:ident) => {
        fn $name(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
            let rhs = exec.data_stack.pop()?;
            let lhs = exec.data_stack.pop()?;
            exec.data_stack.push(lhs.$method(&rhs)?);
            Ok(Flow::Continue)
        }
    };
}

macro_rules! unary_op {
    ($name:ident, $method:ident) => {
        fn $name(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
            let v = exec.data_stack.pop()?;
            exec.data_stack.push(v.$method()?);
            Ok(Flow::Continue)
        }
    };
}

macro_rules! comparison_op {
    ($name:ident, $($ordering:pat_param)|+) => {
        fn $name(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
            let rhs = exec.data_stack.pop()?;
            let lhs = exec.data_stack.pop()?;
            let ordering = lhs.compare(&rhs)?;
            exec.data_stack.push(v_bool_int(matches!(ordering, $($ordering)|+)));
            Ok(Flow::Continue)
        }
    };
}

binary_op!(op_add, add);
binary_op!(op_sub, sub);
binary_op!(op_mul, mul);
binary_op!(op_div, div);
binary_op!(op_mod, modulus);
binary_op!(op_bit_and, bitand);
binary_op!(op_bit_or, bitor);
binary_op!(op_bit_xor, bitxor);
binary_op!(op_concat, concat);

unary_op!(op_bit_not, bitnot);
unary_op!(op_floor, floor);
unary_op!(op_negate, negative);

comparison_op!(op_lt, Ordering::Less);
comparison_op!(op_le, Ordering::Less | Ordering::Equal);
comparison_op!(op_gt, Ordering::Greater);
comparison_op!(op_ge, Ordering::Greater | Ordering::Equal);

fn op_eq(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let rhs = exec.data_stack.pop()?;
    let lhs = exec.data_stack.pop()?;
    exec.data_stack.push(v_bool_int(lhs.eq_value(&rhs)?));
    Ok(Flow::Continue)
}

fn op_ne(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let rhs = exec.data_stack.pop()?;
    let lhs = exec.data_stack.pop()?;
    exec.data_stack.push(v_bool_int(!lhs.eq_value(&rhs)?));
    Ok(Flow::Continue)
}

// Both operands are always evaluated; there is no short circuit at this level.
fn op_and(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let rhs = exec.data_stack.pop_logical()?;
    let lhs = exec.data_stack.pop_logical()?;
    exec.data_stack.push(v_bool_int(lhs && rhs));
    Ok(Flow::Continue)
}

fn op_or(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let rhs = exec.data_stack.pop_logical()?;
    let lhs = exec.data_stack.pop_logical()?;
    exec.data_stack.push(v_bool_int(lhs || rhs));
    Ok(Flow::Continue)
}

fn op_not(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let v = exec.data_stack.pop_logical()?;
    exec.data_stack.push(v_bool_int(!v));
    Ok(Flow::Continue)
}

pub(crate) fn register_arith_ops(table: &mut HandlerTable) {
    table.register(Opcode::Eq, op_eq);
    table.register(Opcode::Ne, op_ne);
    table.register(Opcode::Le, op_le);
    table.register(Opcode::Ge, op_ge);
    table.register(Opcode::Lt, op_lt);
    table.register(Opcode::Gt, op_gt);
    table.register(Opcode::Add, op_add);
    table.register(Opcode::Sub, op_sub);
    table.register(Opcode::Mul, op_mul);
    table.register(Opcode::Div, op_div);
    table.register(Opcode::Mod, op_mod);
    table.register(Opcode::And, op_and);
    table.register(Opcode::Or, op_or);
    table.register(Opcode::BitAnd, op_bit_and);
    table.register(Opcode::BitOr, op_bit_or);
    table.register(Opcode::BitXor, op_bit_xor);
    table.register(Opcode::BitNot, op_bit_not);
    table.register(Opcode::Floor, op_floor);
    table.register(Opcode::Not, op_not);
    table.register(Opcode::Negate, op_negate);
    table.register(Opcode::Concat, op_concat);
}
