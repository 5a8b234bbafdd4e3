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

//! Literal pushes and plain stack shuffling.

use crate::vm::dispatch::HandlerTable;
use crate::vm::{ExecState, Flow, ScriptError, ScriptHost};
use intvm_container::Opcode;
use intvm_var::{Var, v_float, v_int};

fn op_noop(_exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    Ok(Flow::Continue)
}

fn op_push_int(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let value = exec.read_i32()?;
    exec.data_stack.push(v_int(value as i64));
    Ok(Flow::Continue)
}

fn op_push_float(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let value = exec.read_f32()?;
    exec.data_stack.push(v_float(value as f64));
    Ok(Flow::Continue)
}

/// The operand is a table offset. It names an identifier when the next instruction works on
/// external variables, and a string constant otherwise.
fn op_push_string(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let offset = exec.read_u32()?;
    let names_identifier = matches!(
        exec.peek_opcode().and_then(Opcode::decode),
        Some(Opcode::FetchExternal | Opcode::StoreExternal | Opcode::ExportVar)
    );
    let text = if names_identifier {
        exec.container.identifier(offset)
    } else {
        exec.container.string(offset)
    };
    let text = text.cloned().ok_or(ScriptError::UnresolvedString(offset))?;
    exec.data_stack.push(Var::mk_pooled_str(text));
    Ok(Flow::Continue)
}

fn op_pop(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.data_stack.pop()?;
    Ok(Flow::Continue)
}

fn op_dup(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let top = exec.data_stack.top()?.clone();
    exec.data_stack.push(top);
    Ok(Flow::Continue)
}

fn op_swap(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let a = exec.data_stack.pop()?;
    let b = exec.data_stack.pop()?;
    exec.data_stack.push(a);
    exec.data_stack.push(b);
    Ok(Flow::Continue)
}

fn op_data_to_return(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let v = exec.data_stack.pop()?;
    exec.return_stack.push(v);
    Ok(Flow::Continue)
}

fn op_return_to_data(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let v = exec.return_stack.pop()?;
    exec.data_stack.push(v);
    Ok(Flow::Continue)
}

pub(crate) fn register_stack_ops(table: &mut HandlerTable) {
    table.register(Opcode::Noop, op_noop);
    table.register(Opcode::PushInt, op_push_int);
    table.register(Opcode::PushFloat, op_push_float);
    table.register(Opcode::PushString, op_push_string);
    table.register(Opcode::Pop, op_pop);
    table.register(Opcode::Dup, op_dup);
    table.register(Opcode::Swap, op_swap);
    table.register(Opcode::DataToReturn, op_data_to_return);
    table.register(Opcode::ReturnToData, op_return_to_data);
}
