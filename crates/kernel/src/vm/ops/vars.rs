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

//! Frame registers and variables: base-relative stack slots, per-instance locals, and the
//! map, global and external variables owned by the host.

use crate::vm::dispatch::HandlerTable;
use crate::vm::ops::degrade;
use crate::vm::{ExecState, Flow, ScriptError, ScriptHost};
use intvm_container::Opcode;
use intvm_var::v_int;

/// Opens an argument frame. The argument count on top of the data stack stays put; `dvar_base`
/// moves to the first argument below it and the previous base is saved on the return stack.
fn op_push_base(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let top = exec.data_stack.top()?;
    let argument_count = match top.as_integer() {
        Some(n) if n >= 0 => n as usize,
        _ => {
            return Err(ScriptError::TypeMismatch {
                expected: "argument count",
                found: top.type_code(),
            });
        }
    };
    let base = exec
        .data_stack
        .len()
        .checked_sub(argument_count + 1)
        .ok_or(ScriptError::StackUnderflow)?;
    exec.return_stack.push(v_int(exec.dvar_base as i64));
    exec.dvar_base = base;
    Ok(Flow::Continue)
}

fn op_pop_base(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let base = exec.return_stack.pop_integer()?;
    exec.dvar_base = usize::try_from(base).map_err(|_| ScriptError::SlotOutOfRange(base))?;
    Ok(Flow::Continue)
}

/// Discards the argument frame and everything above it.
fn op_pop_to_base(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.data_stack.truncate(exec.dvar_base);
    Ok(Flow::Continue)
}

/// Marks the current top of the data stack as the start of the script's globals.
fn op_set_global(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.svar_base = exec.data_stack.len();
    Ok(Flow::Continue)
}

fn op_fetch(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let offset = exec.data_stack.pop_integer()?;
    let slot = ExecState::frame_slot(exec.dvar_base, offset)?;
    let v = exec.data_stack.get(slot)?.clone();
    exec.data_stack.push(v);
    Ok(Flow::Continue)
}

fn op_store(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let offset = exec.data_stack.pop_integer()?;
    let value = exec.data_stack.pop()?;
    let slot = ExecState::frame_slot(exec.dvar_base, offset)?;
    exec.data_stack.set(slot, value)?;
    Ok(Flow::Continue)
}

fn op_fetch_global(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let offset = exec.data_stack.pop_integer()?;
    let slot = ExecState::frame_slot(exec.svar_base, offset)?;
    let v = exec.data_stack.get(slot)?.clone();
    exec.data_stack.push(v);
    Ok(Flow::Continue)
}

fn op_store_global(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let offset = exec.data_stack.pop_integer()?;
    let value = exec.data_stack.pop()?;
    let slot = ExecState::frame_slot(exec.svar_base, offset)?;
    exec.data_stack.set(slot, value)?;
    Ok(Flow::Continue)
}

fn op_fetch_external(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let name = exec.data_stack.pop_string()?;
    let value = degrade(host.fetch_external(&name), v_int(0), "fetch_external");
    exec.data_stack.push(value);
    Ok(Flow::Continue)
}

fn op_store_external(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let name = exec.data_stack.pop_string()?;
    let value = exec.data_stack.pop()?;
    degrade(host.store_external(&name, value), (), "store_external");
    Ok(Flow::Continue)
}

fn op_export_var(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let name = exec.data_stack.pop_string()?;
    degrade(host.export_var(&name), (), "export_var");
    Ok(Flow::Continue)
}

fn op_local_var(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let index = exec.data_stack.pop_integer()?;
    let v = exec.local(index)?.clone();
    exec.data_stack.push(v);
    Ok(Flow::Continue)
}

fn op_set_local_var(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let value = exec.data_stack.pop()?;
    let index = exec.data_stack.pop_integer()?;
    exec.set_local(index, value)?;
    Ok(Flow::Continue)
}

fn op_map_var(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let index = exec.data_stack.pop_integer()?;
    let value = degrade(host.map_var(index), v_int(0), "map_var");
    exec.data_stack.push(value);
    Ok(Flow::Continue)
}

fn op_set_map_var(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let value = exec.data_stack.pop()?;
    let index = exec.data_stack.pop_integer()?;
    degrade(host.set_map_var(index, value), (), "set_map_var");
    Ok(Flow::Continue)
}

fn op_global_var(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let index = exec.data_stack.pop_integer()?;
    let value = degrade(host.global_var(index), v_int(0), "global_var");
    exec.data_stack.push(value);
    Ok(Flow::Continue)
}

fn op_set_global_var(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let value = exec.data_stack.pop()?;
    let index = exec.data_stack.pop_integer()?;
    degrade(host.set_global_var(index, value), (), "set_global_var");
    Ok(Flow::Continue)
}

pub(crate) fn register_var_ops(table: &mut HandlerTable) {
    table.register(Opcode::PushBase, op_push_base);
    table.register(Opcode::PopBase, op_pop_base);
    table.register(Opcode::PopToBase, op_pop_to_base);
    table.register(Opcode::SetGlobal, op_set_global);
    table.register(Opcode::Fetch, op_fetch);
    table.register(Opcode::Store, op_store);
    table.register(Opcode::FetchGlobal, op_fetch_global);
    table.register(Opcode::StoreGlobal, op_store_global);
    table.register(Opcode::FetchExternal, op_fetch_external);
    table.register(Opcode::StoreExternal, op_store_external);
    table.register(Opcode::ExportVar, op_export_var);
    table.register(Opcode::LocalVar, op_local_var);
    table.register(Opcode::SetLocalVar, op_set_local_var);
    table.register(Opcode::MapVar, op_map_var);
    table.register(Opcode::SetMapVar, op_set_map_var);
    table.register(Opcode::GlobalVar, op_global_var);
    table.register(Opcode::SetGlobalVar, op_set_global_var);
}
