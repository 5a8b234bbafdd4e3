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

//! Control transfer: jumps, conditionals, procedure call and return, and termination.
//!
//! Calling convention: the caller pushes the arguments, then their count, then the procedure
//! index, and executes `Call`. `Call` saves the return address on the return stack and jumps to
//! the body. `Return` pops the result, the argument count and that many arguments, then resumes
//! at the saved address with the result on top of the data stack.

use crate::vm::dispatch::HandlerTable;
use crate::vm::{ExecState, Flow, ScriptError, ScriptHost};
use intvm_container::Opcode;
use intvm_var::v_int;
use tracing::debug;

fn op_critical_start(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.critical = true;
    Ok(Flow::Continue)
}

fn op_critical_done(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.critical = false;
    Ok(Flow::Continue)
}

fn op_jump(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let address = exec.data_stack.pop_integer()?;
    exec.set_program_counter(address)?;
    Ok(Flow::Continue)
}

/// Pops the condition, then the address to continue at when the condition is false.
fn op_if(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let condition = exec.data_stack.pop_logical()?;
    let address = exec.data_stack.pop_integer()?;
    if !condition {
        exec.set_program_counter(address)?;
    }
    Ok(Flow::Continue)
}

fn procedure_by_index(exec: &ExecState, index: i64) -> Result<(String, u32, u32), ScriptError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| exec.container.procedure_at(i))
        .map(|p| (p.name.to_string(), p.body_offset, p.argument_count))
        .ok_or_else(|| ScriptError::UnknownProcedure(format!("#{index}")))
}

fn op_call(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let index = exec.data_stack.pop_integer()?;
    let (name, body, _) = procedure_by_index(exec, index)?;
    debug!(procedure = %name, body, "Calling procedure");
    let return_address = exec.program_counter() as i64;
    exec.return_stack.push(v_int(return_address));
    exec.set_program_counter(body as i64)?;
    Ok(Flow::Continue)
}

fn op_return(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let result = exec.data_stack.pop()?;
    let argument_count = exec.data_stack.pop_integer()?;
    if argument_count < 0 {
        return Err(ScriptError::SlotOutOfRange(argument_count));
    }
    for _ in 0..argument_count {
        exec.data_stack.pop()?;
    }
    let address = exec.return_stack.pop_integer()?;
    exec.data_stack.push(result);
    exec.set_program_counter(address)?;
    Ok(Flow::Continue)
}

/// End of the startup code: the script counts as initialized and control goes back to idle.
fn op_exit_prog(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.initialized = true;
    exec.set_program_counter(0)?;
    Ok(Flow::Continue)
}

fn op_exit(_exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    Ok(Flow::Halt)
}

/// Pops the argument count and procedure index, failing when they disagree with the procedure
/// table.
fn op_check_arg_count(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let actual = exec.data_stack.pop_integer()?;
    let index = exec.data_stack.pop_integer()?;
    let (procedure, _, expected) = procedure_by_index(exec, index)?;
    if expected as i64 != actual {
        return Err(ScriptError::ArgumentCountMismatch {
            procedure,
            expected,
            actual,
        });
    }
    Ok(Flow::Continue)
}

fn op_lookup_string_proc(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let name = exec.data_stack.pop_string()?;
    let index = exec
        .container
        .procedure_index(&name)
        .ok_or_else(|| ScriptError::UnknownProcedure(name.to_string()))?;
    exec.data_stack.push(v_int(index as i64));
    Ok(Flow::Continue)
}

pub(crate) fn register_control_ops(table: &mut HandlerTable) {
    table.register(Opcode::CriticalStart, op_critical_start);
    table.register(Opcode::CriticalDone, op_critical_done);
    table.register(Opcode::Jump, op_jump);
    table.register(Opcode::If, op_if);
    table.register(Opcode::While, op_if);
    table.register(Opcode::Call, op_call);
    table.register(Opcode::Return, op_return);
    table.register(Opcode::ExitProg, op_exit_prog);
    table.register(Opcode::Exit, op_exit);
    table.register(Opcode::CheckArgCount, op_check_arg_count);
    table.register(Opcode::LookupStringProc, op_lookup_string_proc);
}
