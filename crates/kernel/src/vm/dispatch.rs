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

use crate::vm::ops::{
    register_arith_ops, register_control_ops, register_stack_ops, register_var_ops,
    register_world_ops,
};
use crate::vm::{ExecState, ScriptError, ScriptHost};
use ahash::AHashMap;
use intvm_container::Opcode;
use lazy_static::lazy_static;

/// What the run loop should do after a handler returns.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Flow {
    Continue,
    /// Stop the script without error.
    Halt,
}

/// An opcode implementation. Handlers work only through the execution state and the host.
pub type Handler = fn(&mut ExecState, &mut dyn ScriptHost) -> Result<Flow, ScriptError>;

/// Opcode value to handler, filled in by each handler module's `register_*` function.
pub(crate) struct HandlerTable {
    handlers: AHashMap<u16, Handler>,
}

impl HandlerTable {
    fn new() -> Self {
        Self {
            handlers: AHashMap::new(),
        }
    }

    pub(crate) fn register(&mut self, opcode: Opcode, handler: Handler) {
        self.handlers.insert(opcode.code(), handler);
    }
}

lazy_static! {
    static ref HANDLERS: HandlerTable = {
        let mut table = HandlerTable::new();
        register_stack_ops(&mut table);
        register_control_ops(&mut table);
        register_var_ops(&mut table);
        register_arith_ops(&mut table);
        register_world_ops(&mut table);
        table
    };
}

fn op_unknown(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    Err(ScriptError::UnknownOpcode(exec.opcode))
}

/// Resolve a raw opcode. Values with no handler map to one that fails with `UnknownOpcode`.
pub fn dispatch(opcode: u16) -> Handler {
    HANDLERS
        .handlers
        .get(&opcode)
        .copied()
        .unwrap_or(op_unknown)
}
