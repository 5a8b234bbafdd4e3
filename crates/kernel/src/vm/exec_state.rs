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

use crate::vm::{CallContext, ScriptError, ValueStack};
use intvm_container::{CodeReader, Container, ReadError};
use intvm_var::{Obj, Var, v_int};
use std::sync::Arc;

/// The mutable machine state of one script instance, which opcode handlers operate on.
#[derive(Debug, Clone)]
pub struct ExecState {
    pub(crate) container: Arc<Container>,
    code: CodeReader,
    /// The opcode being executed, and where it was read from.
    pub(crate) opcode: u16,
    pub(crate) opcode_offset: usize,
    pub(crate) data_stack: ValueStack,
    pub(crate) return_stack: ValueStack,
    /// Per-instance variables; these survive across calls.
    pub(crate) local_variables: Vec<Var>,
    /// Data stack index of the current procedure's first argument.
    pub(crate) dvar_base: usize,
    /// Data stack index of the script's global variable region.
    pub(crate) svar_base: usize,
    pub(crate) context: CallContext,
    pub(crate) owner: Option<Obj>,
    pub(crate) overrides: bool,
    pub(crate) initialized: bool,
    pub(crate) critical: bool,
}

impl ExecState {
    pub fn new(container: Arc<Container>, owner: Option<Obj>, local_variable_count: usize) -> Self {
        let code = container.reader();
        Self {
            container,
            code,
            opcode: 0,
            opcode_offset: 0,
            data_stack: ValueStack::new(),
            return_stack: ValueStack::new(),
            local_variables: vec![v_int(0); local_variable_count],
            dvar_base: 0,
            svar_base: 0,
            context: CallContext::default(),
            owner,
            overrides: false,
            initialized: false,
            critical: false,
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn program_counter(&self) -> usize {
        self.code.position()
    }

    /// Jump to an absolute address inside the code segment.
    pub fn set_program_counter(&mut self, address: i64) -> Result<(), ScriptError> {
        if address < 0 || address as usize >= self.code.size() {
            return Err(ScriptError::AddressOutOfRange(address));
        }
        self.code
            .seek(address as usize)
            .map_err(|_| ScriptError::AddressOutOfRange(address))
    }

    pub fn at_end(&self) -> bool {
        self.code.remaining() == 0
    }

    pub fn data_stack(&self) -> &ValueStack {
        &self.data_stack
    }

    pub fn data_stack_mut(&mut self) -> &mut ValueStack {
        &mut self.data_stack
    }

    pub fn return_stack(&self) -> &ValueStack {
        &self.return_stack
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    pub fn owner(&self) -> Option<Obj> {
        self.owner
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    fn operand_error(&self, e: ReadError) -> ScriptError {
        let ReadError::OutOfBounds { offset, .. } = e;
        ScriptError::AddressOutOfRange(offset as i64)
    }

    pub(crate) fn read_opcode(&mut self) -> Result<u16, ScriptError> {
        self.code.read_u16().map_err(|e| self.operand_error(e))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, ScriptError> {
        self.code.read_i32().map_err(|e| self.operand_error(e))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, ScriptError> {
        self.code.read_u32().map_err(|e| self.operand_error(e))
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32, ScriptError> {
        self.code.read_f32().map_err(|e| self.operand_error(e))
    }

    /// The opcode at the program counter, if there is one, without consuming it.
    pub(crate) fn peek_opcode(&self) -> Option<u16> {
        self.code.peek_u16_at(self.code.position()).ok()
    }

    fn local_slot(&self, index: i64) -> Result<usize, ScriptError> {
        if index < 0 || index as usize >= self.local_variables.len() {
            return Err(ScriptError::LocalOutOfRange {
                index,
                count: self.local_variables.len(),
            });
        }
        Ok(index as usize)
    }

    pub fn local(&self, index: i64) -> Result<&Var, ScriptError> {
        let slot = self.local_slot(index)?;
        Ok(&self.local_variables[slot])
    }

    pub(crate) fn set_local(&mut self, index: i64, value: Var) -> Result<(), ScriptError> {
        let slot = self.local_slot(index)?;
        self.local_variables[slot] = value;
        Ok(())
    }

    /// Slot index relative to a frame base register.
    pub(crate) fn frame_slot(base: usize, offset: i64) -> Result<usize, ScriptError> {
        if offset < 0 {
            return Err(ScriptError::SlotOutOfRange(offset));
        }
        base.checked_add(offset as usize)
            .ok_or(ScriptError::SlotOutOfRange(offset))
    }

    /// Drop the call frames a failed or halted run may have left on the return stack. The
    /// globals base is left alone.
    pub(crate) fn reset_frames(&mut self) {
        self.return_stack.clear();
        self.dvar_base = 0;
        self.critical = false;
    }
}
