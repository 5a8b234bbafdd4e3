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

//! Producing container files, for fixtures and tooling. This is an assembler over raw opcodes,
//! not a compiler: callers lay out the instructions themselves.

use crate::container::{HEADER_SIZE, ProcedureFlags, SIGNATURE, STRING_TABLE_ABSENT};
use crate::opcode::Opcode;
use bytes::{BufMut, Bytes, BytesMut};

/// A position inside a [`CodeAssembler`] buffer, resolved to an absolute address when the
/// owning procedure is placed in a file.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Label(usize);

/// Emits opcodes and their inline operands for one block of code.
#[derive(Debug, Clone, Default)]
pub struct CodeAssembler {
    code: Vec<u8>,
    labels: Vec<Option<u32>>,
    fixups: Vec<(usize, Label)>,
}

impl CodeAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn op(&mut self, op: Opcode) -> &mut Self {
        self.raw(op.code())
    }

    /// Emit any 16-bit value as an opcode, including ones the VM does not define.
    pub fn raw(&mut self, opcode: u16) -> &mut Self {
        self.code.extend(opcode.to_be_bytes());
        self
    }

    pub fn push_int(&mut self, value: i32) -> &mut Self {
        self.op(Opcode::PushInt);
        self.code.extend(value.to_be_bytes());
        self
    }

    pub fn push_float(&mut self, value: f32) -> &mut Self {
        self.op(Opcode::PushFloat);
        self.code.extend(value.to_be_bytes());
        self
    }

    /// Push a string or identifier table entry by its table offset.
    pub fn push_string(&mut self, offset: u32) -> &mut Self {
        self.op(Opcode::PushString);
        self.code.extend(offset.to_be_bytes());
        self
    }

    pub fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Bind `label` to the current end of the buffer.
    pub fn bind(&mut self, label: Label) -> &mut Self {
        self.labels[label.0] = Some(self.code.len() as u32);
        self
    }

    /// A label bound at the current position.
    pub fn here(&mut self) -> Label {
        let label = self.new_label();
        self.bind(label);
        label
    }

    /// Push the absolute address of `label`. Unbound labels assemble as address 0.
    pub fn push_label(&mut self, label: Label) -> &mut Self {
        self.op(Opcode::PushInt);
        self.fixups.push((self.code.len(), label));
        self.code.extend(0i32.to_be_bytes());
        self
    }

    /// The code with every label resolved against `base`, the absolute offset the block will
    /// start at.
    pub fn assemble_at(&self, base: u32) -> Vec<u8> {
        let mut code = self.code.clone();
        for (position, label) in &self.fixups {
            let target = self.labels[label.0].map_or(0, |l| base + l);
            code[*position..*position + 4].copy_from_slice(&(target as i32).to_be_bytes());
        }
        code
    }
}

/// One procedure to place in a built file.
#[derive(Debug, Clone)]
pub struct ProcedureSpec {
    name: String,
    flags: ProcedureFlags,
    delay: u32,
    argument_count: u32,
    body: CodeAssembler,
    condition: Option<CodeAssembler>,
    body_offset: Option<u32>,
}

impl ProcedureSpec {
    pub fn new(name: &str, body: CodeAssembler) -> Self {
        Self {
            name: name.to_string(),
            flags: ProcedureFlags::default(),
            delay: 0,
            argument_count: 0,
            body,
            condition: None,
            body_offset: None,
        }
    }

    pub fn flags(mut self, flags: ProcedureFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    pub fn argument_count(mut self, count: u32) -> Self {
        self.argument_count = count;
        self
    }

    pub fn condition(mut self, condition: CodeAssembler) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Place the body at a fixed absolute offset instead of after the tables. The bytes are
    /// written over whatever else occupies that range; keeping clear of the tables is up to the
    /// caller.
    pub fn at(mut self, offset: u32) -> Self {
        self.body_offset = Some(offset);
        self
    }
}

#[derive(Debug, Clone, Default)]
struct Table {
    entries: Vec<(u32, String)>,
    size: u32,
}

impl Table {
    fn intern(&mut self, text: &str) -> u32 {
        if let Some((offset, _)) = self.entries.iter().find(|(_, t)| t == text) {
            return *offset;
        }
        // Entries are NUL terminated and padded to an even length.
        let padded = (text.len() + 2) & !1;
        let offset = self.size + 2 + 4;
        self.size += 2 + padded as u32;
        self.entries.push((offset, text.to_string()));
        offset
    }

    fn write(&self, out: &mut BytesMut) {
        out.put_u32(self.size);
        for (_, text) in &self.entries {
            let padded = (text.len() + 2) & !1;
            out.put_u16(padded as u16);
            out.put_slice(text.as_bytes());
            out.put_bytes(0, padded - text.len());
        }
    }
}

/// Lays out a complete container file.
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    header: Option<Vec<u8>>,
    procedures: Vec<ProcedureSpec>,
    identifiers: Table,
    strings: Table,
    omit_strings: bool,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the generated startup header. Shorter headers are padded with `Noop`s, longer
    /// ones truncated.
    pub fn header(&mut self, header: Vec<u8>) -> &mut Self {
        self.header = Some(header);
        self
    }

    /// Leave the string table out entirely (size field set to the "absent" marker).
    pub fn without_strings(&mut self) -> &mut Self {
        self.omit_strings = true;
        self
    }

    /// Add a procedure, returning its index for use with `Call`.
    pub fn procedure(&mut self, spec: ProcedureSpec) -> u32 {
        self.identifiers.intern(&spec.name);
        self.procedures.push(spec);
        (self.procedures.len() - 1) as u32
    }

    /// Intern an identifier, returning its table offset.
    pub fn identifier(&mut self, name: &str) -> u32 {
        self.identifiers.intern(name)
    }

    /// Intern a string constant, returning its table offset.
    pub fn string(&mut self, text: &str) -> u32 {
        self.strings.intern(text)
    }

    fn default_header(&self) -> Vec<u8> {
        let mut code = CodeAssembler::new();
        code.push_int(0);
        if let Some(start) = self.procedures.iter().position(|p| p.name == "start") {
            code.push_int(start as i32).op(Opcode::Call);
        }
        code.op(Opcode::ExitProg);
        code.assemble_at(0)
    }

    pub fn build(&self) -> Bytes {
        let mut header = self.header.clone().unwrap_or_else(|| self.default_header());
        header.truncate(HEADER_SIZE);
        while header.len() + 2 <= HEADER_SIZE {
            header.extend(Opcode::Noop.code().to_be_bytes());
        }
        header.resize(HEADER_SIZE, 0);

        let strings_len = if self.omit_strings {
            4
        } else {
            4 + self.strings.size as usize
        };
        let tables_end = HEADER_SIZE
            + 4
            + self.procedures.len() * 24
            + 4
            + self.identifiers.size as usize
            + 4
            + strings_len;

        // Place bodies and conditions after the tables, in declaration order.
        let mut cursor = tables_end as u32;
        let mut placed = Vec::with_capacity(self.procedures.len());
        for spec in &self.procedures {
            let body_offset = match spec.body_offset {
                Some(offset) => offset,
                None => {
                    let offset = cursor;
                    cursor += spec.body.len() as u32;
                    offset
                }
            };
            let condition_offset = match &spec.condition {
                Some(condition) => {
                    let offset = cursor;
                    cursor += condition.len() as u32;
                    offset
                }
                None => 0,
            };
            placed.push((body_offset, condition_offset));
        }

        let mut out = BytesMut::with_capacity(cursor as usize);
        out.put_slice(&header);
        out.put_u32(self.procedures.len() as u32);
        for (spec, (body_offset, condition_offset)) in self.procedures.iter().zip(&placed) {
            let name_offset = self
                .identifiers
                .entries
                .iter()
                .find(|(_, t)| *t == spec.name)
                .map_or(0, |(offset, _)| *offset);
            out.put_u32(name_offset);
            out.put_u32(spec.flags.bits());
            out.put_u32(spec.delay);
            out.put_u32(*condition_offset);
            out.put_u32(*body_offset);
            out.put_u32(spec.argument_count);
        }
        self.identifiers.write(&mut out);
        out.put_u32(SIGNATURE);
        if self.omit_strings {
            out.put_u32(STRING_TABLE_ABSENT);
        } else {
            self.strings.write(&mut out);
        }

        let mut file = out.to_vec();
        for (spec, (body_offset, condition_offset)) in self.procedures.iter().zip(&placed) {
            write_at(&mut file, *body_offset as usize, &spec.body.assemble_at(*body_offset));
            if let Some(condition) = &spec.condition {
                let code = condition.assemble_at(*condition_offset);
                write_at(&mut file, *condition_offset as usize, &code);
            }
        }
        Bytes::from(file)
    }
}

fn write_at(file: &mut Vec<u8>, offset: usize, code: &[u8]) {
    let end = offset + code.len();
    if file.len() < end {
        file.resize(end, 0);
    }
    file[offset..end].copy_from_slice(code);
}
