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

//! Compiled INT procedure files: the binary container, the random-access code reader, and the
//! opcode numbering shared by the VM.

mod builder;
mod container;
mod opcode;
mod reader;
mod source;

pub use builder::{CodeAssembler, ContainerBuilder, Label, ProcedureSpec};
pub use container::{
    Container, HEADER_SIZE, LoadError, ParseError, Procedure, ProcedureFlag, ProcedureFlags,
    SIGNATURE, STRING_TABLE_ABSENT,
};
pub use opcode::Opcode;
pub use reader::{CodeReader, ReadError};
pub use source::{DirectorySource, ScriptSource, SourceError};
