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

//! The script virtual machine: value stacks, the opcode handler table, and the execution engine
//! driving them against a host.

pub use dispatch::{Flow, Handler, dispatch};
pub use error::ScriptError;
pub use exec_state::ExecState;
pub use host::{CallContext, HostEffect, HostError, Message, ObjectProperty, ScriptHost};
pub use script::{CallOutcome, RunOutcome, ScriptExecution, ScriptState};
pub use stack::ValueStack;

mod dispatch;
mod error;
pub(crate) mod exec_state;
mod host;
pub(crate) mod ops;
mod script;
mod stack;
