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

//! Testing utilities and mocks for the kernel crate

pub mod mock_host;
pub mod vm_test;

pub use mock_host::{MockHost, MockObject};

use crate::config::VmConfig;
use crate::vm::ScriptExecution;
use intvm_container::{Container, ContainerBuilder, ParseError};
use intvm_var::Obj;
use std::sync::Arc;

/// Decode a built fixture and wrap it in a fresh execution with the default configuration.
pub fn script_from(
    builder: &ContainerBuilder,
    owner: Option<Obj>,
) -> Result<ScriptExecution, ParseError> {
    script_with_config(builder, owner, &VmConfig::default())
}

pub fn script_with_config(
    builder: &ContainerBuilder,
    owner: Option<Obj>,
    config: &VmConfig,
) -> Result<ScriptExecution, ParseError> {
    let container = Arc::new(Container::load("fixture.int", builder.build())?);
    Ok(ScriptExecution::new(container, owner, config))
}
