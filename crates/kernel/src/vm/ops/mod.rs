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

//! Opcode handlers, grouped by family. Each module registers its handlers with the dispatch table.

mod arith;
mod control;
mod stack_ops;
mod vars;
mod world;

pub(crate) use arith::register_arith_ops;
pub(crate) use control::register_control_ops;
pub(crate) use stack_ops::register_stack_ops;
pub(crate) use vars::register_var_ops;
pub(crate) use world::register_world_ops;

use crate::vm::HostError;
use tracing::debug;

/// Host lookups that fail leave the script with an empty result instead of an error.
pub(crate) fn degrade<T>(result: Result<T, HostError>, fallback: T, operation: &'static str) -> T {
    result.unwrap_or_else(|e| {
        debug!(operation, error = %e, "Host lookup failed; using empty result");
        fallback
    })
}
