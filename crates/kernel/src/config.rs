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

//! Config is created by the host and handed to every script execution it creates. Used to hold
//! things typically configured by CLI flags or a config file.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCAL_VARIABLE_COUNT: usize = 64;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Upper bound on the instructions executed by a single `initialize` or `call`. Exceeding it
    /// aborts the run like any other script error. `None` means unbounded.
    pub max_ticks: Option<usize>,
    /// Size of each script instance's local variable frame.
    pub local_variable_count: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_ticks: None,
            local_variable_count: DEFAULT_LOCAL_VARIABLE_COUNT,
        }
    }
}
