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

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Used throughout to refer to a missing object value.
pub const NOTHING: Obj = Obj::nothing();

/// A non-owning reference to an object living in the host's world.
///
/// The handle is a slot index plus the generation of the slot at the time the handle was issued.
/// The host resolves it on every access; once the object is destroyed and its slot reused, the
/// generation no longer matches and the lookup fails instead of reaching the new occupant.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Obj {
    index: u32,
    generation: u32,
}

impl Obj {
    pub const fn mk(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    const fn nothing() -> Self {
        Self {
            index: u32::MAX,
            generation: 0,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_nothing(&self) -> bool {
        self.index == u32::MAX
    }

    /// The handle as an option, `None` for the null handle.
    pub fn valid(self) -> Option<Obj> {
        (!self.is_nothing()).then_some(self)
    }
}

impl Default for Obj {
    fn default() -> Self {
        NOTHING
    }
}

impl From<Option<Obj>> for Obj {
    fn from(value: Option<Obj>) -> Self {
        value.unwrap_or(NOTHING)
    }
}

impl Display for Obj {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_nothing() {
            return f.write_str("#nothing");
        }
        write!(f, "#{}.{}", self.index, self.generation)
    }
}
