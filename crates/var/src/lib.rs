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

mod error;
mod obj;
mod scalar;
#[allow(clippy::module_inception)]
mod var;
mod variant;

pub use error::VarError;
pub use obj::{NOTHING, Obj};
pub use var::{Var, v_bool_int, v_empty_str, v_float, v_int, v_none, v_obj, v_str, v_string};
pub use variant::Variant;

use strum::{Display, FromRepr};

/// Type codes for the runtime values the VM operates on. Used in diagnostics and type errors.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, FromRepr, Display)]
#[allow(non_camel_case_types)]
pub enum VarType {
    #[strum(serialize = "NONE")]
    TYPE_NONE = 0,
    #[strum(serialize = "INT")]
    TYPE_INT = 1,
    #[strum(serialize = "FLOAT")]
    TYPE_FLOAT = 2,
    #[strum(serialize = "STR")]
    TYPE_STR = 3,
    #[strum(serialize = "OBJ")]
    TYPE_OBJ = 4,
}

impl VarType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, VarType::TYPE_INT | VarType::TYPE_FLOAT)
    }
}
