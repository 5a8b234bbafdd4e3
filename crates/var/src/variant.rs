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

use crate::Obj;
use arcstr::ArcStr;
use std::fmt::{Debug, Formatter};

/// Our series of types
#[derive(Clone, PartialEq)]
pub enum Variant {
    /// Placeholder used to pad the stack; never produced by arithmetic.
    None,
    Int(i64),
    Float(f64),
    Str(ArcStr),
    Obj(Obj),
}

impl Debug for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::None => write!(f, "None"),
            Variant::Int(i) => write!(f, "{i}"),
            Variant::Float(fl) => write!(f, "{fl:?}"),
            Variant::Str(s) => write!(f, "{:?}", s.as_str()),
            Variant::Obj(o) => write!(f, "{o}"),
        }
    }
}
