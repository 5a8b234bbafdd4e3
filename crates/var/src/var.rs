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

use crate::variant::Variant;
use crate::{Obj, VarType};
use arcstr::ArcStr;
use std::fmt::{Debug, Display, Formatter};

#[derive(Clone, PartialEq)]
pub struct Var(Variant);

impl Debug for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.variant())
    }
}

/// The form a value takes when the VM turns it into text (messages, concatenation).
impl Display for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.variant() {
            Variant::None => Ok(()),
            Variant::Int(i) => write!(f, "{i}"),
            Variant::Float(fl) => write!(f, "{fl:.5}"),
            Variant::Str(s) => f.write_str(s.as_str()),
            Variant::Obj(o) => write!(f, "{o}"),
        }
    }
}

impl Var {
    pub fn from_variant(variant: Variant) -> Self {
        Var(variant)
    }

    pub fn mk_integer(i: i64) -> Self {
        Var(Variant::Int(i))
    }

    pub fn mk_none() -> Self {
        Var(Variant::None)
    }

    pub fn mk_str(s: &str) -> Self {
        Var(Variant::Str(ArcStr::from(s)))
    }

    /// Wrap an already pooled string without copying it.
    pub fn mk_pooled_str(s: ArcStr) -> Self {
        Var(Variant::Str(s))
    }

    pub fn mk_float(f: f64) -> Self {
        Var(Variant::Float(f))
    }

    pub fn mk_object(o: Obj) -> Self {
        Var(Variant::Obj(o))
    }

    pub fn variant(&self) -> &Variant {
        &self.0
    }

    pub fn type_code(&self) -> VarType {
        match self.variant() {
            Variant::None => VarType::TYPE_NONE,
            Variant::Int(_) => VarType::TYPE_INT,
            Variant::Float(_) => VarType::TYPE_FLOAT,
            Variant::Str(_) => VarType::TYPE_STR,
            Variant::Obj(_) => VarType::TYPE_OBJ,
        }
    }

    pub fn is_true(&self) -> bool {
        match self.variant() {
            Variant::None => false,
            Variant::Int(i) => *i != 0,
            Variant::Float(f) => *f != 0.0,
            Variant::Str(s) => !s.is_empty(),
            Variant::Obj(o) => !o.is_nothing(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.variant(), Variant::None)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.variant() {
            Variant::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value, promoting integers.
    pub fn as_float(&self) -> Option<f64> {
        match self.variant() {
            Variant::Int(i) => Some(*i as f64),
            Variant::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.variant() {
            Variant::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// An object handle, accepting integer `0` as the null handle the way compiled scripts
    /// pass "no object".
    pub fn as_obj(&self) -> Option<Obj> {
        match self.variant() {
            Variant::Obj(o) => Some(*o),
            Variant::Int(0) => Some(crate::NOTHING),
            _ => None,
        }
    }
}

pub fn v_int(i: i64) -> Var {
    Var::mk_integer(i)
}

/// Produces the integer 1 or 0 scripts use for truth values.
pub fn v_bool_int(b: bool) -> Var {
    if b { v_int(1) } else { v_int(0) }
}

pub fn v_none() -> Var {
    Var::mk_none()
}

pub fn v_str(s: &str) -> Var {
    Var::mk_str(s)
}

pub fn v_string(s: String) -> Var {
    Var::mk_pooled_str(ArcStr::from(s))
}

pub fn v_empty_str() -> Var {
    Var::mk_pooled_str(arcstr::literal!(""))
}

pub fn v_float(f: f64) -> Var {
    Var::mk_float(f)
}

pub fn v_obj(o: Obj) -> Var {
    Var::mk_object(o)
}

impl From<i64> for Var {
    fn from(i: i64) -> Self {
        Var::mk_integer(i)
    }
}

impl From<i32> for Var {
    fn from(i: i32) -> Self {
        Var::mk_integer(i as i64)
    }
}

impl From<f64> for Var {
    fn from(f: f64) -> Self {
        Var::mk_float(f)
    }
}

impl From<&str> for Var {
    fn from(s: &str) -> Self {
        Var::mk_str(s)
    }
}

impl From<ArcStr> for Var {
    fn from(s: ArcStr) -> Self {
        Var::mk_pooled_str(s)
    }
}

impl From<Obj> for Var {
    fn from(o: Obj) -> Self {
        Var::mk_object(o)
    }
}
