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

//! Arithmetic, comparison and coercion rules shared by every operator opcode.
//! Integers promote to floats whenever the other operand is a float; strings, objects and the
//! placeholder value never take part in arithmetic.

use crate::VarError::{self, BinaryTypeMismatch, DivisionByZero, Overflow, UnaryTypeMismatch};
use crate::var::{Var, v_float, v_int, v_string};
use crate::variant::Variant;
use std::cmp::Ordering;

macro_rules! binary_numeric_coercion_op {
    ($name:ident, $checked:ident, $op:tt) => {
        pub fn $name(&self, v: &Var) -> Result<Var, VarError> {
            match (self.variant(), v.variant()) {
                (Variant::Int(l), Variant::Int(r)) => {
                    l.$checked(*r).map(v_int).ok_or(Overflow(stringify!($name)))
                }
                (Variant::Float(l), Variant::Float(r)) => Ok(v_float(l $op r)),
                (Variant::Float(l), Variant::Int(r)) => Ok(v_float(l $op (*r as f64))),
                (Variant::Int(l), Variant::Float(r)) => Ok(v_float((*l as f64) $op r)),
                (_, _) => Err(self.mismatch(stringify!($name), v)),
            }
        }
    };
}

macro_rules! binary_numeric_division_op {
    ($name:ident, $checked:ident, $op:tt) => {
        pub fn $name(&self, v: &Var) -> Result<Var, VarError> {
            match (self.variant(), v.variant()) {
                (Variant::Int(_), Variant::Int(0)) => Err(DivisionByZero),
                (Variant::Int(l), Variant::Int(r)) => {
                    l.$checked(*r).map(v_int).ok_or(Overflow(stringify!($name)))
                }
                (Variant::Int(_) | Variant::Float(_), Variant::Float(r)) if *r == 0.0 => {
                    Err(DivisionByZero)
                }
                (Variant::Float(_), Variant::Int(0)) => Err(DivisionByZero),
                (Variant::Float(l), Variant::Float(r)) => Ok(v_float(l $op r)),
                (Variant::Float(l), Variant::Int(r)) => Ok(v_float(l $op (*r as f64))),
                (Variant::Int(l), Variant::Float(r)) => Ok(v_float((*l as f64) $op r)),
                (_, _) => Err(self.mismatch(stringify!($name), v)),
            }
        }
    };
}

macro_rules! binary_integer_op {
    ($name:ident, $op:tt) => {
        pub fn $name(&self, v: &Var) -> Result<Var, VarError> {
            match (self.variant(), v.variant()) {
                (Variant::Int(l), Variant::Int(r)) => Ok(v_int(l $op r)),
                (_, _) => Err(self.mismatch(stringify!($name), v)),
            }
        }
    };
}

impl Var {
    binary_numeric_coercion_op!(add, checked_add, +);
    binary_numeric_coercion_op!(sub, checked_sub, -);
    binary_numeric_coercion_op!(mul, checked_mul, *);
    binary_numeric_division_op!(div, checked_div, /);
    binary_numeric_division_op!(modulus, checked_rem, %);

    binary_integer_op!(bitand, &);
    binary_integer_op!(bitor, |);
    binary_integer_op!(bitxor, ^);

    fn mismatch(&self, op: &'static str, other: &Var) -> VarError {
        BinaryTypeMismatch {
            op,
            lhs: self.type_code(),
            rhs: other.type_code(),
        }
    }

    pub fn negative(&self) -> Result<Var, VarError> {
        match self.variant() {
            Variant::Int(i) => i.checked_neg().map(v_int).ok_or(Overflow("negative")),
            Variant::Float(f) => Ok(v_float(-f)),
            _ => Err(UnaryTypeMismatch {
                op: "negative",
                operand: self.type_code(),
            }),
        }
    }

    pub fn bitnot(&self) -> Result<Var, VarError> {
        match self.variant() {
            Variant::Int(i) => Ok(v_int(!i)),
            _ => Err(UnaryTypeMismatch {
                op: "bitnot",
                operand: self.type_code(),
            }),
        }
    }

    /// Round toward negative infinity, producing an integer.
    pub fn floor(&self) -> Result<Var, VarError> {
        match self.variant() {
            Variant::Int(i) => Ok(v_int(*i)),
            Variant::Float(f) => Ok(v_int(f.floor() as i64)),
            _ => Err(UnaryTypeMismatch {
                op: "floor",
                operand: self.type_code(),
            }),
        }
    }

    /// String concatenation. The left operand must be a string; the right is rendered as text.
    pub fn concat(&self, v: &Var) -> Result<Var, VarError> {
        match (self.variant(), v.variant()) {
            (Variant::Str(l), Variant::Str(r)) => {
                let mut s = String::with_capacity(l.len() + r.len());
                s.push_str(l.as_str());
                s.push_str(r.as_str());
                Ok(v_string(s))
            }
            (Variant::Str(l), Variant::Int(_) | Variant::Float(_) | Variant::Obj(_)) => {
                Ok(v_string(format!("{}{v}", l.as_str())))
            }
            (_, _) => Err(self.mismatch("concat", v)),
        }
    }

    /// Script-level equality. Numbers compare after promotion, strings by content, and objects
    /// by identity; an object also compares against integer `0` as a null check.
    pub fn eq_value(&self, v: &Var) -> Result<bool, VarError> {
        match (self.variant(), v.variant()) {
            (Variant::Int(l), Variant::Int(r)) => Ok(l == r),
            (Variant::Float(l), Variant::Float(r)) => Ok(l == r),
            (Variant::Float(l), Variant::Int(r)) => Ok(*l == *r as f64),
            (Variant::Int(l), Variant::Float(r)) => Ok(*l as f64 == *r),
            (Variant::Str(l), Variant::Str(r)) => Ok(l == r),
            (Variant::Obj(l), Variant::Obj(r)) => Ok(l == r),
            (Variant::Obj(o), Variant::Int(0)) | (Variant::Int(0), Variant::Obj(o)) => {
                Ok(o.is_nothing())
            }
            (_, _) => Err(self.mismatch("eq", v)),
        }
    }

    /// Ordering for the relational opcodes. Objects have identity only, never order.
    pub fn compare(&self, v: &Var) -> Result<Ordering, VarError> {
        match (self.variant(), v.variant()) {
            (Variant::Int(l), Variant::Int(r)) => Ok(l.cmp(r)),
            (Variant::Float(l), Variant::Float(r)) => Ok(l.total_cmp(r)),
            (Variant::Float(l), Variant::Int(r)) => Ok(l.total_cmp(&(*r as f64))),
            (Variant::Int(l), Variant::Float(r)) => Ok((*l as f64).total_cmp(r)),
            (Variant::Str(l), Variant::Str(r)) => Ok(l.as_str().cmp(r.as_str())),
            (_, _) => Err(self.mismatch("compare", v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::var::{v_float, v_int, v_none, v_obj, v_str};
    use crate::{NOTHING, Obj, VarError, VarType};
    use std::cmp::Ordering;
    use test_case::test_case;

    #[test]
    fn test_add() {
        assert_eq!(v_int(1).add(&v_int(2)), Ok(v_int(3)));
        assert_eq!(v_int(1).add(&v_float(2.0)), Ok(v_float(3.0)));
        assert_eq!(v_float(1.).add(&v_int(2)), Ok(v_float(3.)));
        assert_eq!(v_float(1.).add(&v_float(2.)), Ok(v_float(3.)));
    }

    #[test]
    fn test_add_refuses_strings() {
        assert_eq!(
            v_str("a").add(&v_str("b")),
            Err(VarError::BinaryTypeMismatch {
                op: "add",
                lhs: VarType::TYPE_STR,
                rhs: VarType::TYPE_STR
            })
        );
        assert!(v_obj(Obj::mk(1, 0)).add(&v_int(1)).is_err());
        assert!(v_none().sub(&v_int(1)).is_err());
    }

    #[test]
    fn test_sub_mul() -> Result<(), VarError> {
        assert_eq!(v_int(1).sub(&v_int(2))?, v_int(-1));
        assert_eq!(v_int(1).sub(&v_float(2.))?, v_float(-1.));
        assert_eq!(v_int(3).mul(&v_int(2))?, v_int(6));
        assert_eq!(v_float(1.5).mul(&v_int(2))?, v_float(3.));
        Ok(())
    }

    #[test]
    fn test_div() -> Result<(), VarError> {
        assert_eq!(v_int(1).div(&v_int(2))?, v_int(0));
        assert_eq!(v_int(1).div(&v_float(2.))?, v_float(0.5));
        assert_eq!(v_float(1.).div(&v_int(2))?, v_float(0.5));
        assert_eq!(v_int(7).modulus(&v_int(3))?, v_int(1));
        Ok(())
    }

    #[test_case(v_int(1), v_int(0); "int by int")]
    #[test_case(v_float(1.0), v_int(0); "float by int")]
    #[test_case(v_int(1), v_float(0.0); "int by float")]
    fn test_division_by_zero(lhs: crate::Var, rhs: crate::Var) {
        assert_eq!(lhs.div(&rhs), Err(VarError::DivisionByZero));
        assert_eq!(lhs.modulus(&rhs), Err(VarError::DivisionByZero));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            v_int(i64::MAX).add(&v_int(1)),
            Err(VarError::Overflow("add"))
        );
        assert_eq!(
            v_int(i64::MIN).div(&v_int(-1)),
            Err(VarError::Overflow("div"))
        );
    }

    #[test]
    fn test_unary() -> Result<(), VarError> {
        assert_eq!(v_int(5).negative()?, v_int(-5));
        assert_eq!(v_float(2.5).floor()?, v_int(2));
        assert_eq!(v_float(-2.5).floor()?, v_int(-3));
        assert_eq!(v_int(0).bitnot()?, v_int(-1));
        assert!(v_str("x").negative().is_err());
        Ok(())
    }

    #[test]
    fn test_bitwise() -> Result<(), VarError> {
        assert_eq!(v_int(0b1100).bitand(&v_int(0b1010))?, v_int(0b1000));
        assert_eq!(v_int(0b1100).bitor(&v_int(0b1010))?, v_int(0b1110));
        assert_eq!(v_int(0b1100).bitxor(&v_int(0b1010))?, v_int(0b0110));
        assert!(v_float(1.0).bitand(&v_int(1)).is_err());
        Ok(())
    }

    #[test]
    fn test_concat() -> Result<(), VarError> {
        assert_eq!(v_str("ab").concat(&v_str("cd"))?, v_str("abcd"));
        assert_eq!(v_str("hp: ").concat(&v_int(10))?, v_str("hp: 10"));
        assert!(v_int(1).concat(&v_str("x")).is_err());
        Ok(())
    }

    #[test]
    fn test_equality() -> Result<(), VarError> {
        assert!(v_int(2).eq_value(&v_float(2.0))?);
        assert!(v_str("a").eq_value(&v_str("a"))?);
        assert!(!v_str("a").eq_value(&v_str("b"))?);
        let o = Obj::mk(4, 1);
        assert!(v_obj(o).eq_value(&v_obj(o))?);
        assert!(!v_obj(o).eq_value(&v_obj(Obj::mk(4, 2)))?);
        assert!(v_obj(NOTHING).eq_value(&v_int(0))?);
        assert!(!v_int(0).eq_value(&v_obj(o))?);
        assert!(v_obj(o).eq_value(&v_int(3)).is_err());
        assert!(v_str("1").eq_value(&v_int(1)).is_err());
        Ok(())
    }

    #[test]
    fn test_ordering() -> Result<(), VarError> {
        assert_eq!(v_int(1).compare(&v_float(1.5))?, Ordering::Less);
        assert_eq!(v_float(2.0).compare(&v_int(2))?, Ordering::Equal);
        assert_eq!(v_str("b").compare(&v_str("a"))?, Ordering::Greater);
        assert!(v_obj(Obj::mk(1, 0)).compare(&v_obj(Obj::mk(2, 0))).is_err());
        Ok(())
    }
}
