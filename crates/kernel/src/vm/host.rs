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

//! The capability interface through which opcode handlers reach the host simulation.

use arcstr::ArcStr;
use intvm_var::{NOTHING, Obj, Var};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Lookup failures reported by the host. Handlers degrade all of these to an empty result
/// (integer zero, empty string, or no effect) rather than failing the script.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum HostError {
    #[error("object {0} not found")]
    ObjectNotFound(Obj),
    #[error("object {obj} has no property {property}")]
    PropertyNotFound { obj: Obj, property: ObjectProperty },
    #[error("message {id} not found in table {table}")]
    MessageNotFound { table: i64, id: i64 },
    #[error("script {0} not found")]
    ScriptNotFound(i64),
    #[error("script {script} has no procedure `{procedure}`")]
    ProcedureNotFound { script: i64, procedure: String },
    #[error("variable {0} not found")]
    VariableNotFound(i64),
    #[error("external variable `{0}` not found")]
    ExternalNotFound(ArcStr),
}

/// The symbolic properties of a world object scripts may read or write.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ObjectProperty {
    Name,
    /// Prototype id.
    Pid,
    /// Object type code (item, critter, scenery...).
    Type,
    /// A critter statistic by index.
    Stat(i64),
}

impl Display for ObjectProperty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectProperty::Name => f.write_str("name"),
            ObjectProperty::Pid => f.write_str("pid"),
            ObjectProperty::Type => f.write_str("type"),
            ObjectProperty::Stat(stat) => write!(f, "stat[{stat}]"),
        }
    }
}

/// Side effects a script asks the host to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEffect {
    PlayMovie(i64),
    PlaySound(ArcStr),
    DisplayMessage(ArcStr),
    GiveExperience(i64),
}

/// An entry of a localized message table.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Message {
    pub text: ArcStr,
    pub sound: ArcStr,
}

/// The per-call fields a host supplies with `call`. Cleared after every call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CallContext {
    pub source: Obj,
    pub target: Obj,
    pub fixed_param: i64,
    pub used_skill: Option<i64>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self {
            source: NOTHING,
            target: NOTHING,
            fixed_param: 0,
            used_skill: None,
        }
    }
}

/// Everything in the world a script can touch. Injected into each run; scripts hold only
/// generational object handles, which the host resolves on every access.
pub trait ScriptHost {
    fn object_property(&mut self, obj: Obj, property: ObjectProperty) -> Result<Var, HostError>;

    fn set_object_property(
        &mut self,
        obj: Obj,
        property: ObjectProperty,
        value: Var,
    ) -> Result<(), HostError>;

    /// Ask the host to carry out an effect on behalf of the script owned by `owner`.
    fn trigger(&mut self, owner: Option<Obj>, effect: HostEffect) -> Result<(), HostError>;

    fn message(&mut self, table: i64, id: i64) -> Result<Message, HostError>;

    /// Run `procedure` of another script, identified by its script id.
    fn call_script_procedure(
        &mut self,
        script: i64,
        procedure: &str,
        context: &CallContext,
    ) -> Result<Var, HostError>;

    /// The player character.
    fn dude(&mut self) -> Result<Obj, HostError>;

    fn map_var(&mut self, index: i64) -> Result<Var, HostError>;
    fn set_map_var(&mut self, index: i64, value: Var) -> Result<(), HostError>;
    fn global_var(&mut self, index: i64) -> Result<Var, HostError>;
    fn set_global_var(&mut self, index: i64, value: Var) -> Result<(), HostError>;

    /// Variables shared between scripts by name.
    fn fetch_external(&mut self, name: &str) -> Result<Var, HostError>;
    fn store_external(&mut self, name: &str, value: Var) -> Result<(), HostError>;
    fn export_var(&mut self, name: &str) -> Result<(), HostError>;
}
