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

//! A stand-in world for running scripts outside the game. It holds only the player character,
//! keeps variables in memory, and logs every effect a script asks for.

use ahash::AHashMap;
use arcstr::ArcStr;
use intvm_kernel::{CallContext, HostEffect, HostError, Message, ObjectProperty, ScriptHost};
use intvm_var::{Obj, Var, v_int, v_str};
use tracing::{debug, info};

pub struct LoggingHost {
    dude: Obj,
    dude_stats: AHashMap<i64, i64>,
    map_vars: AHashMap<i64, Var>,
    global_vars: AHashMap<i64, Var>,
    externals: AHashMap<ArcStr, Var>,
}

impl LoggingHost {
    pub fn new() -> Self {
        Self {
            dude: Obj::mk(0, 0),
            dude_stats: AHashMap::new(),
            map_vars: AHashMap::new(),
            global_vars: AHashMap::new(),
            externals: AHashMap::new(),
        }
    }

    pub fn dude_obj(&self) -> Obj {
        self.dude
    }
}

impl Default for LoggingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost for LoggingHost {
    fn object_property(&mut self, obj: Obj, property: ObjectProperty) -> Result<Var, HostError> {
        if obj != self.dude {
            return Err(HostError::ObjectNotFound(obj));
        }
        match property {
            ObjectProperty::Name => Ok(v_str("dude")),
            ObjectProperty::Pid => Ok(v_int(0)),
            ObjectProperty::Type => Ok(v_int(1)),
            ObjectProperty::Stat(stat) => self
                .dude_stats
                .get(&stat)
                .map(|v| v_int(*v))
                .ok_or(HostError::PropertyNotFound { obj, property }),
        }
    }

    fn set_object_property(
        &mut self,
        obj: Obj,
        property: ObjectProperty,
        value: Var,
    ) -> Result<(), HostError> {
        info!(%obj, %property, ?value, "Set object property");
        match (obj == self.dude, property, value.as_integer()) {
            (true, ObjectProperty::Stat(stat), Some(v)) => {
                self.dude_stats.insert(stat, v);
                Ok(())
            }
            (true, _, _) => Err(HostError::PropertyNotFound { obj, property }),
            (false, _, _) => Err(HostError::ObjectNotFound(obj)),
        }
    }

    fn trigger(&mut self, owner: Option<Obj>, effect: HostEffect) -> Result<(), HostError> {
        let owner = Obj::from(owner);
        match effect {
            HostEffect::PlayMovie(movie) => info!(%owner, movie, "Play movie"),
            HostEffect::PlaySound(sound) => info!(%owner, %sound, "Play sound"),
            HostEffect::DisplayMessage(text) => info!(%owner, "{text}"),
            HostEffect::GiveExperience(points) => info!(%owner, points, "Give experience"),
        }
        Ok(())
    }

    fn message(&mut self, table: i64, id: i64) -> Result<Message, HostError> {
        debug!(table, id, "No message tables loaded");
        Err(HostError::MessageNotFound { table, id })
    }

    fn call_script_procedure(
        &mut self,
        script: i64,
        procedure: &str,
        _context: &CallContext,
    ) -> Result<Var, HostError> {
        info!(script, procedure, "Cross-script call");
        Err(HostError::ScriptNotFound(script))
    }

    fn dude(&mut self) -> Result<Obj, HostError> {
        Ok(self.dude)
    }

    fn map_var(&mut self, index: i64) -> Result<Var, HostError> {
        self.map_vars
            .get(&index)
            .cloned()
            .ok_or(HostError::VariableNotFound(index))
    }

    fn set_map_var(&mut self, index: i64, value: Var) -> Result<(), HostError> {
        info!(index, ?value, "Set map variable");
        self.map_vars.insert(index, value);
        Ok(())
    }

    fn global_var(&mut self, index: i64) -> Result<Var, HostError> {
        self.global_vars
            .get(&index)
            .cloned()
            .ok_or(HostError::VariableNotFound(index))
    }

    fn set_global_var(&mut self, index: i64, value: Var) -> Result<(), HostError> {
        info!(index, ?value, "Set global variable");
        self.global_vars.insert(index, value);
        Ok(())
    }

    fn fetch_external(&mut self, name: &str) -> Result<Var, HostError> {
        self.externals
            .get(name)
            .cloned()
            .ok_or_else(|| HostError::ExternalNotFound(ArcStr::from(name)))
    }

    fn store_external(&mut self, name: &str, value: Var) -> Result<(), HostError> {
        info!(name, ?value, "Set external variable");
        self.externals.insert(ArcStr::from(name), value);
        Ok(())
    }

    fn export_var(&mut self, name: &str) -> Result<(), HostError> {
        self.externals
            .entry(ArcStr::from(name))
            .or_insert_with(|| v_int(0));
        Ok(())
    }
}
