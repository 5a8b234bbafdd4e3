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

use crate::vm::{CallContext, HostEffect, HostError, Message, ObjectProperty, ScriptHost};
use ahash::AHashMap;
use arcstr::ArcStr;
use intvm_var::{Obj, Var, v_int};

/// A world object as the mock host stores it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockObject {
    pub name: ArcStr,
    pub pid: i64,
    pub kind: i64,
    pub stats: AHashMap<i64, i64>,
}

impl MockObject {
    pub fn named(name: &str) -> Self {
        Self {
            name: ArcStr::from(name),
            ..Default::default()
        }
    }

    pub fn with_stat(mut self, stat: i64, value: i64) -> Self {
        self.stats.insert(stat, value);
        self
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    object: Option<MockObject>,
}

/// An in-memory host that records every effect and call a script makes.
///
/// Objects live in generational slots: destroying one bumps the slot's generation, so handles
/// issued earlier stop resolving even after the slot is reused.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    slots: Vec<Slot>,
    pub dude: Option<Obj>,
    pub messages: AHashMap<(i64, i64), Message>,
    pub map_vars: AHashMap<i64, Var>,
    pub global_vars: AHashMap<i64, Var>,
    pub externals: AHashMap<ArcStr, Var>,
    pub exported: Vec<ArcStr>,
    pub effects: Vec<(Option<Obj>, HostEffect)>,
    /// Results returned for inter-script calls, keyed by script id and procedure.
    pub script_results: AHashMap<(i64, String), Var>,
    pub script_calls: Vec<(i64, String, CallContext)>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, object: MockObject) -> Obj {
        if let Some(index) = self.slots.iter().position(|s| s.object.is_none()) {
            let slot = &mut self.slots[index];
            slot.object = Some(object);
            return Obj::mk(index as u32, slot.generation);
        }
        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        Obj::mk((self.slots.len() - 1) as u32, 0)
    }

    pub fn destroy(&mut self, obj: Obj) -> bool {
        match self.slot_mut(obj) {
            Some(slot) => {
                slot.object = None;
                slot.generation += 1;
                true
            }
            None => false,
        }
    }

    pub fn object(&self, obj: Obj) -> Option<&MockObject> {
        self.slots
            .get(obj.index() as usize)
            .filter(|s| s.generation == obj.generation())
            .and_then(|s| s.object.as_ref())
    }

    fn slot_mut(&mut self, obj: Obj) -> Option<&mut Slot> {
        self.slots
            .get_mut(obj.index() as usize)
            .filter(|s| s.generation == obj.generation() && s.object.is_some())
    }

    pub fn add_message(&mut self, table: i64, id: i64, text: &str, sound: &str) {
        self.messages.insert(
            (table, id),
            Message {
                text: ArcStr::from(text),
                sound: ArcStr::from(sound),
            },
        );
    }
}

impl ScriptHost for MockHost {
    fn object_property(&mut self, obj: Obj, property: ObjectProperty) -> Result<Var, HostError> {
        let object = self.object(obj).ok_or(HostError::ObjectNotFound(obj))?;
        match property {
            ObjectProperty::Name => Ok(Var::mk_pooled_str(object.name.clone())),
            ObjectProperty::Pid => Ok(v_int(object.pid)),
            ObjectProperty::Type => Ok(v_int(object.kind)),
            ObjectProperty::Stat(stat) => object
                .stats
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
        let object = self
            .slot_mut(obj)
            .and_then(|s| s.object.as_mut())
            .ok_or(HostError::ObjectNotFound(obj))?;
        match (property, value.as_integer(), value.as_str()) {
            (ObjectProperty::Name, _, Some(name)) => object.name = ArcStr::from(name),
            (ObjectProperty::Pid, Some(pid), _) => object.pid = pid,
            (ObjectProperty::Type, Some(kind), _) => object.kind = kind,
            (ObjectProperty::Stat(stat), Some(v), _) => {
                object.stats.insert(stat, v);
            }
            _ => return Err(HostError::PropertyNotFound { obj, property }),
        }
        Ok(())
    }

    fn trigger(&mut self, owner: Option<Obj>, effect: HostEffect) -> Result<(), HostError> {
        self.effects.push((owner, effect));
        Ok(())
    }

    fn message(&mut self, table: i64, id: i64) -> Result<Message, HostError> {
        self.messages
            .get(&(table, id))
            .cloned()
            .ok_or(HostError::MessageNotFound { table, id })
    }

    fn call_script_procedure(
        &mut self,
        script: i64,
        procedure: &str,
        context: &CallContext,
    ) -> Result<Var, HostError> {
        self.script_calls
            .push((script, procedure.to_string(), context.clone()));
        self.script_results
            .get(&(script, procedure.to_string()))
            .cloned()
            .ok_or_else(|| HostError::ProcedureNotFound {
                script,
                procedure: procedure.to_string(),
            })
    }

    fn dude(&mut self) -> Result<Obj, HostError> {
        self.dude.ok_or(HostError::ObjectNotFound(intvm_var::NOTHING))
    }

    fn map_var(&mut self, index: i64) -> Result<Var, HostError> {
        self.map_vars
            .get(&index)
            .cloned()
            .ok_or(HostError::VariableNotFound(index))
    }

    fn set_map_var(&mut self, index: i64, value: Var) -> Result<(), HostError> {
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
        self.externals.insert(ArcStr::from(name), value);
        Ok(())
    }

    fn export_var(&mut self, name: &str) -> Result<(), HostError> {
        let name = ArcStr::from(name);
        self.externals.entry(name.clone()).or_insert_with(|| v_int(0));
        self.exported.push(name);
        Ok(())
    }
}
