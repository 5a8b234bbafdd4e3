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

//! Opcodes that reach into the host world: object properties, messages, effects, and calls into
//! other scripts.

use crate::vm::dispatch::HandlerTable;
use crate::vm::ops::degrade;
use crate::vm::{ExecState, Flow, HostEffect, ObjectProperty, ScriptError, ScriptHost};
use intvm_container::Opcode;
use intvm_var::{NOTHING, Var, v_empty_str, v_int, v_obj};
use rand::Rng;

fn op_give_exp_points(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let amount = exec.data_stack.pop_integer()?;
    degrade(
        host.trigger(exec.owner, HostEffect::GiveExperience(amount)),
        (),
        "give_exp_points",
    );
    Ok(Flow::Continue)
}

fn op_play_sfx(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let sound = exec.data_stack.pop_string()?;
    degrade(host.trigger(exec.owner, HostEffect::PlaySound(sound)), (), "play_sfx");
    Ok(Flow::Continue)
}

fn op_display_msg(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let text = exec.data_stack.pop_string()?;
    degrade(
        host.trigger(exec.owner, HostEffect::DisplayMessage(text)),
        (),
        "display_msg",
    );
    Ok(Flow::Continue)
}

fn op_play_movie(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let movie = exec.data_stack.pop_integer()?;
    degrade(host.trigger(exec.owner, HostEffect::PlayMovie(movie)), (), "play_movie");
    Ok(Flow::Continue)
}

fn op_obj_name(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let obj = exec.data_stack.pop_object()?;
    let name = degrade(
        host.object_property(obj, ObjectProperty::Name),
        v_empty_str(),
        "obj_name",
    );
    exec.data_stack.push(name);
    Ok(Flow::Continue)
}

fn op_obj_type(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let obj = exec.data_stack.pop_object()?;
    let kind = degrade(
        host.object_property(obj, ObjectProperty::Type),
        v_int(0),
        "obj_type",
    );
    exec.data_stack.push(kind);
    Ok(Flow::Continue)
}

fn op_get_critter_stat(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let stat = exec.data_stack.pop_integer()?;
    let obj = exec.data_stack.pop_object()?;
    let value = degrade(
        host.object_property(obj, ObjectProperty::Stat(stat)),
        v_int(0),
        "get_critter_stat",
    );
    exec.data_stack.push(value);
    Ok(Flow::Continue)
}

/// Pushes 0 when the stat was written and -1 when the host refused it.
fn op_set_critter_stat(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let value = exec.data_stack.pop_integer()?;
    let stat = exec.data_stack.pop_integer()?;
    let obj = exec.data_stack.pop_object()?;
    let written = degrade(
        host.set_object_property(obj, ObjectProperty::Stat(stat), v_int(value))
            .map(|_| true),
        false,
        "set_critter_stat",
    );
    exec.data_stack.push(v_int(if written { 0 } else { -1 }));
    Ok(Flow::Continue)
}

/// Uniform integer in `[min, max]`; reversed bounds are swapped.
fn op_random(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let max = exec.data_stack.pop_integer()?;
    let min = exec.data_stack.pop_integer()?;
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    let mut rng = rand::rng();
    exec.data_stack.push(v_int(rng.random_range(low..=high)));
    Ok(Flow::Continue)
}

fn op_script_overrides(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.overrides = true;
    Ok(Flow::Continue)
}

fn op_self_obj(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.data_stack.push(v_obj(exec.owner.unwrap_or(NOTHING)));
    Ok(Flow::Continue)
}

fn op_source_obj(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.data_stack.push(v_obj(exec.context.source));
    Ok(Flow::Continue)
}

fn op_target_obj(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.data_stack.push(v_obj(exec.context.target));
    Ok(Flow::Continue)
}

fn op_dude_obj(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let dude = degrade(host.dude(), NOTHING, "dude_obj");
    exec.data_stack.push(v_obj(dude));
    Ok(Flow::Continue)
}

fn op_fixed_param(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.data_stack.push(v_int(exec.context.fixed_param));
    Ok(Flow::Continue)
}

/// -1 when the call carried no skill.
fn op_used_skill(exec: &mut ExecState, _host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    exec.data_stack.push(v_int(exec.context.used_skill.unwrap_or(-1)));
    Ok(Flow::Continue)
}

/// Pops the message id, then the message table. Missing messages read as an empty string.
fn op_message_str(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let id = exec.data_stack.pop_integer()?;
    let table = exec.data_stack.pop_integer()?;
    let message = degrade(host.message(table, id), Default::default(), "message_str");
    exec.data_stack.push(Var::mk_pooled_str(message.text));
    Ok(Flow::Continue)
}

/// The sound cue recorded with a message. Operands as for `MessageStr`; missing messages read as
/// an empty string.
fn op_message_speech(exec: &mut ExecState, host: &mut dyn ScriptHost) -> Result<Flow, ScriptError> {
    let id = exec.data_stack.pop_integer()?;
    let table = exec.data_stack.pop_integer()?;
    let message = degrade(host.message(table, id), Default::default(), "message_speech");
    exec.data_stack.push(Var::mk_pooled_str(message.sound));
    Ok(Flow::Continue)
}

/// Pops the procedure name, then the script id, and runs that procedure with this call's
/// context. A missing script or procedure yields 0.
fn op_call_script_procedure(
    exec: &mut ExecState,
    host: &mut dyn ScriptHost,
) -> Result<Flow, ScriptError> {
    let procedure = exec.data_stack.pop_string()?;
    let script = exec.data_stack.pop_integer()?;
    let result = degrade(
        host.call_script_procedure(script, &procedure, &exec.context),
        v_int(0),
        "call_script_procedure",
    );
    exec.data_stack.push(result);
    Ok(Flow::Continue)
}

pub(crate) fn register_world_ops(table: &mut HandlerTable) {
    table.register(Opcode::GiveExpPoints, op_give_exp_points);
    table.register(Opcode::PlaySfx, op_play_sfx);
    table.register(Opcode::ObjName, op_obj_name);
    table.register(Opcode::Random, op_random);
    table.register(Opcode::DisplayMsg, op_display_msg);
    table.register(Opcode::ScriptOverrides, op_script_overrides);
    table.register(Opcode::SelfObj, op_self_obj);
    table.register(Opcode::SourceObj, op_source_obj);
    table.register(Opcode::TargetObj, op_target_obj);
    table.register(Opcode::DudeObj, op_dude_obj);
    table.register(Opcode::FixedParam, op_fixed_param);
    table.register(Opcode::UsedSkill, op_used_skill);
    table.register(Opcode::ObjType, op_obj_type);
    table.register(Opcode::GetCritterStat, op_get_critter_stat);
    table.register(Opcode::SetCritterStat, op_set_critter_stat);
    table.register(Opcode::MessageStr, op_message_str);
    table.register(Opcode::MessageSpeech, op_message_speech);
    table.register(Opcode::PlayMovie, op_play_movie);
    table.register(Opcode::CallScriptProcedure, op_call_script_procedure);
}
