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

#[cfg(test)]
mod tests {
    use crate::config::VmConfig;
    use crate::testing::{MockHost, MockObject, script_from, script_with_config};
    use crate::vm::{CallContext, CallOutcome, HostEffect, ScriptError, ScriptExecution, ScriptState};
    use arcstr::ArcStr;
    use intvm_container::Opcode::*;
    use intvm_container::{CodeAssembler, ContainerBuilder, Opcode, ProcedureFlags, ProcedureSpec};
    use intvm_var::{NOTHING, Obj, Var, VarError, VarType, v_bool_int, v_float, v_int, v_obj, v_str};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn single(code: CodeAssembler) -> ContainerBuilder {
        let mut builder = ContainerBuilder::new();
        builder.procedure(ProcedureSpec::new("test", code));
        builder
    }

    fn run(builder: &ContainerBuilder, host: &mut MockHost) -> (ScriptExecution, CallOutcome) {
        let mut script = script_from(builder, None).unwrap();
        let outcome = script.call("test", CallContext::default(), host);
        (script, outcome)
    }

    /// Emit code storing the value produced by `value` into the host's global variable `slot`.
    fn capture(code: &mut CodeAssembler, slot: i32, value: impl FnOnce(&mut CodeAssembler)) {
        code.push_int(slot);
        value(code);
        code.op(SetGlobalVar);
    }

    fn finish(code: &mut CodeAssembler) {
        code.push_int(0).op(Return);
    }

    fn global(host: &MockHost, slot: i64) -> Option<Var> {
        host.global_vars.get(&slot).cloned()
    }

    #[test_case(Add, 2, 3, v_int(5); "add")]
    #[test_case(Sub, 2, 3, v_int(-1); "sub")]
    #[test_case(Mul, 4, 3, v_int(12); "mul")]
    #[test_case(Div, 7, 2, v_int(3); "div")]
    #[test_case(Mod, 7, 3, v_int(1); "modulus")]
    #[test_case(Eq, 2, 2, v_int(1); "eq")]
    #[test_case(Ne, 2, 2, v_int(0); "ne")]
    #[test_case(Lt, 1, 2, v_int(1); "lt")]
    #[test_case(Le, 2, 2, v_int(1); "le")]
    #[test_case(Gt, 1, 2, v_int(0); "gt")]
    #[test_case(Ge, 3, 2, v_int(1); "ge")]
    #[test_case(And, 1, 0, v_int(0); "and")]
    #[test_case(Or, 1, 0, v_int(1); "or")]
    #[test_case(BitAnd, 12, 10, v_int(8); "bit and")]
    #[test_case(BitOr, 12, 10, v_int(14); "bit or")]
    #[test_case(BitXor, 12, 10, v_int(6); "bit xor")]
    fn test_integer_binary_ops(op: Opcode, lhs: i32, rhs: i32, expected: Var) {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_int(lhs).push_int(rhs).op(op);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        let (script, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Completed);
        assert_eq!(global(&host, 0), Some(expected));
        assert!(script.data_stack().is_empty());
    }

    #[test_case(Not, 0, v_int(1); "not")]
    #[test_case(Negate, 5, v_int(-5); "negate")]
    #[test_case(BitNot, 0, v_int(-1); "bit not")]
    #[test_case(Floor, 4, v_int(4); "floor of int")]
    fn test_integer_unary_ops(op: Opcode, operand: i32, expected: Var) {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_int(operand).op(op);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        run(&single(code), &mut host);
        assert_eq!(global(&host, 0), Some(expected));
    }

    #[test]
    fn test_float_promotion() {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_float(1.5).push_int(2).op(Add);
        });
        capture(&mut code, 1, |c| {
            c.push_float(2.75).op(Floor);
        });
        capture(&mut code, 2, |c| {
            c.push_int(3).push_float(2.5).op(Gt);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        run(&single(code), &mut host);
        assert_eq!(global(&host, 0), Some(v_float(3.5)));
        assert_eq!(global(&host, 1), Some(v_int(2)));
        assert_eq!(global(&host, 2), Some(v_bool_int(true)));
    }

    #[test]
    fn test_concat_is_the_only_string_operator() {
        let mut builder = ContainerBuilder::new();
        let prefix = builder.string("hp: ");
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_string(prefix).push_int(10).op(Concat);
        });
        capture(&mut code, 1, |c| {
            c.push_string(prefix).push_int(10).op(Add);
        });
        finish(&mut code);
        builder.procedure(ProcedureSpec::new("test", code));

        let mut host = MockHost::new();
        let (script, outcome) = run(&builder, &mut host);
        assert_eq!(global(&host, 0), Some(v_str("hp: 10")));
        assert_eq!(
            outcome,
            CallOutcome::Aborted(ScriptError::Value(VarError::BinaryTypeMismatch {
                op: "add",
                lhs: VarType::TYPE_STR,
                rhs: VarType::TYPE_INT,
            }))
        );
        assert_eq!(global(&host, 1), None);
        assert!(script.data_stack().is_empty());
    }

    #[test]
    fn test_division_by_zero_is_contained() {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_int(1).push_int(0).op(Div);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        let (script, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Aborted(ScriptError::DivisionByZero));
        assert_eq!(script.state(), ScriptState::Idle);
        assert!(script.data_stack().is_empty());
        assert!(host.global_vars.is_empty());
    }

    #[test]
    fn test_object_comparisons() {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.op(SelfObj).push_int(0).op(Eq);
        });
        capture(&mut code, 1, |c| {
            c.op(SelfObj).op(SelfObj).op(Lt);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        let (_, outcome) = run(&single(code), &mut host);
        assert_eq!(global(&host, 0), Some(v_int(1)));
        assert!(matches!(
            outcome,
            CallOutcome::Aborted(ScriptError::Value(VarError::BinaryTypeMismatch {
                op: "compare",
                ..
            }))
        ));
    }

    #[test]
    fn test_stack_shuffling() {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_int(1).push_int(2).op(Swap).op(Pop);
        });
        capture(&mut code, 1, |c| {
            c.push_int(7).op(Dup).op(Add);
        });
        capture(&mut code, 2, |c| {
            c.push_int(9).op(DataToReturn).push_int(1).op(ReturnToData).op(Sub);
        });
        code.op(Noop).op(CriticalStart).op(CriticalDone);
        finish(&mut code);
        let mut host = MockHost::new();
        let (_, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Completed);
        assert_eq!(global(&host, 0), Some(v_int(2)));
        assert_eq!(global(&host, 1), Some(v_int(14)));
        assert_eq!(global(&host, 2), Some(v_int(-8)));
    }

    #[test]
    fn test_underflow_is_contained() {
        let mut code = CodeAssembler::new();
        code.op(Pop).op(Pop).op(Pop);
        finish(&mut code);
        let mut host = MockHost::new();
        let (script, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Aborted(ScriptError::StackUnderflow));
        assert!(script.data_stack().is_empty());
    }

    #[test]
    fn test_locals_persist_across_calls() {
        let mut builder = ContainerBuilder::new();
        let mut set = CodeAssembler::new();
        set.push_int(3).push_int(7).op(SetLocalVar);
        finish(&mut set);
        let mut get = CodeAssembler::new();
        capture(&mut get, 0, |c| {
            c.push_int(3).op(LocalVar);
        });
        finish(&mut get);
        let mut bad = CodeAssembler::new();
        bad.push_int(64).op(LocalVar);
        finish(&mut bad);
        builder.procedure(ProcedureSpec::new("set", set));
        builder.procedure(ProcedureSpec::new("get", get));
        builder.procedure(ProcedureSpec::new("bad", bad));

        let mut host = MockHost::new();
        let mut script = script_from(&builder, None).unwrap();
        assert_eq!(script.call("set", CallContext::default(), &mut host), CallOutcome::Completed);
        assert_eq!(script.call("get", CallContext::default(), &mut host), CallOutcome::Completed);
        assert_eq!(global(&host, 0), Some(v_int(7)));
        assert_eq!(
            script.call("bad", CallContext::default(), &mut host),
            CallOutcome::Aborted(ScriptError::LocalOutOfRange {
                index: 64,
                count: 64
            })
        );
    }

    #[test]
    fn test_call_with_arguments() {
        let mut builder = ContainerBuilder::new();
        let mut main = CodeAssembler::new();
        capture(&mut main, 0, |c| {
            c.push_int(10).push_int(20).push_int(2).push_int(1).op(Call);
        });
        finish(&mut main);
        let mut add2 = CodeAssembler::new();
        add2.op(PushBase)
            .push_int(0)
            .op(Fetch)
            .push_int(1)
            .op(Fetch)
            .op(Add)
            .op(PopBase)
            .op(Return);
        builder.procedure(ProcedureSpec::new("test", main));
        builder.procedure(ProcedureSpec::new("add2", add2).argument_count(2));

        let mut host = MockHost::new();
        let (script, outcome) = run(&builder, &mut host);
        assert_eq!(outcome, CallOutcome::Completed);
        assert_eq!(global(&host, 0), Some(v_int(30)));
        assert!(script.data_stack().is_empty());
    }

    #[test]
    fn test_store_into_argument_slot() {
        let mut builder = ContainerBuilder::new();
        let mut main = CodeAssembler::new();
        capture(&mut main, 0, |c| {
            c.push_int(4).push_int(1).push_int(1).op(Call);
        });
        finish(&mut main);
        // Doubles its argument in place, then returns it.
        let mut double = CodeAssembler::new();
        double
            .op(PushBase)
            .push_int(0)
            .op(Fetch)
            .push_int(2)
            .op(Mul)
            .push_int(0)
            .op(Store)
            .push_int(0)
            .op(Fetch)
            .op(PopBase)
            .op(Return);
        builder.procedure(ProcedureSpec::new("test", main));
        builder.procedure(ProcedureSpec::new("double", double).argument_count(1));

        let mut host = MockHost::new();
        run(&builder, &mut host);
        assert_eq!(global(&host, 0), Some(v_int(8)));
    }

    #[test]
    fn test_script_globals_on_the_stack() {
        let mut code = CodeAssembler::new();
        code.op(SetGlobal).push_int(5);
        capture(&mut code, 0, |c| {
            c.push_int(0).op(FetchGlobal);
        });
        code.push_int(9).push_int(0).op(StoreGlobal);
        capture(&mut code, 1, |c| {
            c.push_int(0).op(FetchGlobal);
        });
        code.op(Pop);
        finish(&mut code);
        let mut host = MockHost::new();
        let (_, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Completed);
        assert_eq!(global(&host, 0), Some(v_int(5)));
        assert_eq!(global(&host, 1), Some(v_int(9)));
    }

    #[test]
    fn test_pop_to_base_discards_the_frame() {
        let mut code = CodeAssembler::new();
        code.push_int(1)
            .push_int(2)
            .push_int(2)
            .op(PushBase)
            .op(PopToBase)
            .op(PopBase);
        finish(&mut code);
        let mut host = MockHost::new();
        let (script, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Completed);
        assert!(script.data_stack().is_empty());
    }

    #[test]
    fn test_lookup_string_proc() {
        let mut builder = ContainerBuilder::new();
        let name = builder.string("seven");
        let mut main = CodeAssembler::new();
        capture(&mut main, 0, |c| {
            c.push_int(0).push_string(name).op(LookupStringProc).op(Call);
        });
        finish(&mut main);
        let mut seven = CodeAssembler::new();
        seven.push_int(7).op(Return);
        builder.procedure(ProcedureSpec::new("test", main));
        builder.procedure(ProcedureSpec::new("seven", seven));

        let mut host = MockHost::new();
        run(&builder, &mut host);
        assert_eq!(global(&host, 0), Some(v_int(7)));
    }

    #[test_case(2, CallOutcome::Completed; "matching count")]
    #[test_case(3, CallOutcome::Aborted(ScriptError::ArgumentCountMismatch {
        procedure: "two".into(), expected: 2, actual: 3
    }); "mismatched count")]
    fn test_check_arg_count(actual: i32, expected: CallOutcome) {
        let mut builder = ContainerBuilder::new();
        let mut main = CodeAssembler::new();
        main.push_int(1).push_int(actual).op(CheckArgCount);
        finish(&mut main);
        let mut two = CodeAssembler::new();
        finish(&mut two);
        builder.procedure(ProcedureSpec::new("test", main));
        builder.procedure(ProcedureSpec::new("two", two).argument_count(2));

        let mut host = MockHost::new();
        assert_eq!(run(&builder, &mut host).1, expected);
    }

    #[test]
    fn test_call_unknown_index() {
        let mut code = CodeAssembler::new();
        code.push_int(0).push_int(99).op(Call);
        finish(&mut code);
        let mut host = MockHost::new();
        assert_eq!(
            run(&single(code), &mut host).1,
            CallOutcome::Aborted(ScriptError::UnknownProcedure("#99".into()))
        );
    }

    #[test_case(0, None; "false condition skips")]
    #[test_case(1, Some(v_int(1)); "true condition falls through")]
    fn test_if(condition: i32, expected: Option<Var>) {
        let mut code = CodeAssembler::new();
        let skip = code.new_label();
        code.push_label(skip).push_int(condition).op(If);
        capture(&mut code, 0, |c| {
            c.push_int(1);
        });
        code.bind(skip);
        capture(&mut code, 1, |c| {
            c.push_int(2);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        run(&single(code), &mut host);
        assert_eq!(global(&host, 0), expected);
        assert_eq!(global(&host, 1), Some(v_int(2)));
    }

    #[test]
    fn test_while_loop() {
        let mut code = CodeAssembler::new();
        code.push_int(0).push_int(3).op(SetLocalVar);
        code.push_int(1).push_int(0).op(SetLocalVar);
        let top = code.here();
        let end = code.new_label();
        code.push_label(end)
            .push_int(0)
            .op(LocalVar)
            .push_int(0)
            .op(Gt)
            .op(While);
        code.push_int(0)
            .push_int(0)
            .op(LocalVar)
            .push_int(1)
            .op(Sub)
            .op(SetLocalVar);
        code.push_int(1)
            .push_int(1)
            .op(LocalVar)
            .push_int(1)
            .op(Add)
            .op(SetLocalVar);
        code.push_label(top).op(Jump);
        code.bind(end);
        capture(&mut code, 0, |c| {
            c.push_int(1).op(LocalVar);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        let (_, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Completed);
        assert_eq!(global(&host, 0), Some(v_int(3)));
    }

    #[test]
    fn test_jump_out_of_range() {
        let mut code = CodeAssembler::new();
        code.push_int(100_000).op(Jump);
        let mut host = MockHost::new();
        assert_eq!(
            run(&single(code), &mut host).1,
            CallOutcome::Aborted(ScriptError::AddressOutOfRange(100_000))
        );
    }

    #[test]
    fn test_exit_halts() {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_int(1);
        });
        code.op(Exit);
        capture(&mut code, 1, |c| {
            c.push_int(2);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        let (script, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Halted);
        assert_eq!(script.state(), ScriptState::Halted);
        assert_eq!(global(&host, 0), Some(v_int(1)));
        assert_eq!(global(&host, 1), None);
        assert!(script.data_stack().is_empty());
    }

    #[test]
    fn test_tick_limit() {
        let mut code = CodeAssembler::new();
        let top = code.here();
        code.push_label(top).op(Jump);
        let config = VmConfig {
            max_ticks: Some(50),
            ..Default::default()
        };
        let mut script = script_with_config(&single(code), None, &config).unwrap();
        let mut host = MockHost::new();
        assert_eq!(
            script.call("test", CallContext::default(), &mut host),
            CallOutcome::Aborted(ScriptError::TickLimitExceeded(50))
        );
        assert_eq!(script.state(), ScriptState::Idle);
    }

    #[test]
    fn test_running_off_the_end() {
        let mut code = CodeAssembler::new();
        code.push_int(5);
        let mut host = MockHost::new();
        let (script, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Completed);
        // The argument count marker remains under the discarded 5.
        assert_eq!(script.data_stack().len(), 1);
    }

    #[test]
    fn test_push_string_picks_table_by_next_opcode() {
        let mut builder = ContainerBuilder::new();
        // The procedure name is the first identifier and "hello" the first string: same offset.
        let greeting = builder.string("hello");
        let mut code = CodeAssembler::new();
        code.push_string(greeting).op(DisplayMsg);
        capture(&mut code, 0, |c| {
            c.push_string(greeting).op(FetchExternal);
        });
        finish(&mut code);
        builder.procedure(ProcedureSpec::new("test", code));

        let mut host = MockHost::new();
        host.externals.insert(ArcStr::from("test"), v_int(42));
        run(&builder, &mut host);
        assert_eq!(
            host.effects,
            vec![(None, HostEffect::DisplayMessage(ArcStr::from("hello")))]
        );
        assert_eq!(global(&host, 0), Some(v_int(42)));
    }

    #[test]
    fn test_unresolved_string() {
        let mut code = CodeAssembler::new();
        code.push_string(500).op(DisplayMsg);
        finish(&mut code);
        let mut host = MockHost::new();
        assert_eq!(
            run(&single(code), &mut host).1,
            CallOutcome::Aborted(ScriptError::UnresolvedString(500))
        );
    }

    #[test]
    fn test_external_variables() {
        let mut builder = ContainerBuilder::new();
        let counter = builder.identifier("counter");
        let shared = builder.identifier("shared");
        let missing = builder.identifier("missing");
        let mut code = CodeAssembler::new();
        code.push_int(5).push_string(counter).op(StoreExternal);
        code.push_string(shared).op(ExportVar);
        capture(&mut code, 0, |c| {
            c.push_string(missing).op(FetchExternal);
        });
        finish(&mut code);
        builder.procedure(ProcedureSpec::new("test", code));

        let mut host = MockHost::new();
        let (_, outcome) = run(&builder, &mut host);
        assert_eq!(outcome, CallOutcome::Completed);
        assert_eq!(host.externals.get("counter"), Some(&v_int(5)));
        assert_eq!(host.exported, vec![ArcStr::from("shared")]);
        assert_eq!(global(&host, 0), Some(v_int(0)));
    }

    #[test]
    fn test_map_and_global_vars() {
        let mut code = CodeAssembler::new();
        code.push_int(4).push_int(11).op(SetMapVar);
        capture(&mut code, 0, |c| {
            c.push_int(4).op(MapVar);
        });
        capture(&mut code, 1, |c| {
            c.push_int(5).op(MapVar);
        });
        capture(&mut code, 2, |c| {
            c.push_int(0).op(GlobalVar);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        run(&single(code), &mut host);
        assert_eq!(host.map_vars.get(&4), Some(&v_int(11)));
        assert_eq!(global(&host, 0), Some(v_int(11)));
        assert_eq!(global(&host, 1), Some(v_int(0)));
        assert_eq!(global(&host, 2), Some(v_int(11)));
    }

    #[test]
    fn test_call_context_is_visible_during_the_call() {
        let mut host = MockHost::new();
        let owner = host.spawn(MockObject::named("door"));
        let source = host.spawn(MockObject::named("Vic"));
        let target = host.spawn(MockObject::named("lock"));

        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.op(SelfObj);
        });
        capture(&mut code, 1, |c| {
            c.op(SourceObj);
        });
        capture(&mut code, 2, |c| {
            c.op(TargetObj);
        });
        capture(&mut code, 3, |c| {
            c.op(FixedParam);
        });
        capture(&mut code, 4, |c| {
            c.op(UsedSkill);
        });
        capture(&mut code, 5, |c| {
            c.op(SourceObj).op(ObjName);
        });
        finish(&mut code);

        let mut script = script_from(&single(code), Some(owner)).unwrap();
        let context = CallContext {
            source,
            target,
            fixed_param: 12,
            used_skill: Some(3),
        };
        assert_eq!(script.call("test", context, &mut host), CallOutcome::Completed);
        assert_eq!(global(&host, 0), Some(v_obj(owner)));
        assert_eq!(global(&host, 1), Some(v_obj(source)));
        assert_eq!(global(&host, 2), Some(v_obj(target)));
        assert_eq!(global(&host, 3), Some(v_int(12)));
        assert_eq!(global(&host, 4), Some(v_int(3)));
        assert_eq!(global(&host, 5), Some(v_str("Vic")));
        assert_eq!(script.call_context(), &CallContext::default());
    }

    #[test]
    fn test_missing_context_reads_as_empty() {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.op(SelfObj);
        });
        capture(&mut code, 1, |c| {
            c.op(UsedSkill);
        });
        capture(&mut code, 2, |c| {
            c.op(DudeObj);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        run(&single(code), &mut host);
        assert_eq!(global(&host, 0), Some(v_obj(NOTHING)));
        assert_eq!(global(&host, 1), Some(v_int(-1)));
        assert_eq!(global(&host, 2), Some(v_obj(NOTHING)));
    }

    #[test]
    fn test_stale_object_reads_as_empty() {
        let mut host = MockHost::new();
        let gone = host.spawn(MockObject::named("rat"));
        host.destroy(gone);
        host.spawn(MockObject::named("new rat"));

        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.op(SourceObj).op(ObjName);
        });
        capture(&mut code, 1, |c| {
            c.op(SourceObj).op(ObjType);
        });
        capture(&mut code, 2, |c| {
            c.push_int(0).op(ObjName);
        });
        finish(&mut code);
        let mut script = script_from(&single(code), None).unwrap();
        let context = CallContext {
            source: gone,
            ..Default::default()
        };
        assert_eq!(script.call("test", context, &mut host), CallOutcome::Completed);
        assert_eq!(global(&host, 0), Some(v_str("")));
        assert_eq!(global(&host, 1), Some(v_int(0)));
        assert_eq!(global(&host, 2), Some(v_str("")));
    }

    #[test]
    fn test_critter_stats() {
        let mut host = MockHost::new();
        let critter = host.spawn(MockObject::named("gecko").with_stat(1, 5));
        let dead: Obj = Obj::mk(40, 0);

        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.op(SourceObj).push_int(1).op(GetCritterStat);
        });
        capture(&mut code, 1, |c| {
            c.op(SourceObj).push_int(2).push_int(8).op(SetCritterStat);
        });
        capture(&mut code, 2, |c| {
            c.op(TargetObj).push_int(2).push_int(8).op(SetCritterStat);
        });
        capture(&mut code, 3, |c| {
            c.op(SourceObj).push_int(9).op(GetCritterStat);
        });
        finish(&mut code);
        let mut script = script_from(&single(code), None).unwrap();
        let context = CallContext {
            source: critter,
            target: dead,
            ..Default::default()
        };
        script.call("test", context, &mut host);

        assert_eq!(global(&host, 0), Some(v_int(5)));
        assert_eq!(global(&host, 1), Some(v_int(0)));
        assert_eq!(global(&host, 2), Some(v_int(-1)));
        assert_eq!(global(&host, 3), Some(v_int(0)));
        assert_eq!(host.object(critter).unwrap().stats.get(&2), Some(&8));
    }

    #[test]
    fn test_message_lookup() {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_int(1).push_int(100).op(MessageStr);
        });
        capture(&mut code, 1, |c| {
            c.push_int(1).push_int(999).op(MessageStr);
        });
        capture(&mut code, 2, |c| {
            c.push_int(1).push_int(100).op(MessageSpeech);
        });
        capture(&mut code, 3, |c| {
            c.push_int(1).push_int(999).op(MessageSpeech);
        });
        finish(&mut code);
        let mut host = MockHost::new();
        host.add_message(1, 100, "Hello, stranger.", "greet");
        let (_, outcome) = run(&single(code), &mut host);
        assert_eq!(outcome, CallOutcome::Completed);
        assert_eq!(global(&host, 0), Some(v_str("Hello, stranger.")));
        assert_eq!(global(&host, 1), Some(v_str("")));
        assert_eq!(global(&host, 2), Some(v_str("greet")));
        assert_eq!(global(&host, 3), Some(v_str("")));
    }

    #[test]
    fn test_effects_are_sent_to_the_host() {
        let mut builder = ContainerBuilder::new();
        let sound = builder.string("door_open");
        let mut code = CodeAssembler::new();
        code.push_int(3).op(PlayMovie);
        code.push_string(sound).op(PlaySfx);
        code.push_int(250).op(GiveExpPoints);
        finish(&mut code);
        builder.procedure(ProcedureSpec::new("test", code));

        let mut host = MockHost::new();
        let owner = host.spawn(MockObject::named("door"));
        let mut script = script_from(&builder, Some(owner)).unwrap();
        script.call("test", CallContext::default(), &mut host);
        assert_eq!(
            host.effects,
            vec![
                (Some(owner), HostEffect::PlayMovie(3)),
                (Some(owner), HostEffect::PlaySound(ArcStr::from("door_open"))),
                (Some(owner), HostEffect::GiveExperience(250)),
            ]
        );
    }

    #[test]
    fn test_overrides_reset_per_call() {
        let mut builder = ContainerBuilder::new();
        let mut overriding = CodeAssembler::new();
        overriding.op(ScriptOverrides);
        finish(&mut overriding);
        let mut plain = CodeAssembler::new();
        finish(&mut plain);
        builder.procedure(ProcedureSpec::new("use_p_proc", overriding));
        builder.procedure(ProcedureSpec::new("look_at_p_proc", plain));

        let mut host = MockHost::new();
        let mut script = script_from(&builder, None).unwrap();
        script.call("use_p_proc", CallContext::default(), &mut host);
        assert!(script.overrides());
        script.call("look_at_p_proc", CallContext::default(), &mut host);
        assert!(!script.overrides());
    }

    #[test]
    fn test_random_stays_in_bounds() {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_int(1).push_int(6).op(Random);
        });
        capture(&mut code, 1, |c| {
            c.push_int(6).push_int(1).op(Random);
        });
        finish(&mut code);
        let builder = single(code);
        let mut host = MockHost::new();
        let mut script = script_from(&builder, None).unwrap();
        for _ in 0..20 {
            script.call("test", CallContext::default(), &mut host);
            for slot in 0..2 {
                let roll = global(&host, slot).and_then(|v| v.as_integer()).unwrap();
                assert!((1..=6).contains(&roll), "rolled {roll}");
            }
        }
    }

    #[test]
    fn test_call_script_procedure() {
        let mut builder = ContainerBuilder::new();
        let talk = builder.string("talk_p_proc");
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_int(7).push_string(talk).op(CallScriptProcedure);
        });
        capture(&mut code, 1, |c| {
            c.push_int(8).push_string(talk).op(CallScriptProcedure);
        });
        finish(&mut code);
        builder.procedure(ProcedureSpec::new("test", code));

        let mut host = MockHost::new();
        let source = host.spawn(MockObject::named("Vic"));
        host.script_results
            .insert((7, "talk_p_proc".to_string()), v_int(99));
        let mut script = script_from(&builder, None).unwrap();
        let context = CallContext {
            source,
            ..Default::default()
        };
        script.call("test", context.clone(), &mut host);

        assert_eq!(global(&host, 0), Some(v_int(99)));
        assert_eq!(global(&host, 1), Some(v_int(0)));
        assert_eq!(host.script_calls.len(), 2);
        assert_eq!(host.script_calls[0], (7, "talk_p_proc".to_string(), context));
    }

    #[test]
    fn test_flags_do_not_affect_execution() {
        let mut code = CodeAssembler::new();
        capture(&mut code, 0, |c| {
            c.push_int(1);
        });
        finish(&mut code);
        let mut builder = ContainerBuilder::new();
        builder.procedure(
            ProcedureSpec::new("critical_p_proc", code).flags(ProcedureFlags::from_bits(0x10)),
        );
        let mut host = MockHost::new();
        let mut script = script_from(&builder, None).unwrap();
        assert_eq!(
            script.call("critical_p_proc", CallContext::default(), &mut host),
            CallOutcome::Completed
        );
    }
}
