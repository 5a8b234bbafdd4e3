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

use crate::config::VmConfig;
use crate::vm::{CallContext, ExecState, Flow, ScriptError, ScriptHost, ValueStack, dispatch};
use intvm_container::Container;
use intvm_var::{Obj, v_int};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// The program counter value meaning "no procedure is running".
const IDLE_SENTINEL: usize = 0;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ScriptState {
    NotInitialized,
    Running,
    Idle,
    Halted,
}

/// The result of executing a single instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Continuing,
    Halted,
    Failed(ScriptError),
}

/// How an `initialize` or `call` ended. Script errors have already been logged and contained by
/// the time the host sees `Aborted`.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Completed,
    Halted,
    Aborted(ScriptError),
    NoSuchProcedure,
    AlreadyInitialized,
}

/// One running instance of a script, usually bound to the world object that owns it.
///
/// The container is shared with every other instance of the same script; everything mutable
/// lives here, so an instance must be driven by one thread at a time.
pub struct ScriptExecution {
    exec: ExecState,
    state: ScriptState,
    max_ticks: Option<usize>,
    /// Data stack depth when the current run started. Anything below it belongs to the script
    /// (its globals region) rather than to the run.
    run_base: usize,
}

impl ScriptExecution {
    pub fn new(container: Arc<Container>, owner: Option<Obj>, config: &VmConfig) -> Self {
        Self {
            exec: ExecState::new(container, owner, config.local_variable_count),
            state: ScriptState::NotInitialized,
            max_ticks: config.max_ticks,
            run_base: 0,
        }
    }

    pub fn filename(&self) -> &str {
        self.exec.container.name()
    }

    pub fn program_counter(&self) -> usize {
        self.exec.program_counter()
    }

    pub fn state(&self) -> ScriptState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.exec.initialized
    }

    /// Whether the last call asked the host to skip its default behaviour.
    pub fn overrides(&self) -> bool {
        self.exec.overrides
    }

    pub fn owner(&self) -> Option<Obj> {
        self.exec.owner
    }

    pub fn call_context(&self) -> &CallContext {
        &self.exec.context
    }

    pub fn data_stack(&self) -> &ValueStack {
        &self.exec.data_stack
    }

    pub fn has_procedure(&self, name: &str) -> bool {
        self.exec.container.has_procedure(name)
    }

    /// Run the startup code at offset 0, once. Later calls do nothing.
    pub fn initialize(&mut self, host: &mut dyn ScriptHost) -> CallOutcome {
        if self.exec.initialized {
            return CallOutcome::AlreadyInitialized;
        }
        debug!(script = self.filename(), "Initializing script");
        self.run_base = self.exec.data_stack.len();
        let outcome = match self.exec.set_program_counter(IDLE_SENTINEL as i64) {
            Ok(()) => self.run(host),
            Err(e) => self.contain(e),
        };
        self.discard_result();
        self.exec.initialized = true;
        self.finish(&outcome);
        outcome
    }

    /// Invoke a named procedure. A missing procedure is not an error; nothing happens.
    pub fn call(
        &mut self,
        name: &str,
        context: CallContext,
        host: &mut dyn ScriptHost,
    ) -> CallOutcome {
        self.exec.overrides = false;
        let Some(body) = self.exec.container.procedure(name).map(|p| p.body_offset) else {
            debug!(script = self.filename(), procedure = name, "No such procedure");
            return CallOutcome::NoSuchProcedure;
        };
        debug!(script = self.filename(), procedure = name, body, "Calling procedure");

        self.exec.context = context;
        let outcome = match self.exec.set_program_counter(body as i64) {
            Ok(()) => {
                self.run_base = self.exec.data_stack.len();
                self.exec.data_stack.push(v_int(0));
                self.exec.return_stack.push(v_int(IDLE_SENTINEL as i64));
                self.run(host)
            }
            Err(e) => self.contain(e),
        };
        self.discard_result();
        self.exec.context = CallContext::default();
        self.finish(&outcome);
        outcome
    }

    /// Execute one instruction at the program counter.
    pub fn step(&mut self, host: &mut dyn ScriptHost) -> RunOutcome {
        let offset = self.exec.program_counter();
        let opcode = match self.exec.read_opcode() {
            Ok(opcode) => opcode,
            Err(e) => return RunOutcome::Failed(e),
        };
        self.exec.opcode = opcode;
        self.exec.opcode_offset = offset;
        trace!(offset, opcode = format_args!("{opcode:#06x}"), "Executing");

        let handler = dispatch(opcode);
        match handler(&mut self.exec, host) {
            Ok(Flow::Continue) => RunOutcome::Continuing,
            Ok(Flow::Halt) => RunOutcome::Halted,
            Err(e) => RunOutcome::Failed(e),
        }
    }

    /// The fetch-execute loop. Stops when control returns to the idle sentinel, on a halt, at
    /// the end of the code, or on the first error.
    fn run(&mut self, host: &mut dyn ScriptHost) -> CallOutcome {
        self.state = ScriptState::Running;
        let mut ticks = 0usize;
        loop {
            if self.exec.at_end() {
                return CallOutcome::Completed;
            }
            if let Some(max_ticks) = self.max_ticks
                && ticks >= max_ticks
            {
                return self.contain(ScriptError::TickLimitExceeded(max_ticks));
            }
            ticks += 1;
            match self.step(host) {
                RunOutcome::Continuing => {
                    if self.exec.program_counter() == IDLE_SENTINEL {
                        return CallOutcome::Completed;
                    }
                }
                RunOutcome::Halted => {
                    debug!(script = self.filename(), ticks, "Script halted");
                    self.unwind_halt();
                    return CallOutcome::Halted;
                }
                RunOutcome::Failed(e) => return self.contain(e),
            }
        }
    }

    /// Log a fault and reset the data stack to a single placeholder result, so the run can end
    /// as though it had completed.
    fn contain(&mut self, e: ScriptError) -> CallOutcome {
        error!(
            script = self.filename(),
            opcode = format_args!("{:#06x}", self.exec.opcode),
            offset = self.exec.opcode_offset,
            error = %e,
            "Script error; abandoning run"
        );
        self.unwind();
        CallOutcome::Aborted(e)
    }

    /// Abandon everything a failed run left behind, the globals region included. A zero stands
    /// in for the result the caller discards.
    fn unwind(&mut self) {
        self.exec.data_stack.clear();
        self.exec.data_stack.push(v_int(0));
        self.exec.svar_base = 0;
        self.exec.reset_frames();
    }

    /// A halt drops only what the halted run pushed; the script's globals stay where they are.
    fn unwind_halt(&mut self) {
        self.exec.data_stack.truncate(self.run_base);
        self.exec.data_stack.push(v_int(0));
        self.exec.reset_frames();
    }

    /// Drop the implicit return value a run leaves on the data stack.
    fn discard_result(&mut self) {
        if self.exec.data_stack.pop().is_err() {
            warn!(script = self.filename(), "No result value left on the data stack");
        }
    }

    fn finish(&mut self, outcome: &CallOutcome) {
        self.state = match outcome {
            CallOutcome::Halted => ScriptState::Halted,
            _ => ScriptState::Idle,
        };
    }
}
