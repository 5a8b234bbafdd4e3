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
mod args;
mod host;

use crate::args::Args;
use crate::host::LoggingHost;
use clap::Parser;
use intvm_container::{Container, DirectorySource};
use intvm_kernel::{CallContext, CallOutcome, ScriptExecution};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

fn inspect(container: &Container) {
    println!("{} ({} bytes)", container.name(), container.size());
    println!();
    println!("Procedures:");
    for (index, procedure) in container.procedures().iter().enumerate() {
        println!(
            "  {index:>3} {:<32} args={} flags={} delay={} body={:#x} condition={:#x}",
            procedure.name,
            procedure.argument_count,
            procedure.flags,
            procedure.delay,
            procedure.body_offset,
            procedure.condition_offset,
        );
    }
    println!();
    println!("Identifiers:");
    for (offset, name) in container.identifiers() {
        println!("  {offset:>6} {name}");
    }
    println!();
    println!("Strings:");
    for (offset, text) in container.strings() {
        println!("  {offset:>6} {text:?}");
    }
}

fn main() -> Result<(), eyre::Report> {
    color_eyre::install()?;
    let args: Args = Args::parse();

    let main_subscriber = tracing_subscriber::fmt()
        .compact()
        .with_ansi(true)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NONE)
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(main_subscriber).unwrap_or_else(|e| {
        eprintln!("Unable to set configure logging: {e}");
        std::process::exit(1);
    });

    let config = args.load_config()?;
    let source = DirectorySource::new(args.script_dir.clone());
    let container = Arc::new(Container::load_from(&source, &args.script)?);

    if args.inspect {
        inspect(&container);
        return Ok(());
    }

    let mut host = LoggingHost::new();
    let mut script = ScriptExecution::new(container, None, &config);
    info!(script = script.filename(), ?config, "Loaded script");

    let outcome = script.initialize(&mut host);
    info!(?outcome, "Initialized");

    for name in &args.calls {
        let context = CallContext {
            source: host.dude_obj(),
            fixed_param: args.fixed_param,
            ..Default::default()
        };
        match script.call(name, context, &mut host) {
            CallOutcome::NoSuchProcedure => warn!(procedure = %name, "No such procedure"),
            outcome => info!(
                procedure = %name,
                ?outcome,
                overrides = script.overrides(),
                "Call finished"
            ),
        }
    }
    Ok(())
}
