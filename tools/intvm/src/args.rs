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

use clap_derive::Parser;
use eyre::eyre;
use figment::Figment;
use figment::providers::{Format, Serialized, Yaml};
use intvm_kernel::VmConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct Args {
    #[clap(help = "Name of the script to load, without the `.int` extension")]
    pub script: String,

    #[clap(
        long,
        help = "Directory holding the compiled `.int` scripts",
        default_value = "."
    )]
    pub script_dir: PathBuf,

    #[clap(
        long,
        help = "List the script's procedures, identifiers and strings instead of running it"
    )]
    pub inspect: bool,

    #[clap(
        long = "call",
        help = "Procedure to call after the script is initialized. May be repeated; calls run in order"
    )]
    pub calls: Vec<String>,

    #[clap(
        long,
        help = "Fixed parameter passed to every call",
        default_value = "0"
    )]
    pub fixed_param: i64,

    #[command(flatten)]
    pub vm_args: VmArgs,

    #[clap(long, help = "Yaml config file to use; command line values override it")]
    pub config_file: Option<PathBuf>,

    #[clap(long, help = "Enable debug logging")]
    pub debug: bool,
}

#[derive(Parser, Debug)]
pub struct VmArgs {
    #[arg(
        long,
        help = "Abort any single initialize or call after this many instructions"
    )]
    pub max_ticks: Option<usize>,

    #[arg(long, help = "Number of local variable slots per script instance")]
    pub local_variable_count: Option<usize>,
}

impl VmArgs {
    pub fn merge_config(&self, config: &mut VmConfig) -> Result<(), eyre::Report> {
        if let Some(max_ticks) = self.max_ticks {
            config.max_ticks = Some(max_ticks);
        }
        if let Some(count) = self.local_variable_count {
            if count == 0 {
                return Err(eyre!("local variable count must be at least 1"));
            }
            config.local_variable_count = count;
        }
        Ok(())
    }
}

impl Args {
    /// Load the configuration file if we have it, then lay the command line arguments over it.
    pub fn load_config(&self) -> Result<VmConfig, eyre::Report> {
        let mut config = match &self.config_file {
            Some(config_path) => Figment::new()
                .merge(Serialized::defaults(VmConfig::default()))
                .merge(Yaml::file(config_path))
                .extract::<VmConfig>()
                .map_err(|e| {
                    eyre!("Failed to parse configuration from {config_path:?}: {e}")
                })?,
            None => VmConfig::default(),
        };
        self.vm_args.merge_config(&mut config)?;
        Ok(config)
    }
}
