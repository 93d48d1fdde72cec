//! Implementation of the `medic sysinfo` command.

use crate::cli::SysinfoArgs;
use crate::config::Config;
use crate::error::Result;
use crate::exit_codes;
use crate::sysinfo::report;

pub fn cmd_sysinfo(args: SysinfoArgs, config: &Config) -> Result<i32> {
    print!("{}", report(args.section, &config.sysinfo));
    Ok(exit_codes::SUCCESS)
}
