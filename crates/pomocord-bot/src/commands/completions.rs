use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::Cli;

/// Write the completion script for `shell` to `out`.
pub fn run<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "pomocord", out);
}
