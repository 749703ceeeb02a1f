use anyhow::{bail, Context, Result};
use log::*;
use ls8::Computer;

mod program;
use program::Program;

fn main() -> Result<()> {
    env_logger::init();
    let our_arguments: Vec<String> = std::env::args().collect();
    debug!("our_arguments: {:?}", our_arguments);
    let program = match our_arguments.len() {
        1 => {
            info!("No program given, running the built-in one.");
            Program::fallback()
        }
        2 => Program::from_path(&our_arguments[1])?,
        _ => {
            error!("Usage: ls8-run [path/to/program.ls8]");
            bail!("wrong number of arguments");
        }
    };
    let mut computer = Computer::new(std::io::stdout().lock());
    computer
        .load(&program.bytes)
        .context("program does not fit in memory")?;
    if let Err(fault) = computer.run() {
        error!("CPU: {:?}", computer.get_cpu());
        return Err(fault).context("the machine faulted");
    }
    Ok(())
}
