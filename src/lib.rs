pub mod config;
pub mod cpu;
pub mod error;
pub mod instruction;
pub mod io;
pub mod loader;
pub mod machine;
pub mod memory;
pub mod registers;
pub mod sign_extend;
pub mod trap_vector;

pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::machine::Machine;

use std::fs::File;

use crate::io::Io;

/// Loads every configured image into one `Machine`, in argument order, then
/// runs it to completion. `should_stop` is polled between instructions so a
/// host signal handler can end the run without the core modelling its own
/// cancellation.
pub fn run(config: Config, io: impl Io, should_stop: impl FnMut() -> bool) -> Result<(), Error> {
    let mut machine = Machine::new(io);

    for path in &config.images {
        let file = File::open(path)
            .map_err(|source| Error::ImageLoad { path: path.clone(), source })?;
        loader::load_image(&mut machine.memory, file)
            .map_err(|source| Error::ImageLoad { path: path.clone(), source })?;
    }

    machine.run(should_stop)
}
