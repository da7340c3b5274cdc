use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lc3vm::config::Config;
use lc3vm::io::{restore_terminal, TerminalGuard, TerminalIo};

fn main() {
    let config = Config::from_args().unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(err.exit_code());
    });

    let guard = TerminalGuard::acquire().unwrap_or_else(|err| {
        eprintln!("failed to configure terminal: {}", err);
        process::exit(1);
    });

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        let original_termios = guard.original();
        ctrlc::set_handler(move || {
            restore_terminal(&original_termios);
            interrupted.store(true, Ordering::SeqCst);
        })
        .expect("failed to install signal handler");
    }

    let result = lc3vm::run(config, TerminalIo::new(), || interrupted.load(Ordering::SeqCst));

    drop(guard);

    match result {
        Ok(()) if interrupted.load(Ordering::SeqCst) => process::exit(130),
        Ok(()) => {}
        Err(err) => {
            eprintln!("{}", err);
            process::exit(err.exit_code());
        }
    }
}
