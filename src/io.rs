//! The host-facing capability set the core needs and nothing more: is a
//! keystroke pending, read one byte, write some bytes, flush. Everything
//! about the terminal (raw mode, echo, signal-driven restoration) lives
//! behind this boundary so the rest of the crate never touches `termios` or
//! `nix` directly.

use std::io::{self, Read, Write};
use std::os::unix::io::RawFd;

use nix::sys::select::{select, FdSet};
use nix::sys::time::{TimeVal, TimeValLike};

pub trait Io {
    /// Must return promptly whether or not a keystroke is waiting.
    fn key_ready(&mut self) -> bool;
    /// Blocks until a byte is available.
    fn read_byte(&mut self) -> io::Result<u8>;
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Drives the VM's I/O against the real terminal: polls stdin with a
/// zero-timeout `select`, per the classic LC-3 emulator non-blocking
/// keyboard trick, and writes straight to stdout.
pub struct TerminalIo {
    stdin_fd: RawFd,
}

impl TerminalIo {
    pub fn new() -> TerminalIo {
        TerminalIo { stdin_fd: libc::STDIN_FILENO }
    }
}

impl Default for TerminalIo {
    fn default() -> Self {
        Self::new()
    }
}

impl Io for TerminalIo {
    fn key_ready(&mut self) -> bool {
        let mut readfds = FdSet::new();
        readfds.insert(self.stdin_fd);

        match select(None, &mut readfds, None, None, &mut TimeVal::zero()) {
            Ok(n) => n > 0,
            Err(_) => false,
        }
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut buffer = [0u8; 1];
        io::stdin().read_exact(&mut buffer)?;
        Ok(buffer[0])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        io::stdout().write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Puts stdin into non-canonical, no-echo mode for the lifetime of the
/// guard and restores the original attributes on drop, so every normal exit
/// path (HALT, illegal-opcode abort, propagated error) leaves the terminal
/// as it found it.
pub struct TerminalGuard {
    original: termios::Termios,
}

impl TerminalGuard {
    pub fn acquire() -> io::Result<TerminalGuard> {
        use termios::*;

        let stdin = libc::STDIN_FILENO;
        let original = Termios::from_fd(stdin)?;

        let mut raw = original;
        raw.c_lflag &= !(ICANON | ECHO);
        tcsetattr(stdin, TCSANOW, &raw)?;

        Ok(TerminalGuard { original })
    }

    /// A copy of the attributes this guard will restore, so a signal hook
    /// can restore them too. `Drop` never runs there, since the process
    /// exits before the stack unwinds.
    pub fn original(&self) -> termios::Termios {
        self.original
    }

    fn restore(&self) {
        let _ = termios::tcsetattr(libc::STDIN_FILENO, termios::TCSANOW, &self.original);
    }
}

/// Restores a previously captured terminal snapshot. Standalone so it can
/// be called from a signal handler without borrowing the live `TerminalGuard`.
pub fn restore_terminal(original: &termios::Termios) {
    let _ = termios::tcsetattr(libc::STDIN_FILENO, termios::TCSANOW, original);
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// A scripted `Io`: bytes fed in are returned one at a time by `read_byte`,
/// output is collected into a buffer for assertions. Used by this crate's
/// own tests and the intended harness for anyone embedding the VM without a
/// real terminal.
pub struct RecordingIo {
    input: std::collections::VecDeque<u8>,
    pub output: Vec<u8>,
}

impl RecordingIo {
    pub fn new(input: &[u8]) -> RecordingIo {
        RecordingIo {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Io for RecordingIo {
    fn key_ready(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted input"))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_io_key_ready_reflects_queue() {
        let mut io = RecordingIo::new(&[b'a']);
        assert!(io.key_ready());
        assert_eq!(io.read_byte().unwrap(), b'a');
        assert!(!io.key_ready());
    }

    #[test]
    fn recording_io_collects_output() {
        let mut io = RecordingIo::new(&[]);
        io.write_bytes(b"hi").unwrap();
        assert_eq!(io.output_string(), "hi");
    }
}
