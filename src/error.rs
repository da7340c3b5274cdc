use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("usage: lc3vm <IMAGE>...")]
    Usage,

    #[error("failed to load image: {path}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("illegal instruction {opcode:#06x} at {pc:#06x}")]
    IllegalInstruction { opcode: u16, pc: u16 },
}

impl Error {
    /// The process exit code this error maps to. Usage errors and image
    /// load failures get distinct codes so a caller can tell them apart
    /// without parsing the message.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage => 2,
            Error::ImageLoad { .. } => 1,
            Error::IllegalInstruction { .. } => 4,
        }
    }
}
