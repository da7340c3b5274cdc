use std::path::PathBuf;

use clap::{App, Arg};

use crate::error::Error;

#[derive(Debug, PartialEq)]
pub struct Config {
    pub images: Vec<PathBuf>,
}

impl Config {
    /// Parses `lc3vm <IMAGE>...` from the process's own arguments.
    pub fn from_args() -> Result<Self, Error> {
        let matches = App::new("lc3vm")
            .about("A virtual machine for the LC-3 instruction set architecture")
            .arg(
                Arg::with_name("IMAGE")
                    .help("Memory image to load, in argument order")
                    .required(true)
                    .multiple(true)
                    .index(1),
            )
            .get_matches_safe()
            .map_err(|_| Error::Usage)?;

        let images = matches
            .values_of("IMAGE")
            .ok_or(Error::Usage)?
            .map(PathBuf::from)
            .collect::<Vec<_>>();

        Self::with(images)
    }

    pub fn with(images: Vec<PathBuf>) -> Result<Self, Error> {
        if images.is_empty() {
            return Err(Error::Usage);
        }

        Ok(Config { images })
    }
}
