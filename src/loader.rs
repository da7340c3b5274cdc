use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Read};

use crate::memory::Memory;

/// Reads a big-endian origin followed by big-endian words and stores them
/// contiguously into `memory` starting at that origin. An image whose
/// payload would run past `0xFFFF` is truncated silently; a source that
/// ends mid-word drops the trailing byte; an image with only an origin and
/// no payload leaves memory unchanged. Multiple images can be loaded into
/// the same `Memory` in sequence -- later calls overwrite earlier ones
/// wherever their ranges overlap.
pub fn load_image(memory: &mut Memory, mut source: impl Read) -> io::Result<()> {
    let origin = source.read_u16::<BigEndian>()?;
    let mut address = origin;

    loop {
        match source.read_u16::<BigEndian>() {
            Ok(word) => {
                memory.write(address, word);

                if address == 0xFFFF {
                    break;
                }
                address = address.wrapping_add(1);
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
