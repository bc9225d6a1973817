//! Parsing of Freescale DSP563xx S-records and their conversion into C arrays of PPP packets,
//! ready to be embedded into a host MCU firmware that has no filesystem.
//!
//! The S-records are expected to be generated with `srec -S -R -A3`:
//! - `-S` makes `S0` records indicate the DSP memory space
//! - `-R` reverses the byte order of words from low -> high to high -> low
//! - `-A3` makes data records use 24-bit addresses (`S2`)

pub mod convert;
pub mod header;
pub mod hex;
pub mod packet;
pub mod record;
pub mod space;

#[cfg(test)]
mod testing;

pub use convert::{ConvertError, Summary, convert};
pub use packet::{PacketSize, PacketSizeError};
pub use record::{DataRecord, Record, RecordReader};
pub use space::{MemorySpace, MemorySpaceTracker};
