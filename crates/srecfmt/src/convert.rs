//! The conversion of an S-record file into a C header.

use crate::{
    header,
    packet::{self, EmitError, PacketSize},
    record::{ReadError, Record, RecordReader},
    space::MemorySpaceTracker,
};
use easyerr::{Error, ResultExt};
use std::io::{BufRead, Write};

/// Statistics of a finished conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// `S0` records.
    pub switches: usize,
    /// `S2` records.
    pub data: usize,
    /// `S8` records.
    pub end_of_file: usize,
    /// Records of any other type.
    pub unsupported: usize,
    /// Packets written.
    pub packets: usize,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Write { source: std::io::Error },
    #[error(transparent)]
    Read { source: ReadError },
    #[error(transparent)]
    Emit { source: EmitError },
}

/// Converts the S-records of `input` into C arrays written to `output`.
///
/// Conversion stops at the first error. Whatever was written to `output` up to that point is
/// left as is.
pub fn convert(
    input: impl BufRead,
    mut output: impl Write,
    size: PacketSize,
) -> Result<Summary, ConvertError> {
    header::write_header(&mut output).context(ConvertCtx::Write)?;

    let mut tracker = MemorySpaceTracker::new();
    let mut summary = Summary::default();
    for record in RecordReader::new(input) {
        match record.context(ConvertCtx::Read)? {
            Record::MemorySpaceSwitch { space } => {
                tracing::debug!("switching to memory space {space:?}");
                tracker.on_switch(space);
                summary.switches += 1;
            }
            Record::Data(data) => {
                tracing::trace!(
                    address = data.address(),
                    len = data.payload_len(),
                    "data record"
                );

                summary.packets += packet::emit(&data, tracker.current(), size, &mut output)
                    .context(ConvertCtx::Emit)?;
                summary.data += 1;
            }
            Record::EndOfFile => {
                tracing::debug!("end of file");
                tracker.on_reset();
                summary.end_of_file += 1;
            }
            Record::Unsupported => {
                tracing::debug!("skipping unsupported record");
                tracker.on_reset();
                summary.unsupported += 1;
            }
        }
    }

    output.flush().context(ConvertCtx::Write)?;
    Ok(summary)
}
