//! The banner at the top of every generated header.

use std::io::Write;

/// Banner written before any packet.
pub const BANNER: &str = "\
// $Id$

/**
 * @file <filename>
 *
 * This include file is for Freescale DSP (DSP563xx).  The data is transferred
 * via CHIRP commands when the device is booted into PPP operational mode.
 *
 * @brief This file contains the data to be transferred into a DSP563xx's
 *         RAM and is registered as a SLOT PPP
 *
 * @author <author>
 *
 * @version <version>
 *
 */

// $Log$

#include <stdint.h>

";

pub fn write_header(out: &mut impl Write) -> std::io::Result<()> {
    out.write_all(BANNER.as_bytes())
}
