use srecfmt::{
    ConvertError, PacketSize, Summary, convert, header::BANNER, packet::EmitError,
};
use std::io::Cursor;

fn run(input: &str, size: u32) -> (Result<Summary, ConvertError>, String) {
    let mut out = Vec::new();
    let result = convert(
        Cursor::new(input),
        &mut out,
        PacketSize::new(size).unwrap(),
    );

    let text = String::from_utf8(out).unwrap();
    let body = text
        .strip_prefix(BANNER)
        .expect("output starts with the banner")
        .to_owned();

    (result, body)
}

fn hex(bytes: impl IntoIterator<Item = u8>) -> String {
    bytes.into_iter().map(|b| format!("{b:02X}")).collect()
}

fn array(bytes: impl IntoIterator<Item = u8>) -> String {
    bytes.into_iter().map(|b| format!("0x{b:02X},")).collect()
}

#[test]
fn single_packet() {
    let input = "S0030002FA\nS20D001234000102030405060708C1\nS804000000FB\n";
    let (result, body) = run(input, 18);

    assert_eq!(result.unwrap(), Summary {
        switches: 1,
        data: 1,
        end_of_file: 1,
        unsupported: 0,
        packets: 1,
    });

    assert_eq!(
        body,
        "uint32_t const PPP_Y1234_LEN = 15;\n\
         uint8_t const PPP_Y1234[] = {0xC6,0x00,0x03,0x00,0x12,0x34,\
         0x00,0x01,0x02,0x03,0x04,0x05,0x06,0x07,0x08,};\n\n"
    );
}

#[test]
fn split_record() {
    // 30 payload bytes at X:000100
    let input = format!("S0030001FB\nS222000100{}00\nS804000000FB\n", hex(0..30));
    let (result, body) = run(&input, 18);

    assert_eq!(result.unwrap().packets, 3);

    let expected = format!(
        "uint32_t const PPP_X100_LEN = 18;\n\
         uint8_t const PPP_X100[] = {{0xC5,0x00,0x04,0x00,0x01,0x00,{}}};\n\n\
         uint32_t const PPP_X104_LEN = 18;\n\
         uint8_t const PPP_X104[] = {{0xC5,0x00,0x04,0x00,0x01,0x04,{}}};\n\n\
         uint32_t const PPP_X108_LEN = 12;\n\
         uint8_t const PPP_X108[] = {{0xC5,0x00,0x02,0x00,0x01,0x08,{}}};\n\n",
        array(0..12),
        array(12..24),
        array(24..30),
    );

    assert_eq!(body, expected);
}

#[test]
fn records_follow_their_memory_space() {
    let input = "\
        S0030004F8\n\
        S207000010AABBCC00\n\
        S0030001FB\n\
        S207000020DDEEFF00\n\
        S804000000FB\n";
    let (result, body) = run(input, 18);

    assert_eq!(result.unwrap().packets, 2);
    assert_eq!(
        body,
        "uint32_t const PPP_P10_LEN = 9;\n\
         uint8_t const PPP_P10[] = {0xC4,0x00,0x01,0x00,0x00,0x10,0xAA,0xBB,0xCC,};\n\n\
         uint32_t const PPP_X20_LEN = 9;\n\
         uint8_t const PPP_X20[] = {0xC5,0x00,0x01,0x00,0x00,0x20,0xDD,0xEE,0xFF,};\n\n"
    );
}

#[test]
fn data_before_memory_space() {
    let input = "S20D001234000102030405060708C1\n";
    let (result, body) = run(input, 18);

    assert!(matches!(
        result,
        Err(ConvertError::Emit {
            source: EmitError::UnknownMemorySpace { address: 0x1234 }
        })
    ));
    assert!(body.is_empty());
}

#[test]
fn memory_space_is_forgotten_after_end_of_file() {
    let input = "S0030002FA\nS207000010AABBCC00\nS804000000FB\nS207000020DDEEFF00\n";
    let (result, body) = run(input, 18);

    assert!(matches!(
        result,
        Err(ConvertError::Emit {
            source: EmitError::UnknownMemorySpace { address: 0x20 }
        })
    ));

    // the packet before the failure stays written
    assert!(body.starts_with("uint32_t const PPP_Y10_LEN = 9;\n"));
    assert!(!body.contains("PPP_Y20"));
}

#[test]
fn memory_space_is_forgotten_after_unsupported_record() {
    let input = "S0030002FA\nS1130000000102030405060708090A0B0C0D0E0FE4\nS207000020DDEEFF00\n";
    let (result, _) = run(input, 18);

    assert!(matches!(
        result,
        Err(ConvertError::Emit {
            source: EmitError::UnknownMemorySpace { .. }
        })
    ));
}

#[test]
fn invalid_memory_space_code() {
    let input = "S0030000FC\nS207000020DDEEFF00\n";
    let (result, _) = run(input, 18);

    assert!(matches!(
        result,
        Err(ConvertError::Emit {
            source: EmitError::UnknownMemorySpace { .. }
        })
    ));
}

#[test]
fn records_on_a_single_line() {
    let input = "S0030002FA S207000010AABBCC00 S804000000FB";
    let (result, body) = run(input, 18);

    assert_eq!(result.unwrap().packets, 1);
    assert!(body.contains("PPP_Y10[]"));
}

#[test]
fn truncated_record_is_emitted_short() {
    // declares 9 payload bytes but carries 3 and a checksum
    let input = "S0030002FA\nS20D00123400010203\n";
    let (result, body) = run(input, 18);

    assert_eq!(result.unwrap().packets, 1);
    assert_eq!(
        body,
        "uint32_t const PPP_Y1234_LEN = 9;\n\
         uint8_t const PPP_Y1234[] = {0xC6,0x00,0x01,0x00,0x12,0x34,0x00,0x01,0x02,};\n\n"
    );
}

#[test]
fn short_record_checksum_is_not_written() {
    // declares 17 payload bytes, carries 10 and the A1 checksum
    let input = "S0030002FA\nS21500123400010203040506070809A1\nS804000000FB";
    let (result, body) = run(input, 18);

    assert_eq!(result.unwrap().packets, 1);
    assert_eq!(
        body,
        "uint32_t const PPP_Y1234_LEN = 16;\n\
         uint8_t const PPP_Y1234[] = {0xC6,0x00,0x03,0x00,0x12,0x34,\
         0x00,0x01,0x02,0x03,0x04,0x05,0x06,0x07,0x08,0x09,};\n\n"
    );
}

#[test]
fn address_zero_has_empty_suffix() {
    let input = "S0030004F8\nS207000000AABBCC00\n";
    let (_, body) = run(input, 18);

    assert!(body.starts_with("uint32_t const PPP_P_LEN = 9;\nuint8_t const PPP_P[] = {"));
}

#[test]
fn empty_input_is_only_the_banner() {
    let (result, body) = run("", 18);

    assert_eq!(result.unwrap(), Summary::default());
    assert!(body.is_empty());
}

#[test]
fn long_record_with_small_packets() {
    // 24 payload bytes at Y:00ABC0 split into 8 packets of a single word
    let input = format!("S0030002FA\nS21C00ABC0{}00\n", hex(0..24));
    let (result, body) = run(&input, 9);

    assert_eq!(result.unwrap().packets, 8);

    let names: Vec<_> = body
        .lines()
        .filter_map(|line| line.strip_prefix("uint32_t const "))
        .collect();

    assert_eq!(names, [
        "PPP_YABC0_LEN = 9;",
        "PPP_YABC1_LEN = 9;",
        "PPP_YABC2_LEN = 9;",
        "PPP_YABC3_LEN = 9;",
        "PPP_YABC4_LEN = 9;",
        "PPP_YABC5_LEN = 9;",
        "PPP_YABC6_LEN = 9;",
        "PPP_YABC7_LEN = 9;",
    ]);
}
