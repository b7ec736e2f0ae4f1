//! Property-based tests for packet parsing and line framing.
//!
//! Uses proptest to verify that:
//! 1. Parsing never panics and is deterministic on arbitrary input
//! 2. Built packets survive a display/parse cycle
//! 3. Framed lines do not depend on how the byte stream was chunked

use bytes::BytesMut;
use proptest::prelude::*;
use slirc_client::{LineCodec, Packet};
use tokio_util::codec::Decoder;

// =============================================================================
// STRATEGIES
// =============================================================================

fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

fn command_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[A-Z]{3,8}").expect("valid regex"),
        prop::string::string_regex("[0-9]{3}").expect("valid regex"),
    ]
}

/// Middle parameter: no spaces, does not start with `:`.
fn middle_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&a-zA-Z0-9_\\-*]{1,20}").expect("valid regex")
}

/// Trailing text that doesn't contain CR/LF or the ` :` separator.
fn trailing_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0 :][^\r\n\0:]{0,200}").expect("valid regex")
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 :#!@.\\-]{0,40}").expect("valid regex")
}

/// Drive the codec over `chunks` and collect every complete line.
fn frame(chunks: &[&[u8]]) -> Vec<String> {
    let mut codec = LineCodec::default();
    let mut buf = BytesMut::new();
    let mut lines = Vec::new();
    for chunk in chunks {
        buf.extend_from_slice(chunk);
        while let Some(line) = codec.decode(&mut buf).expect("unbounded codec") {
            lines.push(line);
        }
    }
    lines
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn parse_never_panics(line in any::<String>()) {
        let first = Packet::parse(&line);
        let second = Packet::parse(&line);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn built_packet_reparses(
        nick in nickname_strategy(),
        command in command_strategy(),
        middles in prop::collection::vec(middle_strategy(), 0..4),
        trailing in prop::option::of(trailing_strategy()),
    ) {
        let mut arguments = middles;
        arguments.extend(trailing);
        let packet = Packet::new(command, arguments).with_prefix(format!("{}!u@h", nick));

        let parsed = Packet::parse(&packet.to_string());
        prop_assert_eq!(parsed.sender(), nick.as_str());
        prop_assert_eq!(parsed, packet);
    }

    #[test]
    fn framing_ignores_chunk_boundaries(
        lines in prop::collection::vec(line_strategy(), 1..6),
        split in any::<prop::sample::Index>(),
    ) {
        let wire: String = lines.iter().map(|l| format!("{}\r\n", l)).collect();
        let bytes = wire.as_bytes();
        let at = split.index(bytes.len() + 1);

        prop_assert_eq!(frame(&[&bytes[..at], &bytes[at..]]), lines.clone());

        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        prop_assert_eq!(frame(&singles), lines);
    }
}

#[test]
fn framing_every_split_point() {
    let bytes = b"LINE1\r\nLINE2\r\n";
    for at in 0..=bytes.len() {
        assert_eq!(
            frame(&[&bytes[..at], &bytes[at..]]),
            ["LINE1", "LINE2"],
            "split at {}",
            at
        );
    }
}
