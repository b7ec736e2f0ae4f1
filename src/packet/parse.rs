//! Best-effort IRC line tokenizer.
//!
//! ```text
//! [:prefix ]<command>[ <arg>...][ :<trailing>]
//! ```
//!
//! Unlike a strict RFC 1459 parser this never rejects input. Runs of spaces
//! are not collapsed, so `A  b` yields an empty argument between `A` and `b`.

use nom::{
    bytes::complete::{take_till, take_until},
    character::complete::char,
    error::{context, VerboseError},
    sequence::preceded,
    IResult,
};

use super::Packet;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Parse the message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        preceded(char(':'), take_till(|c| c == ' ')),
    )(input)
}

/// Take everything before the first ` :` separator.
fn parse_middle(input: &str) -> ParseResult<&str, &str> {
    context("locating trailing parameter", take_until(" :"))(input)
}

pub(super) fn tokenize(line: &str) -> Packet {
    let (rest, prefix) = match parse_prefix(line) {
        Ok((rest, prefix)) => (rest.strip_prefix(' ').unwrap_or(rest), prefix),
        Err(_) => (line, ""),
    };

    let (middle, trailing) = match parse_middle(rest) {
        Ok((separator, middle)) => (middle, Some(&separator[2..])),
        Err(_) => (rest, None),
    };

    // Empty tokens ahead of the command are skipped; after it they are kept.
    let mut command = "";
    let mut arguments = Vec::new();
    for token in middle.split(' ') {
        if command.is_empty() {
            command = token;
        } else {
            arguments.push(token.to_owned());
        }
    }
    if let Some(trailing) = trailing {
        arguments.push(trailing.to_owned());
    }

    Packet {
        prefix: prefix.to_owned(),
        command: command.to_owned(),
        arguments,
    }
}
