use nom::{
    IResult, Parser,
    bytes::complete::take_till1,
    character::complete::line_ending,
    combinator::recognize,
    multi::many0_count,
    sequence::terminated,
};

fn head_line(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(take_till1(|b| b == b'\r' || b == b'\n'), line_ending).parse(input)
}

/// Recognizes the start-line and field lines up to and including the empty
/// line that closes a message head.
pub fn field_lines(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(terminated(many0_count(head_line), line_ending)).parse(input)
}
