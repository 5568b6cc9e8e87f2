//! Splits a raw command line into the command token and the warp name.
//!
//! Positions are raw byte offsets of `' '`. Nothing is trimmed, lowercased or
//! collapsed, so `"/setwarp  home"` yields an empty warp name.

/// A command line split into its parts. Borrows from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub command: &'a str,
    pub warp_name: Option<&'a str>,
}

impl<'a> ParsedCommand<'a> {
    pub fn parse(buffer: &'a str) -> ParsedCommand<'a> {
        ParsedCommand {
            command: extract_command(buffer),
            warp_name: extract_warp_name(buffer),
        }
    }
}

/// Everything before the first space, or the whole buffer if there is none.
pub fn extract_command(buffer: &str) -> &str {
    match buffer.find(' ') {
        Some(space) => &buffer[..space],
        None => buffer,
    }
}

/// The warp name argument of a command line.
///
/// With a single argument this is everything after the space. With two or
/// more arguments the first and the last one are dropped and everything
/// between the first and the last space is returned.
pub fn extract_warp_name(buffer: &str) -> Option<&str> {
    let first = buffer.find(' ')?;
    let last = buffer.rfind(' ').unwrap_or(first);
    if first == last {
        Some(&buffer[first + 1..])
    } else {
        Some(&buffer[first + 1..last])
    }
}
