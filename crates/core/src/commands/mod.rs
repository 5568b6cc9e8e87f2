mod listener;
pub mod parser;

pub use listener::{CREATE_COMMANDS, DELETE_COMMANDS, WarpCommandListener};
pub use parser::{ParsedCommand, extract_command, extract_warp_name};
