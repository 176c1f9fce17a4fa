use std::fs;
use std::io::{self, Read};
use std::path::Path;

use agrichat_agent::ResponseNormalizer;

use super::CommandResult;

pub fn run(file: Option<&Path>) -> CommandResult {
    let raw = match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|error| format!("could not read `{}`: {error}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map(|_| buffer)
                .map_err(|error| format!("could not read stdin: {error}"))
        }
    };

    match raw {
        Ok(raw) => CommandResult::text(ResponseNormalizer::new().normalize(&raw)),
        Err(message) => CommandResult::failure("normalize", "input", message, 2),
    }
}
