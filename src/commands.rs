//! This module defines the `Command` enum and its associated methods for parsing
//! user commands in the FAT32 shell.
//!
//! The `Command` enum represents the commands the user can type, such as changing the
//! working directory, listing it, printing a file, or handling invalid or unknown input.

/// Represents a user command in the FAT32 shell.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Command to leave the shell.
    Exit,
    /// Change the working directory; `.` and `..` are accepted.
    Cd(String),
    /// List the entries of the working directory.
    Ls,
    /// Print the content of a file of the working directory.
    Cat(String),
    /// Print the whole directory tree.
    Tree,
    /// Print the boot sector and the volume layout.
    Info,
    /// Command for an unknown input, encapsulating the command name.
    Unknown(String),
    /// Command for invalid input, encapsulating an error message.
    Invalid(String),
    /// Command for an empty input.
    Empty,
}

impl Command {
    /// Parses a line of user input into a `Command`.
    ///
    /// # Parameters
    /// - `s`: A string slice representing the user input.
    ///
    /// # Returns
    /// - `Command::Cd` / `Command::Cat` with their single argument.
    /// - `Command::Ls`, `Command::Tree`, `Command::Info`, `Command::Exit` when called
    ///   without argument. `quit` is an alias of `exit`.
    /// - `Command::Invalid` if the count of arguments is wrong.
    /// - `Command::Unknown` if the input does not match any known command.
    /// - `Command::Empty` if the input is empty or contains only whitespace.
    pub fn from_string(s: &str) -> Self {
        let mut parts = s.split_whitespace();
        let name = match parts.next() {
            Some(name) => name,
            None => return Command::Empty,
        };
        let args: Vec<&str> = parts.collect();

        match name {
            "cd" => Self::with_one_arg(name, &args, Command::Cd),
            "cat" => Self::with_one_arg(name, &args, Command::Cat),
            "ls" => Self::without_arg(name, &args, Command::Ls),
            "tree" => Self::without_arg(name, &args, Command::Tree),
            "info" => Self::without_arg(name, &args, Command::Info),
            "exit" | "quit" => Self::without_arg(name, &args, Command::Exit),
            other => Command::Unknown(other.to_string()),
        }
    }

    fn with_one_arg(name: &str, args: &[&str], build: fn(String) -> Command) -> Command {
        match Self::check_arg_count(name, 1, args.len()) {
            Some(invalid) => invalid,
            None => build(args[0].to_string()),
        }
    }

    fn without_arg(name: &str, args: &[&str], cmd: Command) -> Command {
        Self::check_arg_count(name, 0, args.len()).unwrap_or(cmd)
    }

    fn check_arg_count(name: &str, required: usize, actual: usize) -> Option<Command> {
        if actual < required {
            Some(Command::Invalid(format!("{name}: Not enough arguments")))
        } else if actual > required {
            Some(Command::Invalid(format!("{name}: Too many arguments")))
        } else {
            None
        }
    }
}
