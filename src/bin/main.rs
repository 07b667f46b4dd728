//! This is the main entry point of the FAT32 explorer.
//!
//! The program decodes a FAT32 disk image, then provides an interactive shell to walk its
//! directory tree and print files. With `--tree`, it prints the whole tree and exits.

use fat_explorer::commands::Command;
use fat_explorer::shell::Shell;
use fat_explorer::traits::TreeDisplay;
use fat_explorer::{DecodeOptions, decode_with};
use log::error;
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;

const USAGE: &str = "Usage: main <image> [--validate] [--compat] [--strict-checksum] [--tree] [-v...] [-q]";

/// Settings collected from the command line.
struct Config {
    /// The disk image to decode.
    image: PathBuf,
    /// Decoding knobs.
    options: DecodeOptions,
    /// Print the tree and exit instead of starting the shell.
    tree_only: bool,
    /// Log verbosity, 0 for errors only.
    verbosity: usize,
    /// Disable logging.
    quiet: bool,
}

impl Config {
    fn from_args<I: Iterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut image = None;
        let mut options = DecodeOptions::default();
        let mut tree_only = false;
        let mut verbosity = 1;
        let mut quiet = false;

        for arg in args {
            match arg.as_str() {
                "--validate" => options.validate_bpb = true,
                "--compat" => {
                    options.mask_fat_entries = false;
                    options.high_cluster_word = false;
                }
                "--strict-checksum" => options.strict_lfn_checksum = true,
                "--tree" => tree_only = true,
                "-q" => quiet = true,
                flag if flag.starts_with("-v") && flag[1..].chars().all(|c| c == 'v') => {
                    verbosity += flag.len() - 1
                }
                flag if flag.starts_with('-') => return Err(format!("Unknown option: {flag}")),
                path => {
                    if image.replace(PathBuf::from(path)).is_some() {
                        return Err(String::from("Only one disk image can be opened."));
                    }
                }
            }
        }

        Ok(Config {
            image: image.ok_or_else(|| String::from("Missing arg: the path to a disk image."))?,
            options,
            tree_only,
            verbosity,
            quiet,
        })
    }
}

fn main() {
    let config = Config::from_args(env::args().skip(1)).unwrap_or_else(|msg| {
        eprintln!("{msg}\n{USAGE}");
        process::exit(2);
    });

    stderrlog::new()
        .module(module_path!())
        .module("fat_explorer")
        .verbosity(config.verbosity)
        .quiet(config.quiet)
        .init()
        .unwrap();

    let file = File::open(&config.image).unwrap_or_else(|err| {
        error!("Can't open {}: {err}", config.image.display());
        process::exit(1);
    });

    let (volume, tree) = decode_with(BufReader::new(file), config.options).unwrap_or_else(|err| {
        error!("Decoding failed: {err}");
        process::exit(1);
    });

    if config.tree_only {
        match tree.display_tree() {
            Ok(out) => print!("{out}"),
            Err(err) => error!("Tree printing failed: {err}"),
        }
        return;
    }

    let mut shell = Shell::new(volume, tree);
    let mut stdout = io::stdout();

    loop {
        print!("{}", shell.prompt());
        io::stdout().flush().unwrap();

        let mut s = String::new();
        match io::stdin().read_line(&mut s) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                error!("Failed to read command: {err}");
                break;
            }
        }

        match shell.execute(Command::from_string(&s), &mut stdout) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                error!("Output error: {err}");
                break;
            }
        }
    }
}
