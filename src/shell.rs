//! Interactive navigation over a decoded volume.
//!
//! The working directory is the path of node handles leading from the root to it, so
//! the displayed path is computed from that sequence alone.

use log::error;
use std::io::{self, Read, Seek, Write};

use crate::commands::Command;
use crate::filesystem::fat::FatVolume;
use crate::filesystem::tree::{DirectoryTree, NodeId};
use crate::traits::{LayoutDisplay, TreeDisplay};

/// Shell session over a volume and its directory tree.
pub struct Shell<R> {
    volume: FatVolume<R>,
    tree: DirectoryTree,
    /// Nodes from the first level below the root down to the working directory
    path: Vec<NodeId>,
}

impl<R: Read + Seek> Shell<R> {
    /// Starts a session in the root directory.
    pub fn new(volume: FatVolume<R>, tree: DirectoryTree) -> Self {
        Shell {
            volume,
            tree,
            path: vec![],
        }
    }

    /// Returns the handle of the working directory.
    pub fn cwd(&self) -> NodeId {
        self.path.last().copied().unwrap_or(self.tree.root())
    }

    /// Returns the absolute path of the working directory.
    pub fn working_dir(&self) -> String {
        if self.path.is_empty() {
            return String::from("/");
        }

        self.path
            .iter()
            .filter_map(|&id| self.tree.record(id))
            .map(|record| format!("/{}", record.display_name()))
            .collect()
    }

    /// Returns the prompt displayed before each command.
    pub fn prompt(&self) -> String {
        format!("{} $ ", self.working_dir())
    }

    /// Runs a command, writing its output to `out`.
    ///
    /// # Returns
    /// - `Ok(false)` once the user asked to leave, `Ok(true)` otherwise.
    ///
    /// # Errors
    /// - Only errors writing to `out`; decoding errors are reported as command output.
    pub fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> io::Result<bool> {
        match cmd {
            Command::Exit => return Ok(false),
            Command::Cd(name) => self.change_dir(&name, out)?,
            Command::Ls => self.list_dir(out)?,
            Command::Cat(name) => self.print_file(&name, out)?,
            Command::Tree => match self.tree.display_tree() {
                Ok(tree) => write!(out, "{tree}")?,
                Err(err) => error!("Tree printing failed: {err}"),
            },
            Command::Info => {
                write!(out, "{}", self.volume.bpb())?;
                match self.volume.display_layout(0) {
                    Ok(layout) => write!(out, "{layout}")?,
                    Err(err) => error!("Print layout error: {err}"),
                }
            }
            Command::Unknown(name) => writeln!(out, "command not found: {name}")?,
            Command::Invalid(msg) => writeln!(out, "{msg}")?,
            Command::Empty => {}
        }

        Ok(true)
    }

    fn change_dir<W: Write>(&mut self, to: &str, out: &mut W) -> io::Result<()> {
        match to {
            "." => {}
            ".." => {
                if self.path.pop().is_none() {
                    writeln!(out, "cd: root")?;
                }
            }
            name => match self.tree.find_child(self.cwd(), name) {
                Some(child) if self.tree.node(child).is_directory() => self.path.push(child),
                Some(_) => writeln!(out, "cd: not a directory: {name}")?,
                None => writeln!(out, "cd: no such file or directory: {name}")?,
            },
        }

        Ok(())
    }

    fn list_dir<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for &child in self.tree.children(self.cwd()) {
            if let Some(record) = self.tree.record(child) {
                writeln!(out, "{}", record.display_name())?;
            }
        }

        Ok(())
    }

    fn print_file<W: Write>(&mut self, name: &str, out: &mut W) -> io::Result<()> {
        let record = match self.tree.find_child(self.cwd(), name) {
            Some(child) if self.tree.node(child).is_directory() => {
                return writeln!(out, "cat: {name}: is a directory");
            }
            Some(child) => self.tree.record(child).cloned(),
            None => None,
        };
        let Some(record) = record else {
            return writeln!(out, "cat: {name}: No such file or directory");
        };

        match self.volume.extract(&record) {
            Ok(bytes) => {
                out.write_all(&bytes)?;
                writeln!(out)
            }
            Err(err) => {
                error!("Extraction of {name} failed: {err}");
                writeln!(out, "cat: {name}: {err}")
            }
        }
    }
}
