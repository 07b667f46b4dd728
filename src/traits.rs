//! Declaration of traits reused across the code.

use std::fmt;

/// Display the layout of a given structure such as a volume.
pub trait LayoutDisplay {
    fn display_layout(&self, indent: u8) -> Result<String, fmt::Error>;
}

/// Display a directory hierarchy, one entry per line.
pub trait TreeDisplay {
    fn display_tree(&self) -> Result<String, fmt::Error>;
}
