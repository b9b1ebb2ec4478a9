use std::io::{self, Write};

use colored::Colorize;
use supports_color::Stream;

use crate::diff::{Change, ChangeKind};
use crate::ext::readable_size;

/// Renders changes as tab separated lines: the path, then the tagged amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct Report {
    colorize: bool,
}

impl Report {
    pub fn new(colorize: bool) -> Self {
        Self { colorize }
    }

    /// Colors the output only when stdout supports it.
    pub fn for_stdout() -> Self {
        Self::new(supports_color::on(Stream::Stdout).is_some())
    }

    pub fn render(&self, change: &Change) -> String {
        let amount = match change.kind {
            ChangeKind::New { size } => format!("new +{}", readable_size(size)),
            ChangeKind::Deleted { size } => format!("del -{}", readable_size(size)),
            ChangeKind::Grown { delta } => format!("+{}", readable_size(delta)),
        };
        if !self.colorize {
            return format!("{}\t{amount}", change.path);
        }
        let amount = match change.kind {
            ChangeKind::New { .. } => amount.as_str().green(),
            ChangeKind::Deleted { .. } => amount.as_str().red(),
            ChangeKind::Grown { .. } => amount.as_str().yellow(),
        };
        format!("{}\t{amount}", change.path)
    }

    pub fn write_all(&self, changes: &[Change], mut sink: impl Write) -> io::Result<()> {
        for change in changes {
            writeln!(sink, "{}", self.render(change))?;
        }
        sink.flush()
    }
}
