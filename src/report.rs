use std::{fmt, io::Write};
use tracing::warn;

const RULE_WIDTH: usize = 50;

/// Line-oriented writer for the human-readable report.
///
/// A failed write is logged and otherwise ignored.
pub(crate) struct Console<W> {
    out: W,
}

impl<W: Write> Console<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    pub(crate) fn line(&mut self, args: fmt::Arguments<'_>) {
        let written = self
            .out
            .write_fmt(args)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(error) = written {
            warn!(%error, "failed to write report line");
        }
    }

    pub(crate) fn blank(&mut self) {
        self.line(format_args!(""));
    }

    pub(crate) fn rule(&mut self) {
        self.line(format_args!("{}", "=".repeat(RULE_WIDTH)));
    }

    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}
