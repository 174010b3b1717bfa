use std::io::{self, Write};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Stderr area shared by the status line and log output
pub fn console() -> MultiProgress {
    MultiProgress::with_draw_target(ProgressDrawTarget::stderr())
}

/// In-place "Resolved X of Y" line on `console`, or a hidden bar when disabled
pub fn status_line(console: &MultiProgress, total: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template("Resolved {pos} of {len} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_bar());

    let bar = console.add(ProgressBar::new(total));
    bar.set_style(style);
    bar
}

/// Log sink that prints above the status line instead of through it
pub struct LogWriter {
    console: MultiProgress,
}

impl LogWriter {
    pub fn new(console: MultiProgress) -> Self {
        Self { console }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Nothing is drawn when stderr is not a terminal, and println would drop the line
        if self.console.is_hidden() {
            return io::stderr().write(buf);
        }

        let msg = String::from_utf8_lossy(buf);
        self.console.println(msg.trim_end())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
