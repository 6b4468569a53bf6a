//! Progress bars for the fetch stage, and a log writer that keeps them pinned.
//!
//! Log lines and bars share stderr. Every tracing line is routed through the
//! same `MultiProgress` as the bars so a running fetch is never torn up by a
//! warning about a skipped movie.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

const FETCH_TEMPLATE: &str = "{spinner} {msg} [{bar:30}] {pos}/{len} ({elapsed})";

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(|| {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        mp
    })
}

/// Bar counting fetched movie ids
///
/// Hidden when `visible` is false (JSON output, or stderr is not a terminal).
pub fn fetch_progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template(FETCH_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    let bar = multi_progress().add(ProgressBar::new(len));
    bar.set_style(style);
    bar.set_message("Fetching movies");
    bar
}

fn emit_line(line: &str) {
    let line = line.trim_end_matches('\r');
    let _ = multi_progress().println(line);
}

/// `MakeWriter` handing out [`LogWriter`]s for the tracing fmt layer
#[derive(Default, Clone)]
pub struct LogWriterFactory;

/// Buffers partial log output and prints complete lines above the bars
pub struct LogWriter {
    pending: String,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.push_str(&String::from_utf8_lossy(buf));

        while let Some(newline) = self.pending.find('\n') {
            emit_line(&self.pending[..newline]);
            self.pending.drain(..=newline);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            emit_line(&self.pending);
            self.pending.clear();
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            pending: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_still_counts() {
        let bar = fetch_progress_bar(3, false);
        bar.inc(2);
        assert_eq!(bar.position(), 2);
        assert!(bar.is_hidden());
    }

    #[test]
    fn test_log_writer_accepts_partial_lines() {
        let mut writer = LogWriterFactory.make_writer();
        assert_eq!(writer.write(b"partial").unwrap(), 7);
        assert_eq!(writer.pending, "partial");
        writer.write_all(b" line\nnext").unwrap();
        assert_eq!(writer.pending, "next");
        writer.flush().unwrap();
        assert!(writer.pending.is_empty());
    }
}
