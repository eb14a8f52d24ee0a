use std::io::{self, Write};

/// Receives the fraction of work done after each simulation step.
///
/// Values arrive in increasing order in `[0, 1)`. `finish` is only called
/// when the run completes normally.
pub trait ProgressReporter {
    fn update(&mut self, fraction: f64);
    fn finish(&mut self);
}

/// Discards all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl ProgressReporter for Silent {
    fn update(&mut self, _fraction: f64) {}
    fn finish(&mut self) {}
}

/// Text progress bar, redrawn in place with `\r`.
pub struct ProgressBar<W: Write> {
    out: W,
    width: usize,
    step: f64,
    last_printed: f64,
}

impl ProgressBar<io::Stdout> {
    pub fn stdout(width: usize, step: f64) -> Self {
        ProgressBar::new(io::stdout(), width, step)
    }
}

impl<W: Write> ProgressBar<W> {
    pub fn new(out: W, width: usize, step: f64) -> Self {
        ProgressBar { out, width, step, last_printed: 0.0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, progress: f64) {
        let percentage = (100.0 * progress) as usize;
        let filled = ((self.width as f64 * progress) as usize).min(self.width);
        let bar = format!("{}{}", "=".repeat(filled), " ".repeat(self.width - filled));
        let written = write!(self.out, "\rProgress: [{}] {}%", bar, percentage)
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            tracing::debug!("progress output failed: {}", e);
        }
    }
}

impl<W: Write> ProgressReporter for ProgressBar<W> {
    fn update(&mut self, fraction: f64) {
        if fraction - self.last_printed >= self.step {
            self.last_printed = fraction;
            self.print(fraction);
        }
    }

    fn finish(&mut self) {
        self.last_printed = 0.0;
        self.print(1.0);
        if let Err(e) = write!(self.out, "\n\n") {
            tracing::debug!("progress output failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttles_by_step() {
        let mut bar = ProgressBar::new(Vec::new(), 10, 0.25);
        for i in 0..10 {
            bar.update(i as f64 / 10.0);
        }
        let text = String::from_utf8(bar.into_inner()).unwrap();
        // 0.3 and 0.6 and 0.9 cross the 0.25 threshold
        assert_eq!(text.matches('\r').count(), 3);
        assert!(text.contains("[===       ] 30%"));
        assert!(text.contains("[======    ] 60%"));
    }

    #[test]
    fn finish_prints_full_bar_and_blank_line() {
        let mut bar = ProgressBar::new(Vec::new(), 4, 0.5);
        bar.update(0.1);
        bar.finish();
        let text = String::from_utf8(bar.into_inner()).unwrap();
        assert_eq!(text, "\rProgress: [====] 100%\n\n");
    }
}
