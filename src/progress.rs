// MIT License
// Copyright (c) 2024 Graham King

use std::io;
use std::io::Write;

const DEFAULT_WIDTH: usize = 80;

/// Single line "[label      n / total]" indicator, redrawn in place with \r.
pub struct Progress {
    label: String,
    total: usize,
    done: usize,
    width: usize,
}

impl Progress {
    pub fn new(label: &str, total: usize) -> Progress {
        Progress {
            label: label.to_string(),
            total,
            done: 0,
            width: terminal_width().unwrap_or(DEFAULT_WIDTH),
        }
    }

    pub fn tick(&mut self) {
        self.done += 1;
        // Progress is cosmetic, a closed stdout must not fail the operation
        let _ = self.draw();
    }

    pub fn finish(self) {
        if self.total > 0 {
            println!();
        }
    }

    fn draw(&self) -> io::Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "\r{}", self.line())?;
        stdout.flush()
    }

    fn line(&self) -> String {
        let progress = format!("{} / {}", self.done, self.total);
        let used = self.label.chars().count() + progress.len() + 2;
        let spaces = " ".repeat(self.width.saturating_sub(used).max(1));
        format!("[{}{spaces}{progress}]", self.label)
    }
}

#[repr(C)]
struct Winsize {
    ws_row: u16,
    ws_col: u16,
    ws_xpixel: u16,
    ws_ypixel: u16,
}

// None when stdin is not a terminal
fn terminal_width() -> Option<usize> {
    let mut winsize: Winsize = unsafe { std::mem::zeroed() };
    let fd = 0; // standard input
    if unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut winsize) } == -1 || winsize.ws_col == 0 {
        return None;
    }
    Some(winsize.ws_col as usize)
}
