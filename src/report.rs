//! Error-reporting sink
//!
//! With a console attached, diagnostics go straight to stderr. A detached
//! (GUI-subsystem) process has nowhere to write, so everything is buffered
//! and shown once at exit as a modal message box titled with the program name.
//!
//! The sink doubles as the tracing writer so log output follows the same route.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

use crate::config;

#[derive(Debug, Clone)]
pub enum ReportSink {
    Console,
    Buffered(Arc<Mutex<String>>),
}

fn lock(buffer: &Mutex<String>) -> MutexGuard<'_, String> {
    buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ReportSink {
    /// Console when stderr is available, otherwise a buffer for the exit dialog
    pub fn detect() -> Self {
        if console_attached() {
            Self::Console
        } else {
            Self::buffered()
        }
    }

    pub fn buffered() -> Self {
        Self::Buffered(Arc::new(Mutex::new(String::new())))
    }

    pub fn is_buffered(&self) -> bool {
        matches!(self, Self::Buffered(_))
    }

    /// Deliver one message, newline-terminated
    pub fn report(&self, message: &str) {
        let message = message.trim_end();
        match self {
            Self::Console => eprintln!("{}", message),
            Self::Buffered(buffer) => {
                let mut text = lock(buffer);
                text.push_str(message);
                text.push('\n');
            }
        }
    }

    /// Deliver clap's output for a parse that did not produce arguments.
    ///
    /// On a console, help and version (exit code 0) go to stdout and usage
    /// errors to stderr, as clap prints them. Buffered sinks keep the plain text.
    pub fn usage(&self, err: &clap::Error) {
        match self {
            Self::Console => {
                if err.print().is_err() {
                    eprintln!("{}", err.render());
                }
            }
            Self::Buffered(_) => self.report(&err.render().to_string()),
        }
    }

    /// Everything buffered so far; `None` for the console sink
    pub fn contents(&self) -> Option<String> {
        match self {
            Self::Console => None,
            Self::Buffered(buffer) => Some(lock(buffer).clone()),
        }
    }

    /// Show buffered text, if any, as a single dialog
    pub fn finish(&self, title: &str) {
        let Some(text) = self.contents() else {
            return;
        };
        let text = text.trim_end();
        if !text.is_empty() {
            show_dialog(title, text);
        }
    }
}

/// Writer handed out to the tracing fmt layer
pub enum SinkWriter {
    Stderr(io::Stderr),
    Buffer(Arc<Mutex<String>>),
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stderr(stderr) => stderr.write(buf),
            Self::Buffer(buffer) => {
                lock(buffer).push_str(&String::from_utf8_lossy(buf));
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stderr(stderr) => stderr.flush(),
            Self::Buffer(_) => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for ReportSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            Self::Console => SinkWriter::Stderr(io::stderr()),
            Self::Buffered(buffer) => SinkWriter::Buffer(Arc::clone(buffer)),
        }
    }
}

/// Name the program was invoked as (argv[0])
pub fn program_title() -> String {
    std::env::args()
        .next()
        .filter(|arg| !arg.is_empty())
        .unwrap_or_else(|| config::app::NAME.to_string())
}

#[cfg(windows)]
fn console_attached() -> bool {
    use windows::Win32::System::Console::{GetStdHandle, STD_ERROR_HANDLE};

    unsafe { GetStdHandle(STD_ERROR_HANDLE) }
        .map(|handle| !handle.is_invalid())
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn console_attached() -> bool {
    true
}

#[cfg(windows)]
fn show_dialog(title: &str, text: &str) {
    use windows::core::PCWSTR;
    use windows::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_OK};

    let text: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
    let title: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();

    unsafe {
        let _ = MessageBoxW(None, PCWSTR(text.as_ptr()), PCWSTR(title.as_ptr()), MB_OK);
    }
}

#[cfg(not(windows))]
fn show_dialog(title: &str, text: &str) {
    eprintln!("{}: {}", title, text);
}
