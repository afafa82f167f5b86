//! Output routing: system clipboard or standard output

use crate::error::{Error, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Clipboard commands tried in order
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Clipboard,
    Stdout,
}

#[derive(Debug, Clone, Copy)]
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_stdout(&self) -> bool {
        self.mode == OutputMode::Stdout
    }

    /// Print or copy `text`
    pub fn emit(&self, text: &str) -> Result<()> {
        match self.mode {
            OutputMode::Stdout => {
                println!("{}", text);
                Ok(())
            }
            OutputMode::Clipboard => copy_to_clipboard(text),
        }
    }
}

/// Pipe `text` into the first clipboard command that can be started
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    for (program, args) in CLIPBOARD_COMMANDS {
        let mut child = match Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(_) => continue,
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| Error::Clipboard(format!("{}: {}", program, e)))?;
        }
        let status = child
            .wait()
            .map_err(|e| Error::Clipboard(format!("{}: {}", program, e)))?;
        if status.success() {
            log::debug!("Copied {} bytes with {}", text.len(), program);
            return Ok(());
        }
        log::debug!("{} exited with {}", program, status);
    }

    Err(Error::Clipboard(
        "no working clipboard command found (use --stdout)".into(),
    ))
}
