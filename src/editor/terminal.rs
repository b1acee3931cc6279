use std::io::{Read, Write};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio::sync::mpsc;
use tokio::task;

use super::session::{run_editor, EditorConfig, ReadOutcome, TermEvent, TerminalDevice};

/// Crossterm-backed terminal device. Raw-mode state is tracked so release is
/// idempotent.
pub struct CrosstermDevice {
    raw: bool,
}

impl CrosstermDevice {
    pub fn new() -> Self {
        Self { raw: false }
    }
}

impl Default for CrosstermDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDevice for CrosstermDevice {
    fn enable_raw(&mut self) -> std::io::Result<()> {
        enable_raw_mode()?;
        self.raw = true;
        Ok(())
    }

    fn disable_raw(&mut self) {
        if self.raw {
            let _ = disable_raw_mode();
            self.raw = false;
        }
    }

    fn cols(&self) -> Option<u16> {
        crossterm::terminal::size().ok().map(|(cols, _)| cols)
    }
}

/// Owns the process-wide stdin reader and resize listener, and runs editing
/// sessions against real stdout.
///
/// Created once per process: the stdin reader task lives for the lifetime of
/// the program and every session drains the same event channel, so input
/// typed between sessions is delivered to the next prompt.
pub struct Terminal {
    events: mpsc::UnboundedReceiver<TermEvent>,
    device: CrosstermDevice,
}

impl Terminal {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        install_panic_hook();
        spawn_stdin_reader(tx.clone());
        spawn_resize_listener(tx);
        Self {
            events: rx,
            device: CrosstermDevice::new(),
        }
    }

    pub async fn read_line(&mut self, config: &EditorConfig) -> ReadOutcome {
        let mut out = std::io::stdout().lock();
        run_editor(config, &mut self.events, &mut out, &mut self.device).await
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

/// Restore the terminal before the default panic output so the message is
/// readable outside raw mode.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x1b[?2004l");
        let _ = stdout.flush();
        original_hook(panic_info);
    }));
}

fn spawn_stdin_reader(tx: mpsc::UnboundedSender<TermEvent>) {
    task::spawn_blocking(move || {
        let mut stdin = std::io::stdin().lock();
        let mut buf = [0u8; 1024];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(TermEvent::Chunk(buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

#[cfg(unix)]
fn spawn_resize_listener(tx: mpsc::UnboundedSender<TermEvent>) {
    use tokio::signal::unix::{signal, SignalKind};
    tokio::spawn(async move {
        let Ok(mut winch) = signal(SignalKind::window_change()) else {
            return;
        };
        while winch.recv().await.is_some() {
            if tx.send(TermEvent::Resize).is_err() {
                break;
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_resize_listener(_tx: mpsc::UnboundedSender<TermEvent>) {}
