//! Cooperative shutdown between the console, Ctrl+C and the grab loops.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Set once by whoever wants the tool to stop; polled by the main loop.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal(Arc<AtomicBool>);

impl ExitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Request exit on Ctrl+C.
pub fn install_ctrlc_handler(signal: ExitSignal) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        signal.request();
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })
}

fn is_quit_command(line: &str) -> bool {
    matches!(line.trim_end_matches('\r'), "q" | "Q")
}

/// Read lines until one is exactly `q` or `Q`, then request exit.
///
/// Returns `true` if a quit command was read. End of input or a read error
/// stops listening without requesting exit, and so does an exit requested
/// elsewhere once the next line arrives.
pub fn listen_for_quit<R: BufRead>(reader: R, signal: &ExitSignal) -> bool {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Stopped reading console input: {}", e);
                return false;
            }
        };
        if is_quit_command(&line) {
            signal.request();
            return true;
        }
        if signal.is_requested() {
            return false;
        }
    }
    log::debug!("Console input closed");
    false
}

/// Background thread running [`listen_for_quit`] on a reader.
pub struct QuitListener {
    handle: JoinHandle<bool>,
}

impl QuitListener {
    pub fn spawn<R: BufRead + Send + 'static>(reader: R, signal: ExitSignal) -> Self {
        let handle = thread::spawn(move || listen_for_quit(reader, &signal));
        Self { handle }
    }

    /// Listen on standard input.
    pub fn stdin(signal: ExitSignal) -> Self {
        let handle = thread::spawn(move || listen_for_quit(std::io::stdin().lock(), &signal));
        Self { handle }
    }

    /// Join the listener if it has finished.
    ///
    /// A listener still blocked on console input (exit came from Ctrl+C) is
    /// left behind; process exit reclaims it.
    pub fn finish(self) {
        if self.handle.is_finished() {
            if self.handle.join().is_err() {
                log::warn!("Console listener panicked");
            }
        } else {
            log::debug!("Console listener still waiting for input, detaching");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_signal_shared_between_clones() {
        let signal = ExitSignal::new();
        let other = signal.clone();
        assert!(!other.is_requested());
        signal.request();
        assert!(other.is_requested());
    }

    #[test]
    fn test_quit_on_lowercase_and_uppercase() {
        for input in ["q\n", "Q\n", "q\r\n"] {
            let signal = ExitSignal::new();
            assert!(listen_for_quit(Cursor::new(input), &signal));
            assert!(signal.is_requested());
        }
    }

    #[test]
    fn test_ignores_other_lines() {
        let signal = ExitSignal::new();
        let input = "hello\nquit\n qq\n\nq\nnever read\n";
        assert!(listen_for_quit(Cursor::new(input), &signal));
        assert!(signal.is_requested());
    }

    #[test]
    fn test_end_of_input_does_not_request_exit() {
        let signal = ExitSignal::new();
        assert!(!listen_for_quit(Cursor::new("x\ny\n"), &signal));
        assert!(!signal.is_requested());
    }

    #[test]
    fn test_spawned_listener_joins() {
        let signal = ExitSignal::new();
        let listener = QuitListener::spawn(Cursor::new("Q\n"), signal.clone());
        while !signal.is_requested() {
            thread::yield_now();
        }
        // Give the thread a moment to return after setting the flag
        for _ in 0..1000 {
            if listener.handle.is_finished() {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(1));
        }
        assert!(listener.handle.is_finished());
        listener.finish();
    }
}
