use std::io::{self, Write};

use eds_portal_core::{Notifier, Severity};

/// Prints notices to stderr, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        let mut stderr = io::stderr().lock();
        // Nothing useful to do if stderr is gone
        let _ = writeln!(stderr, "{}: {}", severity, message);
    }
}
