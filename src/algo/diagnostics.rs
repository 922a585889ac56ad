//! Diagnostic message collection for the repair pipeline.
//!
//! Algorithms never print or log on their own behalf beyond the `log`
//! facade; anything a caller may want to show (holes skipped, fallback
//! fans, timings) is handed to a [`Diagnostics`] collector passed in by the
//! caller.
//!
//! # Example
//!
//! ```
//! use caulk::algo::diagnostics::{Diagnostics, FnDiagnostics};
//!
//! let mut lines = Vec::new();
//! {
//!     let mut sink = FnDiagnostics::new(|msg: &str| lines.push(msg.len()));
//!     sink.add("hole 0 closed");
//! }
//! assert_eq!(lines, vec![13]);
//! ```

/// Receiver of human-readable diagnostic messages.
pub trait Diagnostics {
    /// Record one message.
    fn add(&mut self, message: &str);
}

/// Collect messages in memory.
impl Diagnostics for Vec<String> {
    fn add(&mut self, message: &str) {
        self.push(message.to_owned());
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn add(&mut self, message: &str) {
        (**self).add(message);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for Box<D> {
    fn add(&mut self, message: &str) {
        (**self).add(message);
    }
}

/// Forward every message to `log::info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn add(&mut self, message: &str) {
        log::info!("{}", message);
    }
}

/// Discard all messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    fn add(&mut self, _message: &str) {}
}

/// Adapter that hands every message to a closure.
pub struct FnDiagnostics<F> {
    callback: F,
}

impl<F: FnMut(&str)> FnDiagnostics<F> {
    /// Wrap a callback.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut(&str)> Diagnostics for FnDiagnostics<F> {
    #[inline]
    fn add(&mut self, message: &str) {
        (self.callback)(message);
    }
}

impl<F> std::fmt::Debug for FnDiagnostics<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnDiagnostics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(sink: &mut dyn Diagnostics) {
        sink.add("first");
        sink.add("second");
    }

    #[test]
    fn test_vec_collects_in_order() {
        let mut messages: Vec<String> = Vec::new();
        report(&mut messages);
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_boxed_and_borrowed_forward() {
        let mut boxed: Box<dyn Diagnostics> = Box::new(Vec::<String>::new());
        report(&mut boxed);

        let mut count = 0;
        let mut counter = FnDiagnostics::new(|_: &str| count += 1);
        report(&mut &mut counter);
        drop(counter);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_silent_sinks_accept_messages() {
        report(&mut NoDiagnostics);
        report(&mut LogDiagnostics);
    }
}
