use std::io::Write;

use crate::Diagnostic;

/// Sink for diagnostics raised while walking a tree.
pub trait Emitter {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl Emitter for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<E: Emitter + ?Sized> Emitter for &mut E {
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}

/// Reports every diagnostic to standard error as it arrives.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrEmitter;

impl Emitter for StderrEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        if let Err(err) = crate::eprint_error(diagnostic.message(), diagnostic.location()) {
            tracing::warn!(%err, "failed to write diagnostic");
        }
    }
}

/// Reports every diagnostic to a writer, counting how many were written.
#[derive(Debug)]
pub struct WriteEmitter<W> {
    out: W,
    count: usize,
}

impl<W: Write> WriteEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out, count: 0 }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Emitter for WriteEmitter<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        if let Err(err) = diagnostic.report(&mut self.out) {
            tracing::warn!(%err, "failed to write diagnostic");
        }
    }
}
