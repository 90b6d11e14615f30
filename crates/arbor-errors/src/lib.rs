use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

mod emit;
mod location;
mod report;

pub use emit::{Emitter, StderrEmitter, WriteEmitter};
pub use location::Location;
pub use report::{eprint_error, report_error};

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    message: String,
    location: Option<Location>,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn error(message: impl Into<String>, location: Option<Location>) -> Self {
        Self { message: message.into(), location }
    }

    /// Writes the diagnostic in the caret format of [`report_error`].
    pub fn report(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        report_error(out, &self.message, self.location.as_ref())
    }

    /// Renders the diagnostic against `text`, the contents of the located
    /// file.
    ///
    /// Without a location, or with one that falls outside `text`, only the
    /// title is rendered.
    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let mut snippet = Snippet::source(text).origin(path).fold(true);
        if let Some(range) = self.location.as_ref().and_then(|location| location.text_range(text)) {
            snippet = snippet.annotation(Level::Error.span(range.into()).label("here"));
        }
        let message = Level::Error.title(&self.message).snippet(snippet);
        renderer.render(message)
    }
}
