// src/render.rs

/// Turns a LaTeX command into a preview image.
///
/// Optional and injected from outside; ranking never depends on it.
pub trait CommandRenderer: Send + Sync {
    /// Encoded image bytes, or `None` when the command cannot be rendered.
    fn render(&self, command: &str) -> Option<Vec<u8>>;
}

impl<F> CommandRenderer for F
where
    F: Fn(&str) -> Option<Vec<u8>> + Send + Sync,
{
    fn render(&self, command: &str) -> Option<Vec<u8>> {
        self(command)
    }
}
