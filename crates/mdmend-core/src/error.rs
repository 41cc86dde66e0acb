use thiserror::Error;

#[derive(Debug, Error)]
pub enum MendError {
    /// A non-markdown fenced block contains an inner fence. Reformatting it
    /// would require guessing which delimiter closes which block, so the
    /// file is rejected instead of risking corrupted code samples.
    #[error("inner fence in non-markdown block (language: {language}, opening fence at line {line})")]
    InnerFence { language: String, line: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MendError>;
