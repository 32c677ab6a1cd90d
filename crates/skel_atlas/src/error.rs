/// Everything that can stop an atlas parse.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AtlasError {
    /// A `key: value` line without the colon.
    #[error("Invalid line: {line}")]
    InvalidLine { line: String },

    #[error("Unexpected end of atlas text")]
    UnexpectedEndOfInput,

    #[error("Invalid {field} value '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Unknown texture filter '{name}'")]
    UnknownFilter { name: String },

    /// Usage error, raised before any line is read.
    #[error("texture loader cannot be missing")]
    MissingTextureLoader,

    /// The loader resolved a page without an image.
    #[error("Failed to load texture for atlas page '{page}'")]
    PageLoadFailed { page: String },

    #[error("No atlas page is waiting for a texture")]
    NoPendingPage,

    /// The parser already stopped on an earlier error.
    #[error("Atlas parse was aborted")]
    Aborted,
}

impl AtlasError {
    /// True for errors caused by the atlas text itself.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidLine { .. }
                | Self::UnexpectedEndOfInput
                | Self::InvalidNumber { .. }
                | Self::UnknownFilter { .. }
        )
    }
}
