pub type SlidecastResult<T> = Result<T, SlidecastError>;

#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InputValidation(String),

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("speech synthesis error: {0}")]
    Synthesis(String),

    #[error("probe error: {0}")]
    Probe(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("concat error: {0}")]
    Concat(String),

    #[error("mux error: {0}")]
    Mux(String),

    #[error("interrupted: {0}")]
    Interrupted(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::InputValidation(msg.into())
    }

    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn concat(msg: impl Into<String>) -> Self {
        Self::Concat(msg.into())
    }

    pub fn mux(msg: impl Into<String>) -> Self {
        Self::Mux(msg.into())
    }

    pub fn interrupted(msg: impl Into<String>) -> Self {
        Self::Interrupted(msg.into())
    }

    /// Process exit status the CLI reports for this error.
    ///
    /// Values follow `sysexits.h` where one fits; an interrupt uses the shell's `128 + SIGINT`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 78,
            Self::InputValidation(_) | Self::EmptyInput(_) => 65,
            Self::Synthesis(_) => 69,
            Self::Probe(_) | Self::Render(_) | Self::Concat(_) | Self::Mux(_) => 70,
            Self::Interrupted(_) => 130,
            Self::Other(_) => 1,
        }
    }
}
