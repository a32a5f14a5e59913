use std::fmt;

/// A document picked for upload, held in memory until it is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

// Keep document bodies out of debug output and test failure messages.
impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The document the next ingest will submit. File and text are mutually
/// exclusive; choosing one discards the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DocumentInput {
    #[default]
    None,
    File(UploadedFile),
    Text(String),
}

impl DocumentInput {
    /// True when there is nothing worth sending: no selection, or pasted
    /// text that is blank after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            DocumentInput::None => true,
            DocumentInput::File(_) => false,
            DocumentInput::Text(text) => text.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputModeState {
    current: DocumentInput,
}

impl InputModeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_file(&mut self, file: UploadedFile) {
        self.current = DocumentInput::File(file);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.current = DocumentInput::Text(text.into());
    }

    pub fn current_mode(&self) -> &DocumentInput {
        &self.current
    }
}
