/// Renderable projection of `AppState`. Empty strings and collections mean
/// "do not display".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub status_text: String,
    pub answer: Option<String>,
    pub sources: Vec<SourceExcerpt>,
    pub busy: bool,
    pub input: InputSummary,
    pub query: String,
    pub process_label: &'static str,
    pub ask_label: &'static str,
}

/// One backend-supplied excerpt, numbered from 1 in backend order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceExcerpt {
    pub ordinal: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputSummary {
    #[default]
    Nothing,
    File { filename: String, bytes: usize },
    Text { chars: usize, blank: bool },
}
