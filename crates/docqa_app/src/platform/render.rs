use docqa_core::{AppViewModel, InputSummary};

const RULE_WIDTH: usize = 60;

/// Renders the view model as terminal lines. Suppressed sections produce no
/// lines at all.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("-".repeat(RULE_WIDTH));
    lines.push(format!("Document: {}", describe_input(&view.input)));
    if !view.query.is_empty() {
        lines.push(format!("Question: {}", view.query));
    }
    lines.push(format!("[{}]  [{}]", view.process_label, view.ask_label));

    if !view.status_text.is_empty() {
        lines.push(String::new());
        lines.push(format!("  {}", view.status_text));
    }

    if let Some(answer) = &view.answer {
        lines.push(String::new());
        lines.push("Answer".to_string());
        lines.extend(answer.lines().map(|line| format!("  {line}")));
    }

    if !view.sources.is_empty() {
        lines.push(String::new());
        lines.push("Sources:".to_string());
        for source in &view.sources {
            let mut excerpt = source.text.lines();
            let first = excerpt.next().unwrap_or_default();
            lines.push(format!("  [{}] {}", source.ordinal, first));
            let indent = " ".repeat(source.ordinal.to_string().len() + 5);
            lines.extend(excerpt.map(|line| format!("{indent}{line}")));
        }
    }

    lines
}

fn describe_input(input: &InputSummary) -> String {
    match input {
        InputSummary::Nothing => "none selected".to_string(),
        InputSummary::File { filename, bytes } => {
            format!("file {} ({} bytes)", filename, format_with_commas(*bytes as u64))
        }
        InputSummary::Text { blank: true, .. } => "pasted text (blank)".to_string(),
        InputSummary::Text { chars, .. } => {
            format!("pasted text ({} chars)", format_with_commas(*chars as u64))
        }
    }
}

fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use docqa_core::SourceExcerpt;

    use super::*;

    fn idle_view() -> AppViewModel {
        AppViewModel {
            process_label: "Process Document",
            ask_label: "Ask Question",
            ..AppViewModel::default()
        }
    }

    #[test]
    fn idle_view_has_no_status_answer_or_sources() {
        let lines = render(&idle_view());

        assert_eq!(
            lines[1..],
            [
                "Document: none selected".to_string(),
                "[Process Document]  [Ask Question]".to_string(),
            ]
        );
    }

    #[test]
    fn answer_and_sources_render_in_order() {
        let view = AppViewModel {
            status_text: String::new(),
            answer: Some("Paris is the capital.".to_string()),
            sources: vec![
                SourceExcerpt {
                    ordinal: 1,
                    text: "doc1 excerpt".to_string(),
                },
                SourceExcerpt {
                    ordinal: 2,
                    text: "doc2 excerpt\ncontinued".to_string(),
                },
            ],
            query: "Capital?".to_string(),
            ..idle_view()
        };

        let lines = render(&view);
        let tail: Vec<&str> = lines.iter().skip(4).map(String::as_str).collect();

        assert_eq!(
            tail,
            vec![
                "",
                "Answer",
                "  Paris is the capital.",
                "",
                "Sources:",
                "  [1] doc1 excerpt",
                "  [2] doc2 excerpt",
                "      continued",
            ]
        );
    }

    #[test]
    fn status_line_is_shown_when_present() {
        let view = AppViewModel {
            status_text: "Error: index not built".to_string(),
            ..idle_view()
        };
        assert!(render(&view).contains(&"  Error: index not built".to_string()));
    }

    #[test]
    fn input_summary_formats_sizes() {
        assert_eq!(
            describe_input(&InputSummary::File {
                filename: "big.pdf".to_string(),
                bytes: 1_234_567,
            }),
            "file big.pdf (1,234,567 bytes)"
        );
        assert_eq!(
            describe_input(&InputSummary::Text {
                chars: 999,
                blank: false
            }),
            "pasted text (999 chars)"
        );
        assert_eq!(format_with_commas(1000), "1,000");
        assert_eq!(format_with_commas(12), "12");
    }
}
