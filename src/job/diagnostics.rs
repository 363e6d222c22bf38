//! Render job errors as annotated source snippets

use super::JobError;
use ariadne::{Color, Config, Label, Report, ReportKind, Source};

/// Render `error` against `source`. `color` should be false when the output
/// is not a terminal.
pub fn render(name: &str, source: &str, error: &JobError, color: bool) -> String {
    let end = source.trim_end().len();
    let span = error.span().unwrap_or(end..end);
    let label = match error {
        JobError::Missing { key } => format!("add a '{}' line", key),
        JobError::Duplicate { .. } => "set again here".to_string(),
        _ => error.to_string(),
    };

    let mut out = Vec::new();
    let written = Report::build(ReportKind::Error, (), span.start)
        .with_config(Config::default().with_color(color))
        .with_message(format!("{}: {}", name, error))
        .with_label(
            Label::new(span)
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write(Source::from(source), &mut out);

    match written {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => format!("{}: {}", name, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::parse_job;

    #[test]
    fn test_render_points_at_value() {
        let source = "tool em-6-3fl\ndoc -2\n";
        let err = parse_job(source).unwrap_err();
        let text = render("job.txt", source, &err, false);
        assert!(text.contains("job.txt"));
        assert!(text.contains("doc must be positive"));
        assert!(text.contains("doc -2"));
    }

    #[test]
    fn test_render_missing_key() {
        let source = "tool em-6-3fl\n";
        let err = parse_job(source).unwrap_err();
        let text = render("job.txt", source, &err, false);
        assert!(text.contains("missing required setting"));
    }
}
