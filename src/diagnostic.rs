use owo_colors::OwoColorize;

/// A byte range in the guest source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

/// A label pointing at a span, rendered as an underline.
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<String>,
    pub message: String,
    /// Fallback location for errors that only know their line.
    pub line: Option<usize>,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            line: None,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

/// Computes 1-based line and column from a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn line_text(source: &str, line_num: usize) -> Option<&str> {
    source.lines().nth(line_num.checked_sub(1)?)
}

/// Renders diagnostics in a rustc-like layout.
pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        self.render_header(&mut output, diagnostic);

        let spanned: Vec<&Label> = diagnostic
            .labels
            .iter()
            .filter(|label| !label.span.is_dummy())
            .collect();

        if let Some(first) = spanned.first() {
            let (line, col) = line_col(self.source, first.span.start);
            output.push_str(&format!("  {} {}:{}:{}\n", self.blue("-->"), self.file_name, line, col));

            let mut lines: Vec<usize> = spanned
                .iter()
                .map(|label| line_col(self.source, label.span.start).0)
                .collect();
            lines.sort_unstable();
            lines.dedup();

            let width = lines.last().copied().unwrap_or(1).to_string().len();
            output.push_str(&format!("{} {}\n", " ".repeat(width + 1), self.blue("|")));
            for line_num in lines {
                self.render_line(&mut output, &spanned, line_num, width);
            }
            output.push_str(&format!("{} {}\n", " ".repeat(width + 1), self.blue("|")));
        } else if let Some(line) = diagnostic.line {
            output.push_str(&format!("  {} {}:{}\n", self.blue("-->"), self.file_name, line));
            if let Some(text) = line_text(self.source, line) {
                let width = line.to_string().len();
                output.push_str(&format!("{} {}\n", " ".repeat(width + 1), self.blue("|")));
                output.push_str(&format!("{} {} {}\n", self.gutter(line, width), self.blue("|"), text));
                output.push_str(&format!("{} {}\n", " ".repeat(width + 1), self.blue("|")));
            }
        }

        for note in &diagnostic.notes {
            output.push_str(&format!("  {} {}\n", self.blue("="), note));
        }

        output
    }

    fn render_header(&self, output: &mut String, diagnostic: &Diagnostic) {
        let severity = if self.use_color {
            "error".red().bold().to_string()
        } else {
            "error".to_string()
        };
        let message = if self.use_color {
            diagnostic.message.bold().to_string()
        } else {
            diagnostic.message.clone()
        };

        match &diagnostic.code {
            Some(code) => output.push_str(&format!("{}[{}]: {}\n", severity, code, message)),
            None => output.push_str(&format!("{}: {}\n", severity, message)),
        }
    }

    fn render_line(&self, output: &mut String, labels: &[&Label], line_num: usize, width: usize) {
        let Some(text) = line_text(self.source, line_num) else {
            return;
        };

        output.push_str(&format!("{} {} {}\n", self.gutter(line_num, width), self.blue("|"), text));

        for label in labels {
            let (start_line, start_col) = line_col(self.source, label.span.start);
            if start_line != line_num {
                continue;
            }
            let (end_line, end_col) = line_col(self.source, label.span.end.max(label.span.start + 1));
            let end_col = if end_line == line_num { end_col } else { text.chars().count() + 1 };
            let carets = "^".repeat(end_col.saturating_sub(start_col).max(1));
            let underline = format!("{}{}", " ".repeat(start_col - 1), carets);
            let message = if label.message.is_empty() {
                String::new()
            } else {
                format!(" {}", label.message)
            };
            output.push_str(&format!(
                "{} {} {}\n",
                " ".repeat(width + 1),
                self.blue("|"),
                self.red(&format!("{}{}", underline, message))
            ));
        }
    }

    /// Line number padded to the gutter width before any styling.
    fn gutter(&self, line: usize, width: usize) -> String {
        self.blue(&format!("{:>w$}", line, w = width + 1))
    }

    fn red(&self, s: &str) -> String {
        if self.use_color {
            s.red().to_string()
        } else {
            s.to_string()
        }
    }

    fn blue(&self, s: &str) -> String {
        if self.use_color {
            s.blue().to_string()
        } else {
            s.to_string()
        }
    }
}

/// Render every diagnostic followed by an abort summary.
pub fn render_diagnostics(source: &str, file_name: &str, diagnostics: &[Diagnostic], use_color: bool) -> String {
    let renderer = DiagnosticRenderer::new(source, file_name, use_color);
    let mut output = String::new();

    for diagnostic in diagnostics {
        output.push_str(&renderer.render(diagnostic));
        output.push('\n');
    }

    let count = diagnostics.len();
    if count > 0 {
        output.push_str(&format!(
            "error: aborting due to {} error{}\n",
            count,
            if count == 1 { "" } else { "s" }
        ));
    }

    output
}
