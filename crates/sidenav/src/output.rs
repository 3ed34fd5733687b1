//! Styled progress reporting on stderr.
//!
//! stdout stays reserved for machine-readable output (`generate --json`).

use console::{Style, Term};

use crate::commands::language_label;

/// How a line is rendered.
#[derive(Clone, Copy)]
enum Tone {
    Plain,
    Good,
    Caution,
    Failure,
    Heading,
    Muted,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Good => Style::new().green(),
            Self::Caution => Style::new().yellow(),
            Self::Failure => Style::new().red(),
            Self::Heading => Style::new().cyan().bold(),
            Self::Muted => Style::new().dim(),
        }
    }
}

/// Progress reporter for CLI commands.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn write(&self, tone: Tone, indent: usize, msg: &str) {
        let line = format!("{:indent$}{}", "", tone.style().apply_to(msg));
        let _ = self.term.write_line(&line);
    }

    pub(crate) fn info(&self, msg: &str) {
        self.write(Tone::Plain, 0, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.write(Tone::Good, 0, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.write(Tone::Caution, 0, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.write(Tone::Failure, 0, msg);
    }

    /// Secondary line below a heading, dimmed and indented.
    pub(crate) fn detail(&self, msg: &str) {
        self.write(Tone::Muted, 2, msg);
    }

    /// Heading introducing the output of one language.
    pub(crate) fn language(&self, lang: &str) {
        self.write(Tone::Heading, 0, language_label(lang));
    }

    /// One route of a generated navigation with its item count.
    pub(crate) fn route(&self, route: &str, items: usize) {
        let noun = if items == 1 { "item" } else { "items" };
        self.write(Tone::Muted, 2, &format!("{route}  {items} {noun}"));
    }
}
