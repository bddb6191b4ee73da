use owo_colors::Style;
use std::sync::OnceLock;

use crate::notify::ChangeKind;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal palette for CLI output
#[derive(Debug, Clone)]
pub struct Theme {
    pub heading: Style,
    pub ok: Style,
    pub caution: Style,
    pub accent: Style,
    pub faint: Style,
    pub inserted: Style,
    pub updated: Style,
    pub deleted: Style,
}

impl Theme {
    /// Colors only on a terminal that has not opted out (`NO_COLOR`, `CLICOLOR=0`)
    pub fn detect() -> Self {
        if console::Term::stdout().is_term() && console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            heading: Style::new().cyan().bold(),
            ok: Style::new().green().bold(),
            caution: Style::new().yellow().bold(),
            accent: Style::new().magenta(),
            faint: Style::new().white().dimmed(),
            inserted: Style::new().green(),
            updated: Style::new().yellow(),
            deleted: Style::new().red(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            heading: none.clone(),
            ok: none.clone(),
            caution: none.clone(),
            accent: none.clone(),
            faint: none.clone(),
            inserted: none.clone(),
            updated: none.clone(),
            deleted: none,
        }
    }

    /// Style for a change line of the given kind
    pub fn for_change(&self, kind: ChangeKind) -> Style {
        match kind {
            ChangeKind::Inserted => self.inserted.clone(),
            ChangeKind::Updated => self.updated.clone(),
            ChangeKind::Deleted => self.deleted.clone(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
