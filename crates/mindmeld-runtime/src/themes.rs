//! Named reading themes.

use tracing::{debug, warn};

use mindmeld_dom::{Document, DomError};

/// `id` of the injected theme stylesheet.
pub const THEME_STYLE_ID: &str = "mindmeld-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    /// `None` leaves the page's own colors alone.
    pub background: Option<&'static str>,
    pub text: Option<&'static str>,
}

const fn theme(name: &'static str, background: &'static str, text: &'static str) -> Theme {
    Theme {
        name,
        background: Some(background),
        text: Some(text),
    }
}

pub const THEMES: [Theme; 13] = [
    Theme {
        name: "default",
        background: None,
        text: None,
    },
    theme("highContrast", "#FFFFFF", "#000000"),
    theme("highContrastAlt", "#000000", "#FFFFFF"),
    theme("darkMode", "#121212", "#E0E0E0"),
    theme("sepia", "#F5E9D5", "#5B4636"),
    theme("lowBlueLight", "#FFF8E1", "#2E2E2E"),
    theme("softPastelBlue", "#E3F2FD", "#0D47A1"),
    theme("softPastelGreen", "#F1FFF0", "#00695C"),
    theme("creamPaper", "#FFFFF0", "#333333"),
    theme("grayScale", "#F5F5F5", "#424242"),
    theme("blueLightFilter", "#FFF3E0", "#4E342E"),
    theme("highContrastYellowBlack", "#000000", "#FFFF00"),
    theme("highContrastBlackYellow", "#FFFF00", "#000000"),
];

impl Theme {
    /// Case-insensitive lookup by name.
    pub fn lookup(name: &str) -> Option<&'static Theme> {
        THEMES.iter().find(|theme| theme.name.eq_ignore_ascii_case(name))
    }

    pub fn is_default(&self) -> bool {
        self.background.is_none() && self.text.is_none()
    }

    /// Stylesheet applying the theme, empty for the default theme.
    pub fn css(&self) -> String {
        let mut declarations = Vec::new();
        if let Some(background) = self.background {
            declarations.push(format!("background-color:{background} !important;"));
        }
        if let Some(text) = self.text {
            declarations.push(format!("color:{text} !important;"));
        }
        if declarations.is_empty() {
            return String::new();
        }
        format!("html,body,body *{{{}}}", declarations.join(""))
    }
}

/// Apply `theme` to `doc`, replacing any theme applied before.
///
/// The default theme removes the stylesheet.
pub fn apply_theme(doc: &mut Document, theme: &Theme) -> Result<(), DomError> {
    if let Some(existing) = doc.element_by_id(THEME_STYLE_ID) {
        doc.detach(existing);
    }
    if theme.is_default() {
        debug!("Theme reset");
        return Ok(());
    }

    let Some(head) = doc.head() else {
        warn!(theme = theme.name, "Document has no head, theme not applied");
        return Ok(());
    };
    let style = doc.create_element("style");
    doc.set_attr(style, "id", THEME_STYLE_ID)?;
    doc.set_text(style, &theme.css());
    doc.append_child(head, style)?;
    debug!(theme = theme.name, "Theme applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry() {
        assert_eq!(THEMES.len(), 13);
        let sepia = Theme::lookup("sepia").unwrap();
        assert_eq!(sepia.background, Some("#F5E9D5"));
        assert_eq!(sepia.text, Some("#5B4636"));
        assert_eq!(Theme::lookup("DARKMODE").unwrap().name, "darkMode");
        assert!(Theme::lookup("neon").is_none());
        assert!(Theme::lookup("default").unwrap().is_default());
    }

    #[test]
    fn test_css() {
        let dark = Theme::lookup("darkMode").unwrap();
        assert_eq!(
            dark.css(),
            "html,body,body *{background-color:#121212 !important;color:#E0E0E0 !important;}"
        );
        assert_eq!(THEMES[0].css(), "");
    }

    #[test]
    fn test_apply_replaces_previous_theme() {
        let mut doc = Document::parse("<html><head></head><body><p>x</p></body></html>");

        apply_theme(&mut doc, Theme::lookup("sepia").unwrap()).unwrap();
        apply_theme(&mut doc, Theme::lookup("darkMode").unwrap()).unwrap();

        let style = doc.element_by_id(THEME_STYLE_ID).unwrap();
        assert_eq!(doc.parent(style), doc.head());
        assert!(doc.text_content(style).contains("#121212"));
        assert_eq!(doc.html().matches(THEME_STYLE_ID).count(), 1);
    }

    #[test]
    fn test_default_removes_theme() {
        let mut doc = Document::parse("<html><head></head><body></body></html>");
        apply_theme(&mut doc, Theme::lookup("grayScale").unwrap()).unwrap();
        apply_theme(&mut doc, Theme::lookup("default").unwrap()).unwrap();
        assert!(doc.element_by_id(THEME_STYLE_ID).is_none());
    }
}
