//! Theme-aware colors for rigdash views.
//!
//! Chart colors are fixed (see [`crate::graphs::palette`]); everything around
//! the charts follows the active theme.

use iced::widget::{container, text};
use iced::{Border, Color, Theme};

/// Semantic colors derived from a theme's extended palette.
pub struct ThemeColors<'a> {
    theme: &'a Theme,
}

impl<'a> ThemeColors<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn palette(&self) -> &iced::theme::palette::Extended {
        self.theme.extended_palette()
    }

    /// Panel card background.
    pub fn card_background(&self) -> Color {
        self.palette().background.weak.color
    }

    /// Muted/secondary text color.
    pub fn text_muted(&self) -> Color {
        self.palette().background.weak.text
    }

    pub fn success(&self) -> Color {
        self.palette().success.base.color
    }

    pub fn danger(&self) -> Color {
        self.palette().danger.base.color
    }

    /// Warning color (amber).
    pub fn warning(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.9, 0.7, 0.2)
        } else {
            Color::from_rgb(0.8, 0.6, 0.0)
        }
    }

    pub fn border(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.25, 0.25, 0.3)
        } else {
            Color::from_rgb(0.8, 0.8, 0.82)
        }
    }

    /// Background of the diagnostic text area.
    pub fn text_area_background(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.08, 0.08, 0.1)
        } else {
            Color::from_rgb(0.98, 0.98, 0.99)
        }
    }

    pub fn is_dark(&self) -> bool {
        self.palette().is_dark
    }
}

/// Shorthand for [`ThemeColors::new`].
pub fn colors(theme: &Theme) -> ThemeColors<'_> {
    ThemeColors::new(theme)
}

/// Bordered card around a device panel.
pub fn panel_card(theme: &Theme) -> container::Style {
    let colors = colors(theme);
    container::Style {
        background: Some(colors.card_background().into()),
        border: Border {
            color: colors.border(),
            width: 1.0,
            radius: 6.0.into(),
        },
        ..Default::default()
    }
}

/// Read-only text area frame.
pub fn text_area(theme: &Theme) -> container::Style {
    let colors = colors(theme);
    container::Style {
        background: Some(colors.text_area_background().into()),
        border: Border {
            color: colors.border(),
            width: 1.0,
            radius: 3.0.into(),
        },
        ..Default::default()
    }
}

pub fn warning_text(theme: &Theme) -> text::Style {
    text::Style {
        color: Some(colors(theme).warning()),
    }
}

pub fn error_text(theme: &Theme) -> text::Style {
    text::Style {
        color: Some(colors(theme).danger()),
    }
}

pub fn muted_text(theme: &Theme) -> text::Style {
    text::Style {
        color: Some(colors(theme).text_muted()),
    }
}

/// Connection status text.
pub fn status_text(connected: bool) -> impl Fn(&Theme) -> text::Style {
    move |theme| text::Style {
        color: Some(if connected {
            colors(theme).success()
        } else {
            colors(theme).danger()
        }),
    }
}
