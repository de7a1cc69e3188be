//! Colors, spacing and styled widget factories.

use eframe::egui;

#[derive(Clone, Copy)]
pub struct AppTheme {
    pub background: egui::Color32,
    pub surface: egui::Color32,
    pub surface_hover: egui::Color32,
    pub surface_active: egui::Color32,
    pub panel_fill: egui::Color32,
    pub text_primary: egui::Color32,
    pub text_secondary: egui::Color32,

    pub primary: egui::Color32,
    pub secondary: egui::Color32,
    pub success: egui::Color32,
    pub warning: egui::Color32,
    pub error: egui::Color32,
    pub link: egui::Color32,

    pub spacing_xs: f32,
    pub spacing_sm: f32,
    pub spacing_md: f32,
    pub spacing_lg: f32,

    pub button_small: egui::Vec2,
    pub button_medium: egui::Vec2,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self {
            // Dark violet base around the Monad purple (#836EF9)
            background: egui::Color32::from_rgb(14, 16, 28),
            surface: egui::Color32::from_rgb(24, 26, 42),
            surface_hover: egui::Color32::from_rgb(34, 36, 58),
            surface_active: egui::Color32::from_rgb(46, 44, 78),
            panel_fill: egui::Color32::from_rgb(18, 20, 34),
            text_primary: egui::Color32::from_rgb(236, 234, 255),
            text_secondary: egui::Color32::from_rgb(150, 148, 178),

            primary: egui::Color32::from_rgb(131, 110, 249),
            secondary: egui::Color32::from_rgb(70, 68, 100),
            success: egui::Color32::from_rgb(64, 214, 150),
            warning: egui::Color32::from_rgb(255, 190, 80),
            error: egui::Color32::from_rgb(255, 96, 110),
            link: egui::Color32::from_rgb(160, 180, 255),

            spacing_xs: 4.0,
            spacing_sm: 8.0,
            spacing_md: 16.0,
            spacing_lg: 24.0,

            button_small: egui::vec2(90.0, 26.0),
            button_medium: egui::vec2(140.0, 34.0),
        }
    }
}

impl AppTheme {
    pub fn button_primary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary).strong())
            .fill(self.primary)
            .min_size(self.button_medium)
    }

    /// Outlined button for secondary actions (cancel, copy, stop)
    pub fn button_secondary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary))
            .fill(self.surface)
            .stroke(egui::Stroke::new(1.5, self.secondary))
            .min_size(self.button_small)
    }

    pub fn frame_panel(&self) -> egui::Frame {
        egui::Frame::group(&egui::Style::default())
            .fill(self.panel_fill)
            .stroke(egui::Stroke::new(1.0, self.surface_active))
            .rounding(10.0)
            .inner_margin(egui::Margin::symmetric(self.spacing_md, self.spacing_sm + 4.0))
    }

    /// Compact frame for the notification toast.
    pub fn frame_toast(&self) -> egui::Frame {
        egui::Frame::popup(&egui::Style::default())
            .fill(self.surface)
            .stroke(egui::Stroke::new(1.0, self.secondary))
            .inner_margin(self.spacing_sm)
    }

    /// Confirmation dialog with an accent border.
    pub fn frame_dialog(&self) -> egui::Frame {
        egui::Frame::window(&egui::Style::default())
            .fill(self.background)
            .stroke(egui::Stroke::new(2.0, self.primary))
            .inner_margin(self.spacing_lg)
    }
}

pub fn configure_style(ctx: &egui::Context, theme: &AppTheme) {
    let mut visuals = egui::Visuals::dark();
    visuals.window_fill = theme.background;
    visuals.panel_fill = theme.panel_fill;
    visuals.override_text_color = Some(theme.text_primary);
    visuals.hyperlink_color = theme.link;

    visuals.widgets.noninteractive.bg_fill = theme.surface;
    visuals.widgets.inactive.bg_fill = theme.surface;
    visuals.widgets.hovered.bg_fill = theme.surface_hover;
    visuals.widgets.active.bg_fill = theme.surface_active;
    visuals.widgets.open.bg_fill = theme.surface_active;

    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, theme.secondary);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, theme.primary);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(2.0, theme.primary);
    visuals.selection.bg_fill = theme.primary;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(theme.spacing_sm, theme.spacing_sm);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);
    for (text_style, size, family) in [
        (egui::TextStyle::Heading, 22.0, egui::FontFamily::Proportional),
        (egui::TextStyle::Body, 15.0, egui::FontFamily::Proportional),
        (egui::TextStyle::Button, 15.0, egui::FontFamily::Proportional),
        (egui::TextStyle::Small, 12.0, egui::FontFamily::Proportional),
        (egui::TextStyle::Monospace, 13.0, egui::FontFamily::Monospace),
    ] {
        style.text_styles.insert(text_style, egui::FontId::new(size, family));
    }
    ctx.set_style(style);
}
