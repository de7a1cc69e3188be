//! Wallet check view: address field, animated balance, tier and share.

use crate::gui::app::GuiApp;
use crate::gui::async_job::is_busy;
use crate::gui::helpers::{tier_color, COUNT_UP_MILLIS};
use crate::gui::notifications::NotificationEntry;
use crate::presentation::{count_up_value, share_text, StatusLine};
use eframe::egui::{self, RichText};
use std::time::Duration;

impl GuiApp {
    pub(crate) fn view_check(&mut self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("Check a wallet").strong());
        ui.label(
            RichText::new(format!(
                "Balance and transaction count on {}.",
                self.config.network_label()
            ))
            .color(self.theme.text_secondary),
        );
        ui.add_space(self.theme.spacing_md);

        let busy = is_busy(&self.check.job);
        let mut check = false;
        self.theme.frame_panel().show(ui, |ui| {
            ui.horizontal(|ui| {
                let field = egui::TextEdit::singleline(&mut self.check.address_input)
                    .hint_text("0x...")
                    .desired_width(440.0)
                    .font(egui::TextStyle::Monospace);
                let response = ui.add(field);
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let label = if busy { "Checking..." } else { "Check" };
                let clicked = ui.add_enabled(!busy, self.theme.button_primary(label)).clicked();
                check = clicked || (submitted && !busy);
            });
        });
        if check {
            self.start_query();
        }

        ui.add_space(self.theme.spacing_md);
        self.render_check_result(ui);
    }

    fn render_check_result(&mut self, ui: &mut egui::Ui) {
        if let Some(status) = &self.check.model.status {
            let (text, color) = match status {
                StatusLine::Info(text) => (text.clone(), self.theme.text_primary),
                StatusLine::Error(text) => (text.clone(), self.theme.error),
            };
            ui.label(RichText::new(text).color(color));
            ui.add_space(self.theme.spacing_sm);
        }

        let Some(snapshot) = self.check.model.snapshot.clone() else {
            return;
        };
        let symbol = self.config.native_token().to_string();

        let shown = match self.check.animation_start {
            Some(start) => count_up_value(
                snapshot.balance.display_value,
                start.elapsed(),
                Duration::from_millis(COUNT_UP_MILLIS),
            ),
            None => snapshot.balance.display_value,
        };
        let balance_text = if self.is_animating() {
            format!("{:.4} {}", shown, symbol)
        } else {
            format!("{} {}", snapshot.balance.formatted, symbol)
        };

        let mut share_clicked = false;
        let mut explorer_clicked = false;
        self.theme.frame_panel().show(ui, |ui| {
            egui::Grid::new("check_result_grid")
                .num_columns(2)
                .spacing([self.theme.spacing_lg, self.theme.spacing_sm])
                .show(ui, |ui| {
                    ui.label(RichText::new("Address").color(self.theme.text_secondary));
                    ui.label(
                        RichText::new(ethers::utils::to_checksum(&snapshot.address, None))
                            .monospace(),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Balance").color(self.theme.text_secondary));
                    ui.label(
                        RichText::new(balance_text)
                            .size(26.0)
                            .strong()
                            .color(tier_color(&self.theme, snapshot.tier)),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Transactions").color(self.theme.text_secondary));
                    ui.label(RichText::new(snapshot.tx_count.to_string()).strong());
                    ui.end_row();

                    ui.label(RichText::new("Tier").color(self.theme.text_secondary));
                    ui.label(
                        RichText::new(snapshot.tier.label())
                            .color(tier_color(&self.theme, snapshot.tier)),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Fetched").color(self.theme.text_secondary));
                    ui.label(snapshot.fetched_at.format("%H:%M:%S").to_string());
                    ui.end_row();
                });

            ui.add_space(self.theme.spacing_sm);
            ui.horizontal(|ui| {
                share_clicked = ui.add(self.theme.button_secondary("Copy summary")).clicked();
                explorer_clicked = ui
                    .link(RichText::new("View on explorer").color(self.theme.link))
                    .clicked();
            });
        });

        if share_clicked {
            let text = share_text(&snapshot, &self.config.chain);
            ui.output_mut(|o| o.copied_text = text);
            self.notify(NotificationEntry::info("Summary copied to clipboard"));
        }
        if explorer_clicked {
            let url = self
                .config
                .chain
                .address_url(&ethers::utils::to_checksum(&snapshot.address, None));
            if let Err(e) = open::that(&url) {
                self.notify(NotificationEntry::info(format!("Failed to open URL: {}", e)));
            }
        }
    }
}
