//! Batch send view: wallet connection, recipient form, confirmation window
//! and live progress.

use crate::batch::{prepare_batch, BatchRequest, BatchStatus};
use crate::gui::app::GuiApp;
use crate::gui::async_job::is_busy;
use crate::gui::helpers::outcome_line;
use crate::gui::notifications::{NotificationEntry, NotificationLevel};
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_send(&mut self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("Batch send").strong());
        ui.label(
            RichText::new(format!(
                "One {} transfer per recipient, sent one after another.",
                self.config.native_token()
            ))
            .color(self.theme.text_secondary),
        );
        ui.add_space(self.theme.spacing_md);

        self.render_wallet_panel(ui);
        ui.add_space(self.theme.spacing_md);
        self.render_send_form(ui);
        ui.add_space(self.theme.spacing_md);
        self.render_batch_progress(ui);
    }

    fn render_wallet_panel(&mut self, ui: &mut egui::Ui) {
        let connecting = is_busy(&self.send.connect_job);
        let account = self.session.account();
        let mut connect = false;
        let mut disconnect = false;

        self.theme.frame_panel().show(ui, |ui| {
            ui.horizontal(|ui| {
                match account {
                    Some(account) => {
                        ui.label(RichText::new("Wallet").color(self.theme.text_secondary));
                        ui.label(
                            RichText::new(ethers::utils::to_checksum(&account, None)).monospace(),
                        );
                        disconnect = ui.add(self.theme.button_secondary("Disconnect")).clicked();
                    }
                    None => {
                        let label = if connecting { "Connecting..." } else { "Connect Wallet" };
                        connect = ui
                            .add_enabled(!connecting, self.theme.button_primary(label))
                            .clicked();
                        let via = if self.config.uses_local_key() {
                            "local key".to_string()
                        } else {
                            self.config.wallet_rpc_url.clone()
                        };
                        ui.label(RichText::new(format!("via {}", via)).small().color(self.theme.text_secondary));
                    }
                }
            });
        });

        if connect {
            self.start_connect();
        }
        if disconnect {
            self.session.disconnect();
            self.notify(NotificationEntry::info("Wallet disconnected"));
        }
    }

    fn render_send_form(&mut self, ui: &mut egui::Ui) {
        let sending = self.send.is_sending();
        let mut review = false;

        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Recipients").color(self.theme.text_secondary));
            ui.add_enabled(
                !sending,
                egui::TextEdit::multiline(&mut self.send.recipients_input)
                    .hint_text("One address per line, or separated by commas")
                    .desired_rows(6)
                    .desired_width(f32::INFINITY)
                    .font(egui::TextStyle::Monospace),
            );

            ui.add_space(self.theme.spacing_sm);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Amount").color(self.theme.text_secondary));
                ui.add_enabled(
                    !sending,
                    egui::TextEdit::singleline(&mut self.send.amount_input)
                        .hint_text("0.0")
                        .desired_width(140.0),
                );
                ui.label(self.config.native_token());
                ui.add_space(self.theme.spacing_md);
                ui.add_enabled(
                    !sending,
                    egui::Checkbox::new(&mut self.send.divide, "Divide total across recipients"),
                );
            });

            ui.add_space(self.theme.spacing_sm);
            review = ui
                .add_enabled(
                    !sending && self.send.pending_plan.is_none(),
                    self.theme.button_primary("Review"),
                )
                .clicked();

            if let Some(error) = &self.send.error {
                ui.add_space(self.theme.spacing_xs);
                ui.label(RichText::new(error).color(self.theme.error));
            }
        });

        if review {
            self.review_batch();
        }
    }

    /// Validate the form and open the confirmation window.
    fn review_batch(&mut self) {
        let request = BatchRequest {
            recipients: &self.send.recipients_input,
            amount: &self.send.amount_input,
            divide: self.send.divide,
        };
        match prepare_batch(&self.session, self.gateway.as_ref(), &request) {
            Ok(plan) => {
                self.send.error = None;
                self.send.pending_plan = Some(plan);
            }
            Err(e) => self.send.error = Some(e.user_message()),
        }
    }

    pub(crate) fn render_confirmation_window(&mut self, ctx: &egui::Context) {
        let Some(plan) = self.send.pending_plan.clone() else {
            return;
        };
        let mut confirmed = false;
        let mut declined = false;

        egui::Window::new("Confirm batch transfer")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(self.theme.frame_dialog())
            .show(ctx, |ui| {
                ui.label(RichText::new(plan.confirmation_prompt()).strong());
                ui.add_space(self.theme.spacing_sm);
                ui.label(
                    RichText::new(format!("Mode: {}", plan.mode.label()))
                        .color(self.theme.text_secondary),
                );
                egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    for recipient in &plan.recipients {
                        ui.label(
                            RichText::new(format!(
                                "{}  {} {}",
                                ethers::utils::to_checksum(recipient, None),
                                plan.per_recipient_display(),
                                plan.symbol
                            ))
                            .monospace()
                            .small(),
                        );
                    }
                });
                ui.add_space(self.theme.spacing_md);
                ui.horizontal(|ui| {
                    confirmed = ui.add(self.theme.button_primary("Send")).clicked();
                    declined = ui.add(self.theme.button_secondary("Cancel")).clicked();
                });
            });

        if confirmed {
            self.send.pending_plan = None;
            self.start_batch(plan);
        } else if declined {
            self.send.pending_plan = None;
            self.notify(NotificationEntry::new(
                NotificationLevel::Cancelled,
                "Batch transfer was cancelled.",
            ));
        }
    }

    fn render_batch_progress(&mut self, ui: &mut egui::Ui) {
        let sending = self.send.is_sending();
        if !sending && self.send.last_report.is_none() && self.send.live_progress.is_empty() {
            return;
        }

        let mut stop = false;
        let mut load_unsent = false;

        self.theme.frame_panel().show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Progress").strong());
                if sending {
                    ui.spinner();
                    stop = ui
                        .add_enabled(
                            self.send.cancel_sender.is_some(),
                            self.theme.button_secondary("Stop"),
                        )
                        .clicked();
                }
            });

            for line in &self.send.live_progress {
                ui.label(RichText::new(line).monospace().small());
            }

            if let Some(report) = &self.send.last_report {
                ui.separator();
                for outcome in &report.outcomes {
                    let color = if outcome.is_success() {
                        self.theme.success
                    } else {
                        self.theme.error
                    };
                    ui.label(RichText::new(outcome_line(outcome)).monospace().color(color));
                }
                ui.label(RichText::new(report.summary()).strong());
                if !matches!(report.status, BatchStatus::Completed)
                    && !report.remaining_recipients().is_empty()
                {
                    load_unsent = ui
                        .add(self.theme.button_secondary("Load unsent recipients"))
                        .clicked();
                }
            }
        });

        if stop {
            self.stop_batch();
        }
        if load_unsent {
            if let Some(report) = &self.send.last_report {
                self.send.recipients_input = report
                    .remaining_recipients()
                    .iter()
                    .map(|a| ethers::utils::to_checksum(a, None))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.notify(NotificationEntry::info(format!(
                    "Loaded {} unsent recipients",
                    report.remaining_recipients().len()
                )));
            }
        }
    }
}
