//! Main GUI application: state, job polling and the frame loop.

use crate::{
    batch::{BatchOptions, BatchProgress, BatchReport, TransferPlan},
    config::Config,
    connector,
    gateway::{ChainGateway, HttpGateway},
    presentation::DisplayModel,
    session::WalletSession,
    types::{TransferOutcome, WalletSnapshot},
};
use anyhow::{anyhow, Result};
use eframe::{egui, egui::RichText, App, Frame, NativeOptions};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use super::async_job::{is_busy, AsyncJob};
use super::helpers::{inline_error, level_color, status_level, COUNT_UP_MILLIS};
use super::notifications::{NotificationEntry, Notifications};
use super::theme::{configure_style, AppTheme};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuiSection {
    Check,
    Send,
}

#[derive(Default)]
pub(crate) struct CheckState {
    pub(crate) address_input: String,
    pub(crate) model: DisplayModel,
    pub(crate) job: Option<AsyncJob<WalletSnapshot>>,
    /// Set when a new snapshot lands; drives the count-up.
    pub(crate) animation_start: Option<Instant>,
}

#[derive(Default)]
pub(crate) struct SendState {
    pub(crate) recipients_input: String,
    pub(crate) amount_input: String,
    pub(crate) divide: bool,
    pub(crate) connect_job: Option<AsyncJob<WalletSession>>,
    /// Plan waiting for the user to confirm.
    pub(crate) pending_plan: Option<TransferPlan>,
    pub(crate) batch_job: Option<AsyncJob<BatchReport>>,
    pub(crate) progress_receiver: Option<mpsc::UnboundedReceiver<BatchProgress>>,
    pub(crate) cancel_sender: Option<oneshot::Sender<()>>,
    pub(crate) live_progress: Vec<String>,
    pub(crate) live_outcomes: Vec<TransferOutcome>,
    pub(crate) last_report: Option<BatchReport>,
    pub(crate) error: Option<String>,
}

impl SendState {
    pub(crate) fn is_sending(&self) -> bool {
        is_busy(&self.batch_job)
    }
}

pub struct GuiApp {
    pub(crate) config: Config,
    pub(crate) theme: AppTheme,
    pub(crate) gateway: Arc<dyn ChainGateway>,
    pub(crate) session: WalletSession,
    pub(crate) section: GuiSection,
    pub(crate) check: CheckState,
    pub(crate) send: SendState,
    pub(crate) notifications: Notifications,
    pub(crate) show_notifications_popup: bool,
}

impl GuiApp {
    fn new(
        config: Config,
        gateway: Arc<dyn ChainGateway>,
        session: WalletSession,
        ctx: &egui::Context,
    ) -> Self {
        let theme = AppTheme::default();
        configure_style(ctx, &theme);

        Self {
            config,
            theme,
            gateway,
            session,
            section: GuiSection::Check,
            check: CheckState::default(),
            send: SendState::default(),
            notifications: Notifications::default(),
            show_notifications_popup: false,
        }
    }

    pub(crate) fn notify(&mut self, entry: NotificationEntry) {
        self.notifications.push(entry);
    }

    pub(crate) fn start_query(&mut self) {
        if is_busy(&self.check.job) {
            return;
        }
        let gateway = self.gateway.clone();
        let input = self.check.address_input.clone();
        self.check.job = Some(AsyncJob::spawn(move || async move {
            crate::query::query_wallet(gateway.as_ref(), &input)
                .await
                .map_err(anyhow::Error::from)
        }));
    }

    pub(crate) fn start_connect(&mut self) {
        if is_busy(&self.send.connect_job) {
            return;
        }
        let mut session = self.session.clone();
        self.send.connect_job = Some(AsyncJob::spawn(move || async move {
            let connected = session.connect().await;
            connected.map(|_| session).map_err(anyhow::Error::from)
        }));
    }

    /// Kick off an approved plan with progress streaming and a stop handle.
    pub(crate) fn start_batch(&mut self, plan: TransferPlan) {
        if self.send.is_sending() {
            return;
        }
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let options = BatchOptions::from_config(&self.config)
            .with_progress(progress_tx)
            .with_cancel(cancel_rx);

        let session = self.session.clone();
        let gateway = self.gateway.clone();
        self.send.live_progress.clear();
        self.send.live_outcomes.clear();
        self.send.last_report = None;
        self.send.progress_receiver = Some(progress_rx);
        self.send.cancel_sender = Some(cancel_tx);
        self.send.batch_job = Some(AsyncJob::spawn(move || async move {
            crate::batch::execute_batch(&session, gateway.as_ref(), plan, options)
                .await
                .map_err(anyhow::Error::from)
        }));
    }

    pub(crate) fn stop_batch(&mut self) {
        if let Some(sender) = self.send.cancel_sender.take() {
            let _ = sender.send(());
            self.notify(NotificationEntry::info("Stopping after the current transfer..."));
        }
    }

    fn poll_jobs(&mut self) {
        if let Some(job) = &mut self.check.job {
            if let Some(res) = job.poll() {
                self.check.job = None;
                let symbol = self.config.native_token().to_string();
                let result = res.map_err(|e| match e.downcast::<crate::error::FlowError>() {
                    Ok(flow) => flow,
                    Err(other) => crate::error::FlowError::Gateway(other.to_string()),
                });
                if result.is_ok() {
                    self.check.animation_start = Some(Instant::now());
                }
                self.check.model = self.check.model.with_query_result(&result, &symbol);
            }
        }

        if let Some(job) = &mut self.send.connect_job {
            if let Some(res) = job.poll() {
                self.send.connect_job = None;
                match res {
                    Ok(session) => {
                        let account = session.account();
                        self.session = session;
                        if let Some(account) = account {
                            self.notify(NotificationEntry::success(format!(
                                "Connected {}",
                                crate::presentation::short_address(&account)
                            )));
                        }
                    }
                    Err(e) => self.notify(NotificationEntry::from_error("Connect failed", &e)),
                }
            }
        }

        if let Some(receiver) = &mut self.send.progress_receiver {
            while let Ok(update) = receiver.try_recv() {
                self.send.live_progress.push(super::helpers::progress_line(&update));
                if let BatchProgress::Finished { outcome, .. } = update {
                    self.send.live_outcomes.push(outcome);
                }
            }
        }

        if let Some(job) = &mut self.send.batch_job {
            if let Some(res) = job.poll() {
                self.send.batch_job = None;
                self.send.progress_receiver = None;
                self.send.cancel_sender = None;
                match res {
                    Ok(report) => {
                        self.notify(NotificationEntry::new(
                            status_level(&report.status),
                            report.summary(),
                        ));
                        self.send.last_report = Some(report);
                    }
                    Err(e) => {
                        let entry = NotificationEntry::from_error("Batch failed", &e);
                        self.send.error = inline_error(&entry);
                        self.notify(entry);
                    }
                }
            }
        }
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.check
            .animation_start
            .map(|start| start.elapsed() < Duration::from_millis(COUNT_UP_MILLIS))
            .unwrap_or(false)
    }

    fn any_job_running(&self) -> bool {
        is_busy(&self.check.job) || is_busy(&self.send.connect_job) || self.send.is_sending()
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(self.theme.spacing_sm);
            ui.horizontal(|ui| {
                ui.heading(RichText::new("monview").strong().color(self.theme.primary));
                ui.label(
                    RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                        .small()
                        .color(self.theme.text_secondary),
                );
                ui.add_space(self.theme.spacing_lg);
                ui.selectable_value(&mut self.section, GuiSection::Check, "Check wallet");
                ui.selectable_value(&mut self.section, GuiSection::Send, "Batch send");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let wallet = match self.session.account() {
                        Some(account) => crate::presentation::short_address(&account),
                        None => "not connected".to_string(),
                    };
                    ui.label(RichText::new(wallet).monospace().color(self.theme.text_secondary));
                    ui.label(
                        RichText::new(self.config.network_label())
                            .strong()
                            .color(self.theme.text_primary),
                    );
                });
            });
            ui.add_space(self.theme.spacing_sm);
        });
    }

    fn render_notifications(&mut self, ctx: &egui::Context) {
        let latest = self.notifications.latest().cloned();
        egui::Area::new(egui::Id::new("notification_overlay"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                self.theme.frame_toast().show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let label = format!("[{}]", self.notifications.len());
                        if ui
                            .add(egui::Button::new(label).fill(egui::Color32::TRANSPARENT))
                            .on_hover_text("Notification history")
                            .clicked()
                        {
                            self.show_notifications_popup = !self.show_notifications_popup;
                        }
                        if let Some(entry) = &latest {
                            ui.label(
                                RichText::new(format!("{} {}", entry.prefix(), entry.message))
                                    .small()
                                    .color(level_color(&self.theme, entry.level)),
                            );
                        }
                    });
                });
            });

        if self.show_notifications_popup {
            let mut open = true;
            egui::Window::new("Notifications")
                .open(&mut open)
                .collapsible(false)
                .default_width(420.0)
                .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -50.0])
                .show(ctx, |ui| {
                    if ui.add(self.theme.button_secondary("Clear")).clicked() {
                        self.notifications.clear();
                    }
                    ui.separator();
                    egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                        for entry in self.notifications.iter_newest_first() {
                            ui.horizontal_wrapped(|ui| {
                                ui.label(
                                    RichText::new(entry.time_ago())
                                        .small()
                                        .color(self.theme.text_secondary),
                                );
                                ui.label(
                                    RichText::new(format!("{} {}", entry.prefix(), entry.message))
                                        .color(level_color(&self.theme, entry.level)),
                                );
                            });
                        }
                    });
                });
            if !open {
                self.show_notifications_popup = false;
            }
        }
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs();
        self.render_top_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.section {
                GuiSection::Check => self.view_check(ui),
                GuiSection::Send => self.view_send(ui),
            });
        });

        self.render_confirmation_window(ctx);
        self.render_notifications(ctx);

        if self.is_animating() {
            ctx.request_repaint();
        } else if self.any_job_running() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

pub fn launch(config: Config) -> Result<()> {
    let gateway: Arc<dyn ChainGateway> = Arc::new(HttpGateway::new(&config)?);
    let wallet = connector::from_config(&config, gateway.clone())?;
    let session = WalletSession::new(wallet, config.chain.clone());
    info!(
        "Starting on {} (chain {}), local key: {}",
        config.network_label(),
        config.chain.chain_id,
        config.uses_local_key()
    );

    let app_creator = move |cc: &eframe::CreationContext<'_>| {
        Box::new(GuiApp::new(config, gateway, session, &cc.egui_ctx)) as Box<dyn App>
    };

    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([880.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native("monview - Monad Testnet wallet viewer", native_options, Box::new(app_creator))
        .map_err(|e| anyhow!("Failed to start GUI: {}", e))
}
