use std::time::{Duration, Instant};

use client_core::{Notification, Severity};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::CollectionStatus,
    protocol::{collection_request_label, Station},
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent, orchestration::dispatch_backend_command, reducer::BoardView,
};

const TITLE: &str = "Controle de Volumes";
const MAX_BOARD_WIDTH: f32 = 600.0;

pub struct StationBoardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: BoardView,
}

impl StationBoardApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            view: BoardView::new(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.view.apply(event);
        }
    }

    fn show_backend_error(&mut self, ui: &mut egui::Ui) {
        let Some(message) = self.view.backend_error.clone() else {
            return;
        };
        egui::Frame::group(ui.style())
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Fechar").clicked() {
                            self.view.backend_error = None;
                        }
                    });
                });
            });
        ui.add_space(8.0);
    }

    fn show_board(&mut self, ui: &mut egui::Ui) -> Vec<BackendCommand> {
        let mut queued = Vec::new();
        let busy = self.view.in_flight();

        ui.vertical_centered(|ui| {
            ui.heading(TITLE);
        });
        ui.add_space(12.0);

        if self.view.is_loading() {
            ui.label(egui::RichText::new("Carregando dados...").weak());
            return queued;
        }

        let stations = self.view.stations.clone();
        egui::ScrollArea::vertical().show(ui, |ui| {
            for station in &stations {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    self.show_station(ui, station, busy, &mut queued);
                });
                ui.add_space(16.0);
            }
        });
        queued
    }

    fn show_station(
        &mut self,
        ui: &mut egui::Ui,
        station: &Station,
        busy: bool,
        queued: &mut Vec<BackendCommand>,
    ) {
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(&station.name).strong().size(18.0));
        });

        let draft = self.view.draft_mut(station.id);
        ui.add(
            egui::TextEdit::singleline(draft)
                .hint_text("Digite o volume %")
                .desired_width(f32::INFINITY),
        );
        let draft = draft.clone();

        let label = if busy { "Atualizando..." } else { "Atualizar Volume" };
        let button = egui::Button::new(label).min_size(egui::vec2(ui.available_width(), 28.0));
        if ui.add_enabled(!busy, button).clicked() {
            queued.push(BackendCommand::SubmitVolume {
                station_id: station.id,
                draft,
            });
        }

        ui.add_space(8.0);
        ui.label(format!("Volume Atual: {}%", station.volume));
        let fill = (station.volume / 100.0).clamp(0.0, 1.0) as f32;
        ui.add(egui::ProgressBar::new(fill).desired_height(20.0));
        ui.label(
            egui::RichText::new(format!(
                "Pedido de Coleta: {}",
                collection_request_label(station.collection_request.as_ref())
            ))
            .weak(),
        );

        let Some(request) = station
            .collection_request
            .as_ref()
            .filter(|_| station.has_open_collection_request())
        else {
            return;
        };
        ui.add_space(8.0);
        ui.columns(2, |columns| {
            let confirm = egui::Button::new(
                egui::RichText::new("Confirmar Coleta").color(egui::Color32::WHITE),
            )
            .fill(egui::Color32::from_rgb(46, 125, 50))
            .min_size(egui::vec2(columns[0].available_width(), 28.0));
            if columns[0].add_enabled(!busy, confirm).clicked() {
                queued.push(BackendCommand::SubmitCollectionStatus {
                    collection_request_id: request.id,
                    status: CollectionStatus::Confirmed,
                });
            }

            let cancel = egui::Button::new(
                egui::RichText::new("Cancelar Coleta").color(egui::Color32::WHITE),
            )
            .fill(egui::Color32::from_rgb(198, 40, 40))
            .min_size(egui::vec2(columns[1].available_width(), 28.0));
            if columns[1].add_enabled(!busy, cancel).clicked() {
                queued.push(BackendCommand::SubmitCollectionStatus {
                    collection_request_id: request.id,
                    status: CollectionStatus::Canceled,
                });
            }
        });
    }

    fn show_notification(&mut self, ctx: &egui::Context, notification: &Notification) {
        let fill = match notification.severity {
            Severity::Success => egui::Color32::from_rgb(46, 125, 50),
            Severity::Error => egui::Color32::from_rgb(198, 40, 40),
        };
        egui::TopBottomPanel::bottom("notification").show(ctx, |ui| {
            egui::Frame::group(ui.style()).fill(fill).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(&notification.message).color(egui::Color32::WHITE),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("×").clicked() {
                            self.view.dismiss_notification();
                        }
                    });
                });
            });
        });
    }
}

impl eframe::App for StationBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        if let Some(notification) = self.view.visible_notification(Instant::now()).cloned() {
            self.show_notification(ctx, &notification);
        }

        let queued = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let width = ui.available_width().min(MAX_BOARD_WIDTH);
                ui.vertical_centered(|ui| {
                    ui.set_max_width(width);
                    self.show_backend_error(ui);
                    self.show_board(ui)
                })
                .inner
            })
            .inner;

        for cmd in queued {
            dispatch_backend_command(&self.cmd_tx, cmd, &mut self.view);
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
