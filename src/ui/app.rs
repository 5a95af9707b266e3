use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{NetworkCommand, NetworkEvent, User, UserId};

use super::components::{chat_area, input_bar, sidebar};
use super::state::AppState;

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<NetworkCommand>,
    event_receiver: mpsc::Receiver<NetworkEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        my_id: UserId,
        users: Vec<User>,
        command_sender: mpsc::Sender<NetworkCommand>,
        event_receiver: mpsc::Receiver<NetworkEvent>,
    ) -> Self {
        Self {
            state: AppState::new(my_id, users),
            command_sender,
            event_receiver,
        }
    }

    fn handle_network_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                NetworkEvent::Connected => self.state.connected = true,
                NetworkEvent::Disconnected => {
                    log::warn!("Lost connection to chat server");
                    self.state.connected = false;
                }
                NetworkEvent::MessageReceived(message) => {
                    self.state.receive_message(message);
                }
                NetworkEvent::HistoryLoaded { other, messages } => {
                    self.state.apply_history(other, messages);
                }
                NetworkEvent::RecentsLoaded(recents) => self.state.set_recents(recents),
            }
        }
    }

    fn send_command(&self, command: NetworkCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to network: {err}");
        }
    }

    fn select_user(&mut self, user: User) {
        for command in self.state.select_user(&user) {
            self.send_command(command);
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_network_events();

        egui::SidePanel::left("user_sidebar")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                let actions = sidebar::render(ui, &mut self.state);
                if let Some(user) = actions.selected {
                    self.select_user(user);
                }
                if actions.refresh_recents {
                    self.send_command(NetworkCommand::LoadRecents);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.state.header.as_str());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (color, text) = if self.state.connected {
                        (egui::Color32::GREEN, "● online")
                    } else {
                        (egui::Color32::GRAY, "○ offline")
                    };
                    ui.colored_label(color, text);
                });
            });
            ui.separator();
            chat_area::render(ui, &self.state.transcript, &mut self.state.scroll_to_bottom);

            ui.separator();
            let can_send = self.state.current_receiver.is_some();
            if input_bar::render(ui, &mut self.state.input_text, can_send) {
                if let Some(command) = self.state.take_input() {
                    self.send_command(command);
                }
            }
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
