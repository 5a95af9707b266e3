use eframe::egui;

use crate::common::User;
use crate::ui::state::AppState;

/// What the user asked for in the sidebar this frame.
#[derive(Debug, Default, PartialEq)]
pub struct SidebarActions {
    pub selected: Option<User>,
    pub refresh_recents: bool,
}

/// Draws recents and the searchable directory.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.horizontal(|ui| {
        ui.heading("Recent");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
                actions.refresh_recents = true;
            }
        });
    });
    ui.separator();
    if state.recents.is_empty() {
        ui.label(egui::RichText::new("No conversations yet").weak());
    } else {
        for recent in &state.recents {
            let active = state.current_receiver == Some(recent.id);
            let response = ui.selectable_label(active, recent.username.as_str());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&recent.message).weak().small());
                if let Some(time) = recent.short_time() {
                    ui.label(egui::RichText::new(time).weak().small());
                }
            });
            if response.clicked() {
                actions.selected = Some(recent.user());
            }
        }
    }

    ui.add_space(8.0);
    ui.heading(format!("Users ({})", state.directory.all().len()));
    ui.separator();
    ui.add(egui::TextEdit::singleline(&mut state.directory.query).hint_text("Search users"));

    egui::ScrollArea::vertical()
        .id_salt("user_directory")
        .show(ui, |ui| {
            let visible = state.directory.visible();
            if visible.is_empty() {
                ui.label(egui::RichText::new("No users found").weak());
            }
            for user in visible {
                let active = state.current_receiver == Some(user.id);
                if ui.selectable_label(active, user.username.as_str()).clicked() {
                    actions.selected = Some(user.clone());
                }
            }
        });

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;

    #[test]
    fn idle_frame_requests_nothing() {
        let ctx = egui::Context::default();
        let mut state = AppState::new(
            UserId(5),
            vec![User {
                id: UserId(9),
                username: "Bo".into(),
            }],
        );
        let mut actions = None;

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                actions = Some(render(ui, &mut state));
            });
        });

        assert_eq!(actions, Some(SidebarActions::default()));
    }
}
