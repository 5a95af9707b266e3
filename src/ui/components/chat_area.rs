use eframe::egui;
use eframe::egui::scroll_area::ScrollAreaOutput;

use crate::common::{Direction, TranscriptLine};

/// Transcript view. Only visible rows are laid out, so long conversations
/// stay cheap to draw.
pub fn render(
    ui: &mut egui::Ui,
    transcript: &[TranscriptLine],
    scroll_to_bottom: &mut bool,
) -> ScrollAreaOutput<()> {
    let row_height = ui.text_style_height(&egui::TextStyle::Body);
    // show_rows places rows this far apart.
    let row_step = row_height + ui.spacing().item_spacing.y;
    let available = ui.available_height() - 40.0;

    let mut area = egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height(available.max(row_height))
        .stick_to_bottom(true);
    if std::mem::take(scroll_to_bottom) {
        area = area.vertical_scroll_offset(row_step * transcript.len() as f32);
    }

    area.show_rows(ui, row_height, transcript.len(), |ui, rows| {
        for line in &transcript[rows] {
            ui.horizontal(|ui| {
                let color = match line.direction {
                    Direction::Sent => egui::Color32::LIGHT_BLUE,
                    Direction::Received => ui.visuals().text_color(),
                };
                ui.label(egui::RichText::new(line.label()).strong().color(color));
                // Rows have a fixed height; elided text shows in full on hover.
                ui.add(egui::Label::new(format!(": {}", line.text)).truncate());
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;

    fn frame(transcript: &[TranscriptLine], scroll_to_bottom: &mut bool) -> ScrollAreaOutput<()> {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(800.0, 600.0),
            )),
            ..Default::default()
        };
        let mut output = None;
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                output = Some(render(ui, transcript, scroll_to_bottom));
            });
        });
        output.unwrap()
    }

    fn lines(count: usize, text: &str) -> Vec<TranscriptLine> {
        (0..count)
            .map(|i| TranscriptLine::from_sender(UserId(i as i64 % 2), UserId(0), text))
            .collect()
    }

    #[test]
    fn scroll_request_lands_on_last_row() {
        let transcript = lines(500, "hello");
        let mut scroll_to_bottom = true;

        let out = frame(&transcript, &mut scroll_to_bottom);

        assert!(!scroll_to_bottom);
        let max_offset = out.content_size.y - out.inner_rect.height();
        assert!(max_offset > 0.0);
        assert!(
            (max_offset - out.state.offset.y).abs() < 1.0,
            "offset {} of {max_offset}",
            out.state.offset.y
        );
    }

    #[test]
    fn no_scroll_request_stays_at_top() {
        let transcript = lines(500, "hello");
        let mut scroll_to_bottom = false;

        let out = frame(&transcript, &mut scroll_to_bottom);

        assert_eq!(out.state.offset.y, 0.0);
    }

    #[test]
    fn long_message_fits_the_row() {
        let transcript = lines(1, &"long ".repeat(2000));
        let mut scroll_to_bottom = false;

        let out = frame(&transcript, &mut scroll_to_bottom);

        assert!(
            out.content_size.x <= out.inner_rect.width() + 1.0,
            "content {} wider than view {}",
            out.content_size.x,
            out.inner_rect.width()
        );
    }
}
