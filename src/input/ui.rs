use eframe::egui::{self, RichText, Vec2};

use super::{InputMode, InputSurface};
use crate::commands::Command;

const FILE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "pdf"];

impl InputSurface {
    /// Draw the input panel. Mode changes, file picks and the generate
    /// button come back as commands; typing edits the text in place.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Vec<Command> {
        let mut commands = Vec::new();

        ui.label(RichText::new("Input Mode").strong());
        ui.horizontal(|ui| {
            for mode in InputMode::all() {
                let selected = self.mode == *mode;
                let text = format!("{} {}", mode.icon(), mode.label());
                if ui.selectable_label(selected, text).clicked() && !selected {
                    commands.push(Command::SelectMode(*mode));
                }
            }
        });

        ui.add_space(8.0);

        match self.mode {
            InputMode::Text | InputMode::Prompt => {
                let rows = ((ui.available_height() - 60.0) / 18.0).max(4.0) as usize;
                ui.add_enabled(
                    !self.loading,
                    egui::TextEdit::multiline(&mut self.text)
                        .hint_text(self.mode.hint())
                        .desired_rows(rows)
                        .desired_width(f32::INFINITY),
                );
            }
            InputMode::Image => {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.vertical_centered(|ui| {
                        ui.add_space(24.0);
                        ui.label(RichText::new("🖼").size(40.0).weak());
                        let pick = ui.add_enabled(
                            !self.loading,
                            egui::Button::new(self.mode.hint()),
                        );
                        if pick.clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("Images & PDF", FILE_EXTENSIONS)
                                .pick_file()
                            {
                                commands.push(Command::SelectFile(path));
                            }
                        }
                        if let Some(name) = self.file.as_ref().and_then(|p| p.file_name()) {
                            ui.add_space(8.0);
                            ui.label(format!("Selected: {}", name.to_string_lossy()));
                        }
                        ui.add_space(24.0);
                    });
                });
            }
        }

        ui.add_space(12.0);

        if self.loading {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Generating...");
            });
        } else {
            let generate = ui.add_enabled(
                self.can_generate(),
                egui::Button::new(RichText::new("✨ Generate Flowchart").strong())
                    .min_size(Vec2::new(ui.available_width(), 32.0)),
            );
            if generate.clicked() {
                commands.push(Command::Generate);
            }
        }

        commands
    }
}
