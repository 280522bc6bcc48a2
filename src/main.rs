//! Flowchart Studio - AI flowchart maker
//! Built with egui for native Wayland support

use anyhow::Context;
use clap::Parser;
use eframe::egui::{self, Align2, Color32, RichText, Stroke, Vec2};
use std::path::PathBuf;
use std::time::Duration;

use flowchart_studio::{Notice, Studio, StudioConfig};

/// Repaint interval while a generation call is outstanding
const LOADING_REPAINT: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "flowchart-studio")]
#[command(author = "e421")]
#[command(version)]
#[command(about = "Flowchart Studio - generate and edit flowcharts from text, prompts or images")]
struct Args {
    /// Config file (default: ~/.config/flowchart-studio/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generation service URL, overrides the config file
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => StudioConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StudioConfig::load(),
    };
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }

    let studio = Studio::from_config(&config).context("Failed to set up generation client")?;
    let base_url = config.api.base_url.clone();
    let dark = config.canvas.dark;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Flowchart Studio"),
        ..Default::default()
    };

    eframe::run_native(
        "Flowchart Studio",
        options,
        Box::new(move |cc| {
            let mut style = (*cc.egui_ctx.style()).clone();
            style.visuals = if dark {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            };
            style.visuals.widgets.active.bg_fill = Color32::from_rgb(37, 99, 235);
            style.visuals.widgets.hovered.bg_stroke =
                Stroke::new(1.0, Color32::from_rgb(37, 99, 235));
            cc.egui_ctx.set_style(style);

            Ok(Box::new(FlowchartStudioApp::new(studio, base_url)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start UI: {e}"))
}

struct FlowchartStudioApp {
    studio: Studio,
    base_url: String,
    /// Blocking error dialog
    alert: Option<String>,
    status_message: Option<String>,
}

impl FlowchartStudioApp {
    fn new(studio: Studio, base_url: String) -> Self {
        Self {
            studio,
            base_url,
            alert: None,
            status_message: None,
        }
    }

    fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
        log::info!("{}", msg);
    }

    /// Drain queued commands and surface what came out of them
    fn process(&mut self) {
        self.studio.poll();
        for notice in self.studio.process() {
            match notice {
                Notice::Alert(message) => {
                    self.status_message = None;
                    self.alert = Some(message);
                }
                Notice::Status(message) => self.set_status(&message),
                Notice::Exported(path) => {
                    self.set_status(&format!("✓ Saved {}", path.display()));
                }
            }
        }
    }

    fn show_header(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("AI Flowchart Maker").strong());
            ui.label(RichText::new("Text, prompt or image in, flowchart out").weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(&self.base_url).monospace().weak());
            });
        });
    }

    fn show_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.studio.input().is_loading() {
                ui.add(egui::Spinner::new().size(12.0));
            }
            let text = self.status_message.as_deref().unwrap_or("Ready");
            ui.label(RichText::new(text).size(12.0));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let graph = self.studio.store().graph();
                ui.label(
                    RichText::new(format!(
                        "{} nodes · {} edges · {}",
                        graph.nodes.len(),
                        graph.edges.len(),
                        self.studio.canvas().orientation().label()
                    ))
                    .size(12.0)
                    .weak(),
                );
            });
        });
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.set_min_width(320.0);
                ui.label(&message);
                ui.add_space(8.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.alert = None;
        }
    }
}

impl eframe::App for FlowchartStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process();

        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0)),
            )
            .show(ctx, |ui| self.show_header(ui));

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(12.0, 4.0)),
            )
            .show(ctx, |ui| self.show_status_bar(ui));

        egui::SidePanel::left("input_panel")
            .default_width(340.0)
            .width_range(260.0..=520.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                // Dialog open: keep the input frozen
                ui.add_enabled_ui(self.alert.is_none(), |ui| {
                    let commands = self.studio.input_mut().ui(ui);
                    self.studio.submit_all(commands);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.add_enabled_ui(self.alert.is_none(), |ui| {
                    let commands = self.studio.canvas_mut().ui(ui);
                    self.studio.submit_all(commands);
                });
            });

        self.show_alert(ctx);

        // Apply this frame's commands right away
        self.process();

        if self.studio.input().is_loading() {
            ctx.request_repaint_after(LOADING_REPAINT);
        }
    }
}
