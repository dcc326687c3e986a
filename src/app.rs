use std::path::PathBuf;

use egui::{Color32, ColorImage, Rect, Sense, TextureHandle, TextureOptions, pos2};

use crate::canvas::{Canvas, EventOutcome};
use crate::config::EditorConfig;
use crate::event::{CanvasEvent, EventLog, LogHandler};
use crate::filters::{Adjustments, Filter};
use crate::input::InputHandler;
use crate::io;
use crate::style::{CapStyle, FillChoice, FillStyle, JoinStyle, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, PenStyle, ToolStyle};
use crate::tools::ToolKind;

const PEN_STYLES: [PenStyle; 6] = [
    PenStyle::Solid,
    PenStyle::Dash,
    PenStyle::Dot,
    PenStyle::DashDot,
    PenStyle::DashDotDot,
    PenStyle::NoPen,
];
const CAP_STYLES: [CapStyle; 3] = [CapStyle::Flat, CapStyle::Square, CapStyle::Round];
const JOIN_STYLES: [JoinStyle; 3] = [JoinStyle::Miter, JoinStyle::Bevel, JoinStyle::Round];
const FILL_CHOICES: [FillChoice; 9] = [
    FillChoice::None,
    FillChoice::SecondColor,
    FillChoice::Pattern(FillStyle::Solid),
    FillChoice::Pattern(FillStyle::Horizontal),
    FillChoice::Pattern(FillStyle::Vertical),
    FillChoice::Pattern(FillStyle::Cross),
    FillChoice::Pattern(FillStyle::BackwardDiagonal),
    FillChoice::Pattern(FillStyle::ForwardDiagonal),
    FillChoice::Pattern(FillStyle::DiagonalCross),
];

fn fill_label(fill: FillChoice) -> String {
    match fill {
        FillChoice::None => "No fill".to_owned(),
        FillChoice::SecondColor => "Second color".to_owned(),
        FillChoice::Pattern(style) => format!("{style:?}"),
    }
}

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct PaintApp {
    config: EditorConfig,
    style: ToolStyle,
    last_path: String,

    #[serde(skip)]
    canvas: Canvas,
    #[serde(skip)]
    input: InputHandler,
    #[serde(skip)]
    events: EventLog,
    // GPU-side copy of the canvas preview
    #[serde(skip)]
    texture: Option<TextureHandle>,
    #[serde(skip)]
    texture_revision: Option<u64>,
    #[serde(skip)]
    text_entry: Option<String>,
    #[serde(skip)]
    adjustments: Option<Adjustments>,
    #[serde(skip)]
    status: String,
}

impl Default for PaintApp {
    fn default() -> Self {
        Self::with_config(EditorConfig::default(), ToolStyle::default(), String::new())
    }
}

impl PaintApp {
    /// Called once before the first frame. `config` replaces the persisted configuration.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Option<EditorConfig>) -> Self {
        let stored: Option<Self> = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY));
        let (stored_config, style, last_path) = match stored {
            Some(app) => (app.config, app.style, app.last_path),
            None => (EditorConfig::default(), ToolStyle::default(), String::new()),
        };
        let config = config.unwrap_or(stored_config);
        Self::with_config(config, style, last_path)
    }

    pub fn with_config(config: EditorConfig, style: ToolStyle, last_path: String) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("Stored configuration rejected, using defaults: {err}");
                EditorConfig::default()
            }
        };
        let mut canvas = Canvas::new(config.clone());
        #[cfg(not(target_arch = "wasm32"))]
        canvas.set_clipboard(Box::new(crate::clipboard::SystemClipboard::new()));
        let events = EventLog::new();
        canvas.subscribe(Box::new(events.clone()));
        canvas.subscribe(Box::new(LogHandler));
        canvas.set_style(style.clone());
        canvas.new_image();

        Self {
            config,
            style,
            last_path,
            canvas,
            input: InputHandler::new(),
            events,
            texture: None,
            texture_revision: None,
            text_entry: None,
            adjustments: None,
            status: String::new(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn report(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn open_path(&mut self, path: PathBuf) {
        match io::open_raster(&path) {
            Ok(raster) => {
                self.canvas.open_image(raster);
                self.last_path = path.display().to_string();
                self.report(format!("Opened {}", path.display()));
            }
            Err(err) => {
                log::error!("Failed to open {}: {err}", path.display());
                self.report(format!("Open failed: {err}"));
            }
        }
    }

    fn save_path(&mut self, path: PathBuf) {
        let result = self
            .canvas
            .flatten_to_image()
            .map_err(|err| err.to_string())
            .and_then(|raster| io::save_raster(&path, &raster).map_err(|err| err.to_string()));
        match result {
            Ok(()) => {
                self.last_path = path.display().to_string();
                self.report(format!("Saved {}", path.display()));
            }
            Err(err) => {
                log::error!("Failed to save {}: {err}", path.display());
                self.report(format!("Save failed: {err}"));
            }
        }
    }

    fn load_pixmap(&mut self, path: PathBuf) {
        match io::open_raster(&path) {
            Ok(raster) => {
                self.canvas.set_pixmap(Some(raster));
                self.report(format!("Pixmap loaded from {}", path.display()));
            }
            Err(err) => {
                log::warn!("Failed to load pixmap {}: {err}", path.display());
                self.report(format!("Pixmap failed: {err}"));
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path.filter(|p| io::is_image_path(p)) {
                self.open_path(path);
            } else if let Some(bytes) = file.bytes {
                match io::decode_raster(&bytes) {
                    Ok(raster) => self.canvas.open_image(raster),
                    Err(err) => self.report(format!("Dropped file ignored: {err}")),
                }
            }
        }
    }

    fn drain_canvas_events(&mut self) {
        for event in self.events.drain() {
            match event {
                CanvasEvent::TextRequested { .. } => self.text_entry = Some(String::new()),
                CanvasEvent::ColorPicked(color) => {
                    self.report(format!("Picked {:?}", color.to_array()));
                }
                CanvasEvent::ToolChanged { .. } => self.text_entry = None,
                CanvasEvent::ImageChanged { .. } => self.texture_revision = None,
                _ => {}
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        self.canvas.new_image();
                        ui.close_menu();
                    }
                    ui.horizontal(|ui| {
                        ui.label("Path:");
                        ui.text_edit_singleline(&mut self.last_path);
                    });
                    let path = PathBuf::from(self.last_path.trim());
                    if ui.button("Open").clicked() {
                        self.open_path(path.clone());
                        ui.close_menu();
                    }
                    if ui.button("Save").clicked() {
                        self.save_path(path.clone());
                        ui.close_menu();
                    }
                    if ui.button("Use as pixmap").clicked() {
                        self.load_pixmap(path);
                        ui.close_menu();
                    }
                });
                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(self.canvas.can_undo(), egui::Button::new("Undo"))
                        .clicked()
                    {
                        self.canvas.undo();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.canvas.can_redo(), egui::Button::new("Redo"))
                        .clicked()
                    {
                        self.canvas.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Paste").clicked() {
                        if let Err(err) = self.canvas.paste_from_clipboard() {
                            self.report(err.to_string());
                        }
                        ui.close_menu();
                    }
                    if ui.button("Delete selection").clicked() {
                        self.canvas.delete_selected();
                        ui.close_menu();
                    }
                });
                ui.menu_button("Image", |ui| {
                    for filter in Filter::ALL {
                        if ui.button(filter.label()).clicked() {
                            if let Err(err) = self.canvas.apply_filter(|raster| filter.apply(raster)) {
                                self.report(err.to_string());
                            }
                            ui.close_menu();
                        }
                    }
                    if ui.button("Adjustments…").clicked() {
                        self.adjustments = Some(Adjustments::default());
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Reset image").clicked() {
                        if let Err(err) = self.canvas.reset_image() {
                            self.report(err.to_string());
                        }
                        ui.close_menu();
                    }
                    if ui.button("Reset zoom").clicked() {
                        self.canvas.reset_zoom();
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn tools_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("tools_panel")
            .resizable(true)
            .default_width(180.0)
            .show(ctx, |ui| {
                ui.heading("Tools");
                let active = self.canvas.tool();
                for tool in ToolKind::ALL {
                    if ui.selectable_label(active == tool, tool.label()).clicked() {
                        log::info!("Tool selected from UI: {tool}");
                        self.canvas.set_tool(tool);
                    }
                }
                ui.separator();

                let mut style = self.canvas.style().clone();
                ui.horizontal(|ui| {
                    if ui.color_edit_button_srgba(&mut style.first_color).changed() {
                        self.canvas.set_first_color(style.first_color);
                    }
                    if ui.color_edit_button_srgba(&mut style.second_color).changed() {
                        self.canvas.set_second_color(style.second_color);
                    }
                    if ui.button("⇄").on_hover_text("Swap colors").clicked() {
                        self.canvas.swap_colors();
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Text");
                    if ui.color_edit_button_srgba(&mut style.text_color).changed() {
                        self.canvas.set_text_color(style.text_color);
                    }
                    if ui
                        .add(egui::DragValue::new(&mut style.font.size).range(4.0..=400.0).suffix(" px"))
                        .changed()
                    {
                        self.canvas.set_font(style.font.clone());
                    }
                });

                if ui
                    .add(egui::Slider::new(&mut style.brush_size, MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).text("Size"))
                    .changed()
                {
                    self.canvas.set_brush_size(style.brush_size);
                }
                let mut opacity = style.brush_opacity * 100.0;
                if ui
                    .add(egui::Slider::new(&mut opacity, 0.0..=100.0).text("Opacity"))
                    .changed()
                {
                    self.canvas.set_brush_opacity(opacity);
                }

                let pen_before = (style.pen_style, style.pen_cap, style.pen_join);
                egui::ComboBox::from_label("Pen")
                    .selected_text(format!("{:?}", style.pen_style))
                    .show_ui(ui, |ui| {
                        for pen in PEN_STYLES {
                            ui.selectable_value(&mut style.pen_style, pen, format!("{pen:?}"));
                        }
                    });
                egui::ComboBox::from_label("Cap")
                    .selected_text(format!("{:?}", style.pen_cap))
                    .show_ui(ui, |ui| {
                        for cap in CAP_STYLES {
                            ui.selectable_value(&mut style.pen_cap, cap, format!("{cap:?}"));
                        }
                    });
                egui::ComboBox::from_label("Join")
                    .selected_text(format!("{:?}", style.pen_join))
                    .show_ui(ui, |ui| {
                        for join in JOIN_STYLES {
                            ui.selectable_value(&mut style.pen_join, join, format!("{join:?}"));
                        }
                    });
                if pen_before != (style.pen_style, style.pen_cap, style.pen_join) {
                    self.canvas
                        .set_pen_style(style.pen_style, style.pen_cap, style.pen_join);
                }

                let fill_before = style.fill;
                egui::ComboBox::from_label("Fill")
                    .selected_text(fill_label(style.fill))
                    .show_ui(ui, |ui| {
                        for fill in FILL_CHOICES {
                            ui.selectable_value(&mut style.fill, fill, fill_label(fill));
                        }
                    });
                if fill_before != style.fill {
                    self.canvas.set_fill(style.fill);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(self.canvas.can_undo(), egui::Button::new("Undo"))
                        .clicked()
                    {
                        self.canvas.undo();
                    }
                    if ui
                        .add_enabled(self.canvas.can_redo(), egui::Button::new("Redo"))
                        .clicked()
                    {
                        self.canvas.redo();
                    }
                });
                let history = self.canvas.history();
                ui.label(format!(
                    "History: {}/{}",
                    history.current_index().map_or(0, |i| i + 1),
                    history.len()
                ));
            });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{:.0}%", self.canvas.viewport().zoom_percent()));
                if let Some(document) = self.canvas.document() {
                    ui.label(format!("{}x{}", document.width(), document.height()));
                    ui.label(format!("{} shapes", document.shapes().len()));
                }
                ui.label(self.canvas.tool().label());
                ui.separator();
                ui.label(&self.status);
            });
        });
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        if self.texture_revision == Some(self.canvas.revision()) {
            return;
        }
        let Some(preview) = self.canvas.render_preview() else {
            self.texture = None;
            return;
        };
        let image = ColorImage::from_rgb(
            [preview.width() as usize, preview.height() as usize],
            preview.as_raw(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST)),
        }
        self.texture_revision = Some(self.canvas.revision());
    }

    fn central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let available_size = ui.available_size();
            let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
            let canvas_rect = response.rect;
            self.canvas.set_view_size(canvas_rect.size());

            for event in self.input.process_input(ctx, canvas_rect) {
                if let EventOutcome::Abandoned(err) = self.canvas.handle_event(&event) {
                    self.status = err.to_string();
                }
            }
            self.drain_canvas_events();
            self.upload_texture(ctx);

            painter.rect_filled(canvas_rect, 0.0, Color32::from_gray(64));
            if let (Some(texture), Some(document)) = (&self.texture, self.canvas.document()) {
                let image_rect = Rect::from_min_size(
                    pos2(0.0, 0.0),
                    egui::vec2(document.width() as f32, document.height() as f32),
                );
                let view_rect = self
                    .canvas
                    .viewport()
                    .transform()
                    .rect_to_view(image_rect)
                    .translate(canvas_rect.min.to_vec2());
                painter.image(
                    texture.id(),
                    view_rect,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }

            if response.hovered() {
                ctx.set_cursor_icon(self.canvas.cursor().to_egui());
            }
        });
    }

    fn adjustments_window(&mut self, ctx: &egui::Context) {
        let Some(adjust) = self.adjustments.as_mut() else {
            return;
        };
        let mut apply = false;
        let mut cancel = false;
        egui::Window::new("Adjustments")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add(egui::Slider::new(&mut adjust.brightness, -255..=255).text("Brightness"));
                ui.add(egui::Slider::new(&mut adjust.contrast, -100.0..=100.0).text("Contrast"));
                ui.add(egui::Slider::new(&mut adjust.saturation, -100..=100).text("Saturation"));
                ui.add(egui::Slider::new(&mut adjust.hue, -180..=180).text("Hue"));
                ui.add(egui::Slider::new(&mut adjust.sharpness, 0.0..=1.0).text("Sharpness"));
                ui.add(egui::Slider::new(&mut adjust.gamma, 0.1..=10.0).logarithmic(true).text("Gamma"));
                ui.horizontal(|ui| {
                    apply |= ui
                        .add_enabled(!adjust.is_neutral(), egui::Button::new("Apply"))
                        .clicked();
                    cancel |= ui.button("Cancel").clicked();
                });
            });

        if apply {
            let adjust = self.adjustments.take().unwrap_or_default();
            if let Err(err) = self.canvas.apply_filter(|raster| adjust.apply(raster)) {
                self.report(err.to_string());
            }
        } else if cancel {
            self.adjustments = None;
        }
    }

    fn text_window(&mut self, ctx: &egui::Context) {
        let Some(text) = self.text_entry.as_mut() else {
            return;
        };
        let mut submit = false;
        let mut cancel = false;
        egui::Window::new("Add text")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let edit = ui.text_edit_singleline(text);
                edit.request_focus();
                if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                ui.horizontal(|ui| {
                    submit |= ui.button("OK").clicked();
                    cancel |= ui.button("Cancel").clicked();
                });
            });

        if submit {
            let text = self.text_entry.take().unwrap_or_default();
            if let Err(err) = self.canvas.submit_text(&text) {
                log::warn!("Text not added: {err}");
                self.report(err.to_string());
            }
        } else if cancel {
            self.text_entry = None;
            self.canvas.cancel_text();
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.style = self.canvas.style().clone();
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.menu_bar(ctx);
        self.tools_panel(ctx);
        self.status_bar(ctx);
        self.text_window(ctx);
        self.adjustments_window(ctx);
        self.central_panel(ctx);
    }
}
