use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use egui::{Color32, ColorImage, Context, TextEdit, TextureHandle, TextureOptions};
use event_bus::{EventBus, Subscription, UiEvent};
use playback::{MatchScene, MatchView, ReplayMatch};
use render_canvas::{SceneRenderer, TileCanvas};
use scaffold::dispatch::MatchSettings;
use scaffold::{logging, wrapper_script, ConsoleKind, Scaffold, ViewerConfig};
use viewport::{ContextEdge, ContextToggle, DisplayRect, DragTracker, HoverQuery, HoverState};

const STATUS_OK: Color32 = Color32::from_rgb(70, 200, 120);
const STATUS_WARN: Color32 = Color32::from_rgb(220, 190, 80);
const STATUS_ERR: Color32 = Color32::from_rgb(230, 90, 90);

const CONSOLE_OUTPUT: Color32 = Color32::from_rgb(200, 200, 200);
const CONSOLE_ERROR: Color32 = Color32::from_rgb(230, 110, 110);
const CONSOLE_BOLD: Color32 = Color32::from_rgb(240, 240, 240);

/// Autoplay cadence; every step still goes through the render-request path.
const PLAY_STEP_INTERVAL: Duration = Duration::from_millis(125);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StatusKind {
    Ok,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
struct StatusLine {
    kind: StatusKind,
    message: String,
}

impl StatusLine {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Ok,
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Warning,
            message: message.into(),
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    fn color(&self) -> Color32 {
        match self.kind {
            StatusKind::Ok => STATUS_OK,
            StatusKind::Warning => STATUS_WARN,
            StatusKind::Error => STATUS_ERR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AppTab {
    Runner,
    Game,
    Help,
}

pub struct ViewerApp {
    config: ViewerConfig,
    scaffold: Scaffold,
    active_tab: AppTab,
    root_input: String,
    root_status: StatusLine,
    team_a: Option<String>,
    team_b: Option<String>,
    java_display: Option<String>,
    selected_maps: BTreeSet<String>,
    selections_restored: bool,

    bus: EventBus,
    needs_render: Arc<AtomicBool>,
    _render_sub: Subscription,
    match_view: ReplayMatch,
    scene: SceneRenderer,
    playing: bool,
    last_auto_step: Instant,
    background_tex: Option<TextureHandle>,
    dynamic_tex: Option<TextureHandle>,
    drag: DragTracker,
    context: ContextToggle,
    hover: HoverState,
    context_held: bool,
}

impl ViewerApp {
    pub fn new() -> Self {
        let config = ViewerConfig::load();
        let scaffold = Scaffold::new(&config);
        let root_input = scaffold
            .root()
            .map(|root| root.display().to_string())
            .unwrap_or_default();
        let root_status = if scaffold.root().is_some() {
            StatusLine::ok("Scaffold root found.")
        } else {
            StatusLine::warn("No scaffold found; enter its path below.")
        };
        let bus = EventBus::new();
        let needs_render = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&needs_render);
        let render_sub = bus.subscribe(move |event| {
            if matches!(event, UiEvent::RenderRequest) {
                flag.store(true, Ordering::SeqCst);
            }
        });
        Self {
            config,
            scaffold,
            active_tab: AppTab::Runner,
            root_input,
            root_status,
            team_a: None,
            team_b: None,
            java_display: None,
            selected_maps: BTreeSet::new(),
            selections_restored: false,
            bus,
            needs_render,
            _render_sub: render_sub,
            match_view: ReplayMatch::demo(1),
            scene: SceneRenderer::new(),
            playing: false,
            last_auto_step: Instant::now(),
            background_tex: None,
            dynamic_tex: None,
            drag: DragTracker::new(),
            context: ContextToggle::new(),
            hover: HoverState::new(),
            context_held: false,
        }
    }

    pub fn frame(&mut self, ctx: &Context) {
        self.scaffold.poll(&mut self.config);
        self.restore_selections();
        self.auto_step();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(format!("Matchview {}", env!("CARGO_PKG_VERSION")));
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.active_tab, AppTab::Runner, "Runner");
                ui.selectable_value(&mut self.active_tab, AppTab::Game, "Game");
                ui.selectable_value(&mut self.active_tab, AppTab::Help, "Help");
            });
            ui.separator();
            match self.active_tab {
                AppTab::Runner => self.ui_runner(ui),
                AppTab::Game => self.ui_game(ui),
                AppTab::Help => ui_help(ui),
            }
        });
    }

    /// Saved selections can only be applied once the enumerations arrive;
    /// entries that no longer exist in the scaffold are dropped.
    fn restore_selections(&mut self) {
        if self.selections_restored || self.scaffold.players().is_empty() {
            return;
        }
        self.selections_restored = true;
        let valid = |name: &Option<String>| {
            name.as_ref()
                .filter(|name| self.scaffold.players().contains(*name))
                .cloned()
        };
        self.team_a = valid(&self.config.team_a);
        self.team_b = valid(&self.config.team_b);
        self.java_display = self
            .config
            .java_display
            .as_ref()
            .filter(|display| {
                self.scaffold
                    .javas()
                    .iter()
                    .any(|java| java.display == **display)
            })
            .cloned();
        self.selected_maps = self
            .config
            .selected_maps
            .iter()
            .filter(|map| self.scaffold.maps().contains(*map))
            .cloned()
            .collect();
    }

    fn validate_root(&mut self) {
        let trimmed = self.root_input.trim();
        if trimmed.is_empty() {
            self.root_status = StatusLine::err("Enter a scaffold root directory.");
            return;
        }
        let path = PathBuf::from(trimmed);
        if !path.is_dir() {
            self.root_status = StatusLine::err("Scaffold root is not a directory.");
            return;
        }
        if !path.join(wrapper_script()).is_file() {
            self.root_status =
                StatusLine::err(format!("{} not found in scaffold root.", wrapper_script()));
            return;
        }
        let canonical = path.canonicalize().unwrap_or(path);
        self.root_status = StatusLine::ok("Scaffold root validated.");
        self.selections_restored = false;
        self.scaffold.set_root(canonical);
    }

    fn run_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.team_a.is_none() {
            warnings.push("Select a player for team A.".to_string());
        }
        if self.team_b.is_none() {
            warnings.push("Select a player for team B.".to_string());
        }
        if self.selected_maps.is_empty() {
            warnings.push("Select at least one map.".to_string());
        }
        warnings
    }

    fn run_match(&mut self) {
        let (Some(team_a), Some(team_b)) = (self.team_a.clone(), self.team_b.clone()) else {
            return;
        };
        let java_home = self
            .java_display
            .as_ref()
            .and_then(|display| {
                self.scaffold
                    .javas()
                    .iter()
                    .find(|java| &java.display == display)
            })
            .map(|java| java.path.clone());
        let settings = MatchSettings {
            java_home,
            team_a,
            team_b,
            maps: self.selected_maps.clone(),
        };
        self.remember_selections();
        if let Err(err) = self.scaffold.run_match(&settings) {
            logging::error(format!("{}", err));
        }
    }

    fn remember_selections(&mut self) {
        self.config.team_a = self.team_a.clone();
        self.config.team_b = self.team_b.clone();
        self.config.java_display = self.java_display.clone();
        self.config.selected_maps = self.selected_maps.iter().cloned().collect();
    }

    fn ui_runner(&mut self, ui: &mut egui::Ui) {
        ui.label("Scaffold root");
        ui.horizontal(|ui| {
            let response = ui.add(TextEdit::singleline(&mut self.root_input).desired_width(420.0));
            if response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter)) {
                self.validate_root();
            }
            if ui.button("Set root").clicked() {
                self.validate_root();
            }
            if ui.button("Refresh").clicked() {
                self.selections_restored = false;
                self.scaffold.reload();
            }
            if self.scaffold.loading() {
                ui.spinner();
            }
        });
        ui.colored_label(self.root_status.color(), self.root_status.message.as_str());
        if let Some(root) = self.scaffold.root() {
            ui.small(format!("Resolved scaffold root: {}", root.display()));
        }
        ui.add_space(8.0);
        ui.separator();

        egui::ComboBox::from_label("Team A")
            .selected_text(self.team_a.clone().unwrap_or_else(|| "(none)".to_string()))
            .show_ui(ui, |ui| {
                for player in self.scaffold.players() {
                    ui.selectable_value(&mut self.team_a, Some(player.clone()), player);
                }
            });
        egui::ComboBox::from_label("Team B")
            .selected_text(self.team_b.clone().unwrap_or_else(|| "(none)".to_string()))
            .show_ui(ui, |ui| {
                for player in self.scaffold.players() {
                    ui.selectable_value(&mut self.team_b, Some(player.clone()), player);
                }
            });
        egui::ComboBox::from_label("Java install")
            .selected_text(
                self.java_display
                    .clone()
                    .unwrap_or_else(|| "(system default)".to_string()),
            )
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.java_display, None, "(system default)");
                for java in self.scaffold.javas() {
                    ui.selectable_value(
                        &mut self.java_display,
                        Some(java.display.clone()),
                        &java.display,
                    );
                }
            });
        ui.add_space(4.0);
        ui.label(format!("Maps ({} selected)", self.selected_maps.len()));
        egui::ScrollArea::vertical()
            .id_source("map_picker")
            .max_height(140.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for map in self.scaffold.maps() {
                    let mut selected = self.selected_maps.contains(map);
                    if ui.checkbox(&mut selected, map).changed() {
                        if selected {
                            self.selected_maps.insert(map.clone());
                        } else {
                            self.selected_maps.remove(map);
                        }
                    }
                }
            });

        ui.add_space(8.0);
        let warnings = self.run_warnings();
        let can_run = self.scaffold.root().is_some()
            && warnings.is_empty()
            && !self.scaffold.match_running();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_run, egui::Button::new("Run Match"))
                .clicked()
            {
                self.run_match();
            }
            if ui
                .add_enabled(self.scaffold.match_running(), egui::Button::new("Kill"))
                .clicked()
            {
                self.scaffold.kill_match();
            }
            if self.scaffold.match_running() {
                ui.colored_label(STATUS_OK, "Match running.");
            }
        });
        for warning in warnings {
            ui.colored_label(STATUS_WARN, warning);
        }
        ui.add_space(6.0);
        ui.separator();
        ui.label(format!("Console ({} lines)", self.scaffold.console().len()));
        egui::ScrollArea::vertical()
            .id_source("match_console")
            .max_height(240.0)
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in self.scaffold.console().iter() {
                    let text = egui::RichText::new(&line.content).monospace();
                    let text = match line.kind {
                        ConsoleKind::Output => text.color(CONSOLE_OUTPUT),
                        ConsoleKind::Error => text.color(CONSOLE_ERROR),
                        ConsoleKind::Bold => text.color(CONSOLE_BOLD).strong(),
                    };
                    ui.add(egui::Label::new(text).wrap());
                }
            });
    }

    fn step_turn(&mut self, delta: i32) {
        self.match_view.step_turn(delta);
        let turn = self.match_view.current_turn().turn_number();
        self.bus.publish(&UiEvent::TurnProgress { turn });
        self.bus.publish(&UiEvent::RenderRequest);
    }

    fn auto_step(&mut self) {
        if !self.playing {
            return;
        }
        if self.last_auto_step.elapsed() < PLAY_STEP_INTERVAL {
            return;
        }
        self.last_auto_step = Instant::now();
        let before = self.match_view.current_turn().turn_number();
        self.step_turn(1);
        if self.match_view.current_turn().turn_number() == before {
            self.playing = false;
        }
    }

    fn ui_game(&mut self, ui: &mut egui::Ui) {
        let turn = self.match_view.current_turn().turn_number();
        let turn_count = self.match_view.turn_count();
        ui.horizontal(|ui| {
            if ui.button("|<").clicked() {
                self.step_turn(-(turn_count as i32));
            }
            if ui.button("< Prev").clicked() {
                self.step_turn(-1);
            }
            let play_label = if self.playing { "Pause" } else { "Play" };
            if ui.button(play_label).clicked() {
                self.playing = !self.playing;
                self.last_auto_step = Instant::now();
            }
            if ui.button("Next >").clicked() {
                self.step_turn(1);
            }
            ui.label(format!("Turn {} / {}", turn, turn_count.saturating_sub(1)));
        });
        ui.separator();

        if self.needs_render.swap(false, Ordering::SeqCst) {
            let match_changed = self.scene.render(&MatchScene(&self.match_view));
            self.upload_layers(ui.ctx(), match_changed);
        }

        let dims = self.scene.dims();
        if dims.tile_count() == 0 {
            ui.label("No match loaded.");
            return;
        }
        let aspect = dims.height as f32 / dims.width as f32;
        let available = ui.available_size();
        let width = available.x.min((available.y - 8.0).max(64.0) / aspect);
        let size = egui::vec2(width, width * aspect);
        let (response, painter) =
            ui.allocate_painter(size, egui::Sense::click_and_drag());
        let rect = response.rect;
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        if let Some(tex) = &self.background_tex {
            painter.image(tex.id(), rect, uv, Color32::WHITE);
        }
        if let Some(tex) = &self.dynamic_tex {
            painter.image(tex.id(), rect, uv, Color32::WHITE);
        }

        self.handle_pointer(ui, &response, &painter);
    }

    fn upload_layers(&mut self, ctx: &Context, match_changed: bool) {
        if match_changed || self.background_tex.is_none() {
            let image = canvas_image(self.scene.background());
            self.background_tex =
                Some(ctx.load_texture("board_background", image, TextureOptions::NEAREST));
        }
        let image = canvas_image(self.scene.dynamic());
        match &mut self.dynamic_tex {
            Some(tex) if !match_changed => tex.set(image, TextureOptions::NEAREST),
            slot => *slot = Some(ctx.load_texture("board_dynamic", image, TextureOptions::NEAREST)),
        }
    }

    fn handle_pointer(
        &mut self,
        ui: &mut egui::Ui,
        response: &egui::Response,
        painter: &egui::Painter,
    ) {
        let rect = response.rect;
        let display = DisplayRect::new(rect.left(), rect.top(), rect.width(), rect.height());
        let dims = self.scene.dims();
        let mapper = viewport::TileMapper::new(dims);

        let primary_down = ui.input(|input| input.pointer.primary_down());
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.drag.press();
        }
        if !primary_down {
            self.drag.release();
        }
        if self.drag.is_dragging() {
            if let Some(pos) = ui.input(|input| input.pointer.latest_pos()) {
                let tile = mapper.tile_at(pos.x, pos.y, display);
                if let Some(tile) = self.drag.motion(tile) {
                    self.bus.publish(&UiEvent::TileDrag { tile });
                }
            }
        }

        let hover_pos = response.hover_pos();
        let query = hover_pos.map(|pos| {
            HoverQuery::compute(
                (pos.x, pos.y),
                display,
                (rect.left(), rect.top()),
                dims,
            )
        });

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let tile = mapper.tile_at(pos.x, pos.y, display);
                self.bus.publish(&UiEvent::TileClick { tile });
            }
            let hovered = query
                .as_ref()
                .and_then(|query| query.hovered_body(self.match_view.current_turn().bodies()));
            self.hover.on_click(hovered);
        }

        let secondary_down =
            response.hovered() && ui.input(|input| input.pointer.secondary_down());
        if let Some(edge) = self.context.observe(secondary_down) {
            self.context_held = edge == ContextEdge::Pressed;
            self.bus.publish(&UiEvent::ContextPress {
                pressed: self.context_held,
            });
        }

        let Some(query) = query else {
            if let Some(body) = self.hover.clicked() {
                tooltip_panel(painter, rect.left_top(), (4.0, 4.0), &body.summary);
            }
            return;
        };
        if query.visible {
            let anchor = egui::Rect::from_min_size(
                rect.left_top() + egui::vec2(query.anchor.left, query.anchor.top),
                egui::vec2(query.anchor.width, query.anchor.height),
            );
            painter.rect_stroke(
                anchor,
                egui::Rounding::ZERO,
                egui::Stroke::new(1.5, Color32::from_rgb(255, 60, 60)),
            );
        }
        let hovered = query.hovered_body(self.match_view.current_turn().bodies());
        let shown = hovered.or_else(|| self.hover.clicked().cloned());
        if let Some(body) = shown {
            tooltip_panel(
                painter,
                rect.left_top(),
                query.anchor.popup_origin(),
                &body.summary,
            );
        }
    }

    pub fn shutdown(&mut self) {
        self.scaffold.kill_match();
        self.remember_selections();
        if let Err(err) = self.config.save() {
            logging::warn(format!("config save failed on exit: {}", err));
        }
    }
}

impl Default for ViewerApp {
    fn default() -> Self {
        Self::new()
    }
}

fn tooltip_panel(
    painter: &egui::Painter,
    canvas_origin: egui::Pos2,
    offset: (f32, f32),
    summary: &str,
) {
    let origin = canvas_origin + egui::vec2(offset.0, offset.1);
    let galley = painter.layout_no_wrap(
        summary.to_string(),
        egui::FontId::monospace(12.0),
        Color32::WHITE,
    );
    let padding = egui::vec2(6.0, 4.0);
    let panel = egui::Rect::from_min_size(origin, galley.size() + padding * 2.0);
    painter.rect_filled(panel, 3.0, Color32::from_rgba_unmultiplied(20, 20, 20, 230));
    painter.galley(origin + padding, galley, Color32::WHITE);
}

fn canvas_image(canvas: &TileCanvas) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [canvas.width_px() as usize, canvas.height_px() as usize],
        canvas.as_rgba(),
    )
}

fn ui_help(ui: &mut egui::Ui) {
    ui.label("Runner tab");
    ui.small("Point the viewer at a scaffold checkout, pick two players and at least one map, then Run Match. Output streams into the console; Kill stops the run.");
    ui.add_space(6.0);
    ui.label("Game tab");
    ui.small("Step or autoplay through the turns of the loaded match. Hover a tile to inspect the body on it; click to pin its panel, click empty ground to clear. Drag paints one notification per tile crossed.");
}
