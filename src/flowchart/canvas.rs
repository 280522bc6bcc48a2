//! Interactive Flowchart Canvas
//!
//! Native egui rendering of the current flowchart with:
//! - Node dragging and drag-to-connect from a node's handle
//! - Pan (secondary/middle drag) and zoom (mouse wheel)
//! - Vertical/horizontal orientation toggle
//! - Export menu
//!
//! The canvas edits a working copy of the store's graph. The copy is
//! replaced whenever the store revision moves on, i.e. after every new
//! generation.

use eframe::egui::{
    self, Align2, Color32, FontId, Painter, PointerButton, Pos2, Rect, Sense, Stroke, Vec2,
};
use uuid::Uuid;

use super::graph::{FlowEdge, FlowNode, Graph};
use super::layout::{apply_orientation, Orientation};
use super::store::GraphStore;
use super::surface::{edge_endpoints, node_rect, RenderSurface, SURFACE_PADDING};
use super::theme::CanvasTheme;
use crate::commands::Command;
use crate::error::Result;
use crate::export::ExportFormat;

/// Radius of the connection handle, in diagram units
const HANDLE_RADIUS: f32 = 4.0;
/// Pointer tolerance around the handle
const HANDLE_HIT_RADIUS: f32 = 9.0;

/// Main flowchart canvas widget
pub struct FlowchartCanvas {
    /// Local working copy of the store's graph
    working: Graph,

    /// Store revision the working copy was taken from
    synced_revision: Option<u64>,

    /// Current layout orientation
    orientation: Orientation,

    /// Theme for rendering
    pub theme: CanvasTheme,

    /// Current pan offset
    pub pan: Vec2,

    /// Current zoom level (1.0 = 100%)
    pub zoom: f32,

    pub min_zoom: f32,
    pub max_zoom: f32,

    /// Whether to show the dotted background
    pub show_grid: bool,

    /// Grid spacing in diagram units
    pub grid_size: f32,

    pub show_minimap: bool,

    /// Refit the view on the next frame
    needs_fit: bool,

    /// Node currently being dragged
    dragging_node: Option<String>,

    /// Source node of a connection being drawn
    connecting_from: Option<String>,

    /// Node under the pointer
    hovered_node: Option<String>,
}

impl Default for FlowchartCanvas {
    fn default() -> Self {
        Self::new(CanvasTheme::default())
    }
}

impl FlowchartCanvas {
    pub fn new(theme: CanvasTheme) -> Self {
        Self {
            working: Graph::new(),
            synced_revision: None,
            orientation: Orientation::default(),
            theme,
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 4.0,
            show_grid: true,
            grid_size: 12.0,
            show_minimap: true,
            needs_fit: true,
            dragging_node: None,
            connecting_from: None,
            hovered_node: None,
        }
    }

    /// Pick up a new generation result if the store has one.
    ///
    /// Returns true when the working copy was replaced.
    pub fn sync_from(&mut self, store: &GraphStore) -> bool {
        if self.synced_revision == Some(store.revision()) {
            return false;
        }
        self.working = store.graph().clone();
        self.synced_revision = Some(store.revision());
        self.dragging_node = None;
        self.connecting_from = None;
        self.hovered_node = None;
        self.needs_fit = true;
        log::debug!(
            "Canvas resynced to revision {} ({} nodes)",
            store.revision(),
            self.working.nodes.len()
        );
        true
    }

    pub fn working_graph(&self) -> &Graph {
        &self.working
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Move a node by `delta` diagram units
    pub fn drag_node(&mut self, id: &str, delta: Vec2) -> bool {
        match self.working.node_mut(id) {
            Some(node) => {
                node.position.x += delta.x as f64;
                node.position.y += delta.y as f64;
                true
            }
            None => false,
        }
    }

    /// Append a user-drawn edge. Self loops and duplicates are allowed; both
    /// endpoints must exist.
    pub fn connect(&mut self, source: &str, target: &str) -> Option<String> {
        if !self.working.contains_node(source) || !self.working.contains_node(target) {
            log::warn!("Ignoring connection {} -> {}: unknown node", source, target);
            return None;
        }
        let id = format!("edge_{}", Uuid::new_v4().simple());
        self.working
            .edges
            .push(FlowEdge::new(id.clone(), source, target));
        Some(id)
    }

    /// Flip the orientation and reposition every node for it
    pub fn toggle_orientation(&mut self) -> Orientation {
        self.orientation = self.orientation.toggled();
        apply_orientation(&mut self.working, self.orientation);
        self.needs_fit = true;
        self.orientation
    }

    /// Snapshot what is currently drawn, for export
    pub fn capture_surface(&self) -> Result<RenderSurface> {
        RenderSurface::capture(&self.working, &self.theme)
    }

    /// Fit the diagram to the view on the next frame
    pub fn fit_to_view(&mut self) {
        self.needs_fit = true;
    }

    /// Main UI function. Returns the commands produced by this frame.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Vec<Command> {
        let mut commands = Vec::new();

        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
        let rect = response.rect;

        if self.needs_fit {
            self.fit_rect(rect);
            self.needs_fit = false;
        }

        painter.rect_filled(rect, 0.0, self.theme.canvas_bg);
        if self.show_grid {
            self.draw_grid(&painter, rect);
        }

        self.handle_input(ui, &response, &mut commands);

        let transform = self.get_transform(rect);

        // Draw edges first (behind nodes)
        for edge in &self.working.edges {
            self.draw_edge(&painter, edge, &transform);
        }
        for node in &self.working.nodes {
            self.draw_node(&painter, node, &transform);
        }

        if let Some(source) = self.connecting_from.as_ref().and_then(|id| self.working.node(id)) {
            if let Some(pointer) = ui.input(|i| i.pointer.latest_pos()) {
                let from = transform.to_screen(self.handle_pos(&node_rect(source)));
                painter.line_segment(
                    [from, pointer],
                    Stroke::new(1.5, self.theme.node_selected),
                );
            }
        }

        if self.working.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Generate a flowchart to get started",
                FontId::proportional(16.0),
                self.theme.edge_color,
            );
        } else {
            self.draw_toolbar(ui, rect, &mut commands);
            if self.show_minimap {
                self.draw_minimap(&painter, rect);
            }
        }

        if !ui.is_enabled() {
            commands.clear();
        }
        commands
    }

    /// Handle user input
    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        commands: &mut Vec<Command>,
    ) {
        let rect = response.rect;

        // Zoom with scroll wheel
        if response.hovered() {
            let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll_delta != 0.0 {
                let zoom_delta = 1.0 + scroll_delta * 0.001;
                self.zoom = (self.zoom * zoom_delta).clamp(self.min_zoom, self.max_zoom);
            }
        }

        // Pan with middle mouse or right mouse
        if response.dragged_by(PointerButton::Middle)
            || response.dragged_by(PointerButton::Secondary)
        {
            self.pan += response.drag_delta();
        }

        let transform = self.get_transform(rect);
        self.hovered_node = response
            .hover_pos()
            .and_then(|pos| self.node_at(transform.to_world(pos)))
            .map(|node| node.id.clone());

        if response.drag_started_by(PointerButton::Primary) {
            if let Some(world) = response.interact_pointer_pos().map(|p| transform.to_world(p)) {
                if let Some(source) = self.handle_at(world) {
                    self.connecting_from = Some(source);
                } else if let Some(node) = self.node_at(world) {
                    self.dragging_node = Some(node.id.clone());
                }
            }
        }

        if response.dragged_by(PointerButton::Primary) {
            if let Some(ref dragging) = self.dragging_node {
                let delta = response.drag_delta() / self.zoom;
                if delta != Vec2::ZERO {
                    commands.push(Command::DragNode {
                        id: dragging.clone(),
                        delta,
                    });
                }
            }
        }

        if response.drag_stopped() {
            if let Some(source) = self.connecting_from.take() {
                let released = ui.input(|i| i.pointer.latest_pos());
                if let Some(target) = released.and_then(|p| self.node_at(transform.to_world(p))) {
                    commands.push(Command::Connect {
                        source,
                        target: target.id.clone(),
                    });
                }
            }
            self.dragging_node = None;
        }

        // Keyboard shortcuts
        if response.hovered() && ui.is_enabled() {
            ui.input(|i| {
                if i.key_pressed(egui::Key::F) {
                    self.needs_fit = true;
                }
                if i.key_pressed(egui::Key::G) {
                    self.show_grid = !self.show_grid;
                }
                if i.key_pressed(egui::Key::M) {
                    self.show_minimap = !self.show_minimap;
                }
            });
        }
    }

    /// Topmost node containing `world`
    fn node_at(&self, world: Pos2) -> Option<&FlowNode> {
        self.working
            .nodes
            .iter()
            .rev()
            .find(|node| node_rect(node).contains(world))
    }

    /// Node whose connection handle is under `world`
    fn handle_at(&self, world: Pos2) -> Option<String> {
        let hit = HANDLE_HIT_RADIUS / self.zoom.max(0.5);
        self.working
            .nodes
            .iter()
            .rev()
            .find(|node| self.handle_pos(&node_rect(node)).distance(world) <= hit)
            .map(|node| node.id.clone())
    }

    /// Outgoing connection handle: bottom for vertical, right for horizontal
    fn handle_pos(&self, rect: &Rect) -> Pos2 {
        match self.orientation {
            Orientation::Vertical => rect.center_bottom(),
            Orientation::Horizontal => rect.right_center(),
        }
    }

    fn graph_bounds(&self) -> Option<Rect> {
        self.working
            .nodes
            .iter()
            .map(node_rect)
            .reduce(|acc, r| acc.union(r))
    }

    fn fit_rect(&mut self, rect: Rect) {
        let Some(bounds) = self.graph_bounds() else {
            self.pan = Vec2::ZERO;
            self.zoom = 1.0;
            return;
        };
        let bounds = bounds.expand(SURFACE_PADDING);
        let zoom = (rect.width() / bounds.width()).min(rect.height() / bounds.height());
        self.zoom = zoom.clamp(self.min_zoom, 1.5);
        self.pan = -bounds.center().to_vec2() * self.zoom;
    }

    /// Get the transformation for world -> screen coordinates
    fn get_transform(&self, rect: Rect) -> Transform {
        Transform {
            offset: rect.center().to_vec2() + self.pan,
            zoom: self.zoom,
        }
    }

    /// Dotted background
    fn draw_grid(&self, painter: &Painter, rect: Rect) {
        let spacing = self.grid_size * self.zoom;
        if spacing < 4.0 {
            return;
        }
        let origin = rect.center() + self.pan;
        let start_x = rect.min.x + (origin.x - rect.min.x).rem_euclid(spacing);
        let start_y = rect.min.y + (origin.y - rect.min.y).rem_euclid(spacing);

        let mut x = start_x;
        while x < rect.max.x {
            let mut y = start_y;
            while y < rect.max.y {
                painter.circle_filled(Pos2::new(x, y), 0.8, self.theme.grid_color);
                y += spacing;
            }
            x += spacing;
        }
    }

    fn draw_node(&self, painter: &Painter, node: &FlowNode, transform: &Transform) {
        let rect = transform.transform_rect(node_rect(node));
        let paint = self.theme.paint_for(node);

        let stroke_color = if self.dragging_node.as_deref() == Some(node.id.as_str()) {
            self.theme.node_selected
        } else if self.hovered_node.as_deref() == Some(node.id.as_str()) {
            self.theme.node_hover
        } else {
            paint.stroke
        };

        painter.rect(
            rect,
            paint.rounding * self.zoom,
            paint.fill,
            Stroke::new(paint.stroke_width * self.zoom.max(0.5), stroke_color),
        );
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            node.label(),
            FontId::proportional(12.0 * self.zoom),
            paint.text,
        );

        let handle = transform.to_screen(self.handle_pos(&node_rect(node)));
        painter.circle_filled(handle, HANDLE_RADIUS * self.zoom, self.theme.handle);
    }

    fn draw_edge(&self, painter: &Painter, edge: &FlowEdge, transform: &Transform) {
        let (Some(from_node), Some(to_node)) =
            (self.working.node(&edge.source), self.working.node(&edge.target))
        else {
            return;
        };

        let (start, end) = edge_endpoints(&node_rect(from_node), &node_rect(to_node));
        let start = transform.to_screen(start);
        let end = transform.to_screen(end);
        let stroke = Stroke::new(1.5, self.theme.edge_color);

        if edge.source == edge.target {
            let reach = 40.0 * self.zoom;
            let points = [
                start,
                start + Vec2::new(reach, 0.0),
                end + Vec2::new(0.0, -reach),
                end,
            ];
            painter.add(egui::epaint::CubicBezierShape::from_points_stroke(
                points,
                false,
                Color32::TRANSPARENT,
                stroke,
            ));
            self.draw_arrow(painter, points[2], end);
            return;
        }

        if edge.is_animated() {
            painter.extend(egui::Shape::dashed_line(
                &[start, end],
                stroke,
                5.0 * self.zoom,
                5.0 * self.zoom,
            ));
        } else {
            painter.line_segment([start, end], stroke);
        }
        self.draw_arrow(painter, start, end);

        if let Some(ref label) = edge.label {
            painter.text(
                start.lerp(end, 0.5),
                Align2::CENTER_CENTER,
                label,
                FontId::proportional(10.0 * self.zoom),
                self.theme.edge_color,
            );
        }
    }

    /// Draw an arrowhead at `to`
    fn draw_arrow(&self, painter: &Painter, from: Pos2, to: Pos2) {
        let dir = (from - to).normalized();
        let size = 10.0 * self.zoom;
        let angle: f32 = 0.4; // ~25 degrees

        let left = to
            + Vec2::new(
                dir.x * angle.cos() - dir.y * angle.sin(),
                dir.x * angle.sin() + dir.y * angle.cos(),
            ) * size;
        let right = to
            + Vec2::new(
                dir.x * angle.cos() + dir.y * angle.sin(),
                -dir.x * angle.sin() + dir.y * angle.cos(),
            ) * size;

        painter.add(egui::Shape::convex_polygon(
            vec![to, left, right],
            self.theme.edge_color,
            Stroke::NONE,
        ));
    }

    /// Orientation button and export menu, top-right corner
    fn draw_toolbar(&mut self, ui: &egui::Ui, rect: Rect, commands: &mut Vec<Command>) {
        let ctx = ui.ctx().clone();
        let orientation = self.orientation;
        // The toolbar lives in its own layer and does not inherit the parent's state
        let enabled = ui.is_enabled();
        let mut refit = false;

        egui::Area::new(ui.id().with("flowchart_toolbar"))
            .order(egui::Order::Foreground)
            .pivot(Align2::RIGHT_TOP)
            .fixed_pos(Pos2::new(rect.max.x - 16.0, rect.min.y + 16.0))
            .show(&ctx, |ui| {
                if !enabled {
                    ui.disable();
                }
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if ui
                            .button(format!("⇅ {}", orientation.label()))
                            .on_hover_text("Change Orientation")
                            .clicked()
                        {
                            commands.push(Command::ToggleOrientation);
                        }

                        ui.menu_button("⬇ Export ⏷", |ui| {
                            for format in ExportFormat::all() {
                                if ui.button(format.menu_label()).clicked() {
                                    commands.push(Command::Export(*format));
                                    ui.close_menu();
                                }
                            }
                        });

                        if ui.small_button("⊞").on_hover_text("Fit to view (F)").clicked() {
                            refit = true;
                        }
                        ui.label(format!("{:.0}%", self.zoom * 100.0));
                    });
                });
            });

        if refit {
            self.needs_fit = true;
        }
    }

    fn draw_minimap(&self, painter: &Painter, rect: Rect) {
        let Some(bounds) = self.graph_bounds() else {
            return;
        };
        let minimap_size = Vec2::new(150.0, 100.0);
        let minimap_rect = Rect::from_min_size(
            Pos2::new(
                rect.max.x - minimap_size.x - 10.0,
                rect.max.y - minimap_size.y - 10.0,
            ),
            minimap_size,
        );

        painter.rect_filled(minimap_rect, 4.0, self.theme.minimap_bg);
        painter.rect_stroke(minimap_rect, 4.0, Stroke::new(1.0, self.theme.edge_color));

        let inner = minimap_rect.shrink(10.0);
        let scale = if bounds.width() > 0.0 && bounds.height() > 0.0 {
            (inner.width() / bounds.width()).min(inner.height() / bounds.height())
        } else {
            1.0
        };

        for node in &self.working.nodes {
            let r = node_rect(node);
            let offset = r.min - bounds.min;
            let mini = Rect::from_min_size(inner.min + offset * scale, r.size() * scale);
            painter.rect_filled(mini, 1.0, self.theme.paint_for(node).fill);
            painter.rect_stroke(mini, 1.0, Stroke::new(0.5, self.theme.node_stroke));
        }

        // Viewport indicator
        let transform = self.get_transform(rect);
        let visible =
            Rect::from_min_max(transform.to_world(rect.min), transform.to_world(rect.max));
        let viewport = Rect::from_min_size(
            inner.min + (visible.min - bounds.min) * scale,
            visible.size() * scale,
        )
        .intersect(minimap_rect);
        painter.rect_stroke(viewport, 0.0, Stroke::new(1.0, self.theme.node_selected));
    }
}

/// Coordinate transformation helper
struct Transform {
    offset: Vec2,
    zoom: f32,
}

impl Transform {
    fn to_screen(&self, world: Pos2) -> Pos2 {
        Pos2::new(
            world.x * self.zoom + self.offset.x,
            world.y * self.zoom + self.offset.y,
        )
    }

    fn to_world(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.offset.x) / self.zoom,
            (screen.y - self.offset.y) / self.zoom,
        )
    }

    fn transform_rect(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(rect.min), self.to_screen(rect.max))
    }
}
