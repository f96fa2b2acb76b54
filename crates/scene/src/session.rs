//! Multi-click drawing sessions for linear features.
//!
//! One generic state machine, three independent instances (road/wall/water)
//! so point streams never intermix. A session is Idle while its point buffer
//! is empty and Drawing otherwise; finishing or canceling always returns to
//! Idle — there is no persistent finished state.

use bevy::prelude::*;

use crate::config::{CELL_SIZE, CURVE_BULGE_FACTOR, DOUBLE_CLICK_WINDOW_MS};
use crate::objects::{style_for, LinearFeature, LinearKind, ObjectId, SceneObject};
use crate::path::{round2, PathPoint};
use crate::store::ObjectStore;

/// Per-kind drawing rules.
#[derive(Debug, Clone, Copy)]
pub struct ToolConfig {
    pub kind: LinearKind,
    pub min_points: usize,
    pub allow_curves: bool,
    pub default_variant: &'static str,
}

impl ToolConfig {
    pub fn for_kind(kind: LinearKind) -> Self {
        Self {
            kind,
            min_points: kind.min_points(),
            allow_curves: kind != LinearKind::Water,
            default_variant: kind.default_variant(),
        }
    }
}

/// A completed stroke, ready to be materialized into a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedStroke {
    pub kind: LinearKind,
    pub points: Vec<PathPoint>,
    pub variant: String,
    pub width: f32,
}

impl FinishedStroke {
    /// Build the feature, filling elevation and thickness from the
    /// per-variant defaults table.
    pub fn into_feature(self, id: ObjectId) -> LinearFeature {
        let style = style_for(self.kind, &self.variant);
        LinearFeature {
            id,
            kind: self.kind,
            points: self.points,
            variant: self.variant,
            width: self.width,
            elevation: style.elevation,
            thickness: style.thickness,
        }
    }
}

/// Outcome of feeding one click into a session.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Point appended; the session is (now) drawing.
    Appended,
    /// A double click or finish key completed the stroke.
    Finished(FinishedStroke),
    /// Non-finite coordinates, or a finish attempt below the minimum point
    /// count. Deliberately a no-op, never an extra point.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct DrawingSession {
    pub config: ToolConfig,
    pub points: Vec<PathPoint>,
    pub last_click_ms: Option<f64>,
    pub variant: String,
    pub width: f32,
    pub snap_to_grid: bool,
}

impl DrawingSession {
    pub fn new(kind: LinearKind) -> Self {
        let config = ToolConfig::for_kind(kind);
        let style = style_for(kind, config.default_variant);
        Self {
            config,
            points: Vec::new(),
            last_click_ms: None,
            variant: config.default_variant.to_string(),
            width: style.width,
            snap_to_grid: false,
        }
    }

    pub fn is_drawing(&self) -> bool {
        !self.points.is_empty()
    }

    /// Process a click at a world position. `now_ms` is the event timestamp;
    /// the double-click window is a pure function of two timestamps, not a
    /// scheduled callback.
    pub fn handle_click(&mut self, world: Vec2, now_ms: f64) -> ClickOutcome {
        if !world.is_finite() {
            warn!("rejecting {:?} click at non-finite {world}", self.config.kind);
            return ClickOutcome::Ignored;
        }

        let is_double = self
            .last_click_ms
            .is_some_and(|t| now_ms - t < DOUBLE_CLICK_WINDOW_MS);
        if is_double {
            return self.finish();
        }

        let mut world = world;
        if self.snap_to_grid {
            world = (world / CELL_SIZE).round() * CELL_SIZE;
        }
        self.points.push(PathPoint {
            position: round2(world),
            control: None,
        });
        self.last_click_ms = Some(now_ms);
        ClickOutcome::Appended
    }

    /// Finish explicitly (Enter key) or via double click. Below the minimum
    /// point count this is a no-op and the buffer is kept.
    pub fn finish(&mut self) -> ClickOutcome {
        if self.points.len() < self.config.min_points {
            return ClickOutcome::Ignored;
        }
        let stroke = FinishedStroke {
            kind: self.config.kind,
            points: std::mem::take(&mut self.points),
            variant: self.variant.clone(),
            width: self.width,
        };
        self.last_click_ms = None;
        ClickOutcome::Finished(stroke)
    }

    /// Remove the last point; an empty buffer means the session is Idle
    /// again. Safe to call on an idle session. The double-click timestamp is
    /// cleared so the next click never pairs with a click from before the
    /// undo.
    pub fn undo_point(&mut self) {
        self.points.pop();
        self.last_click_ms = None;
    }

    /// Discard everything and return to Idle unconditionally.
    pub fn cancel(&mut self) {
        self.points.clear();
        self.last_click_ms = None;
    }

    /// Retroactively bend the most recently completed span: attaches a
    /// control point to the second-to-last point at the span midpoint,
    /// displaced along the span's perpendicular by 30% of the span length.
    pub fn curve_last_span(&mut self) -> bool {
        if !self.config.allow_curves || self.points.len() < 2 {
            return false;
        }
        let n = self.points.len();
        let a = self.points[n - 2].position;
        let b = self.points[n - 1].position;
        let span = b - a;
        let len = span.length();
        if len <= f32::EPSILON {
            return false;
        }
        let perp = Vec2::new(-span.y, span.x) / len;
        self.points[n - 2].control = Some(a + span * 0.5 + perp * (len * CURVE_BULGE_FACTOR));
        true
    }

    /// Switch variant mid-stroke. Width follows the new variant's default;
    /// accumulated points are untouched.
    pub fn set_variant(&mut self, variant: &str) {
        self.variant = variant.to_string();
        self.width = style_for(self.config.kind, variant).width;
    }

    pub fn set_width(&mut self, width: f32) {
        if width > 0.0 {
            self.width = width;
        }
    }
}

/// Which placement tool receives clicks. The UI gates tool switching, so at
/// most one session is ever fed per feature kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Resource)]
pub enum ActiveTool {
    #[default]
    Inspect,
    DrawRoad,
    DrawWall,
    DrawWater,
    PlaceBuilding,
    PlaceTree,
}

impl ActiveTool {
    pub fn linear_kind(self) -> Option<LinearKind> {
        match self {
            ActiveTool::DrawRoad => Some(LinearKind::Road),
            ActiveTool::DrawWall => Some(LinearKind::Wall),
            ActiveTool::DrawWater => Some(LinearKind::Water),
            _ => None,
        }
    }
}

/// The three independent sessions, one per feature kind.
#[derive(Resource)]
pub struct DrawingSessions {
    pub road: DrawingSession,
    pub wall: DrawingSession,
    pub water: DrawingSession,
}

impl Default for DrawingSessions {
    fn default() -> Self {
        Self {
            road: DrawingSession::new(LinearKind::Road),
            wall: DrawingSession::new(LinearKind::Wall),
            water: DrawingSession::new(LinearKind::Water),
        }
    }
}

impl DrawingSessions {
    pub fn session(&self, kind: LinearKind) -> &DrawingSession {
        match kind {
            LinearKind::Road => &self.road,
            LinearKind::Wall => &self.wall,
            LinearKind::Water => &self.water,
        }
    }

    pub fn session_mut(&mut self, kind: LinearKind) -> &mut DrawingSession {
        match kind {
            LinearKind::Road => &mut self.road,
            LinearKind::Wall => &mut self.wall,
            LinearKind::Water => &mut self.water,
        }
    }
}

/// A normalized ground-plane click delivered by the input layer.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlacementClick {
    pub world: Vec2,
}

/// Session commands delivered by the input layer while drawing.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Finish,
    UndoPoint,
    Cancel,
    CurveLastSpan,
    SetVariant(String),
    SetWidth(f32),
    SetGridSnap(bool),
}

/// Feed clicks and commands to the active session, in arrival order, and
/// commit finished strokes to the object store.
pub fn handle_session_input(
    mut clicks: EventReader<PlacementClick>,
    mut session_commands: EventReader<SessionCommand>,
    tool: Res<ActiveTool>,
    time: Res<Time<Real>>,
    mut sessions: ResMut<DrawingSessions>,
    mut store: ResMut<ObjectStore>,
) {
    let Some(kind) = tool.linear_kind() else {
        clicks.clear();
        session_commands.clear();
        return;
    };

    let now_ms = time.elapsed_secs_f64() * 1000.0;

    for click in clicks.read() {
        let outcome = sessions.session_mut(kind).handle_click(click.world, now_ms);
        if let ClickOutcome::Finished(stroke) = outcome {
            commit_stroke(stroke, &mut store);
        }
    }

    for command in session_commands.read() {
        let session = sessions.session_mut(kind);
        match command {
            SessionCommand::Finish => {
                if let ClickOutcome::Finished(stroke) = session.finish() {
                    commit_stroke(stroke, &mut store);
                }
            }
            SessionCommand::UndoPoint => session.undo_point(),
            SessionCommand::Cancel => session.cancel(),
            SessionCommand::CurveLastSpan => {
                session.curve_last_span();
            }
            SessionCommand::SetVariant(variant) => session.set_variant(variant),
            SessionCommand::SetWidth(width) => session.set_width(*width),
            SessionCommand::SetGridSnap(on) => session.snap_to_grid = *on,
        }
    }
}

fn commit_stroke(stroke: FinishedStroke, store: &mut ObjectStore) {
    let id = store.allocate_id();
    let feature = stroke.into_feature(id);
    info!(
        "placed {:?} '{}' with {} point(s)",
        feature.kind,
        feature.variant,
        feature.points.len()
    );
    store.add_object(SceneObject::Linear(feature));
}
