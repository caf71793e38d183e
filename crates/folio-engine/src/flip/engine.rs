//! Gesture-driven page-flip session.
//!
//! [`PageFlip`] turns finger samples into a fold pose, keeps the mesh and
//! shadow strips in sync with it, runs the settle animation after release and
//! commits the texture swap once a turn completes.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::time::Duration;

use crate::coords::Vec2;
use crate::paint::Color;

use super::config::{CompletionThreshold, FlipConfig, ShadowSpec};
use super::geometry::{FoldGeometry, compute_fold, constrain_touch, max_curl_tan};
use super::layout::{Page, PageLayout, PageSide, SurfaceConfig};
use super::mesh::{Mesh, max_segments};
use super::policy::FlipPolicy;
use super::scroller::Scroller;
use super::shadow::{ShadowStrips, Shadows, compute_shadows};
use super::state::{EndKind, FlipDirection, FlipEvent, FlipState};
use super::texture::{PageBitmap, PageTextures, TextureError, TextureSlot, TextureUploader};

/// Horizontal lead of the corner over the finger in forward flips.
const FORWARD_LEAD: f32 = 1.2;
const BACKWARD_LEAD: f32 = 1.1;
/// Vertical travel at or below this does not pick a corner.
const VERTICAL_DEADBAND: f32 = 1.0;
/// Synthetic tap poses start this far (in page widths) into the turn.
const TAP_TRAVEL_RATIO: f32 = 0.25;
/// Undrained journal entries kept before the oldest are dropped.
pub const MAX_PENDING_EVENTS: usize = 256;

/// One finger sample. `at_ms` is relative to finger-down.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TouchSample {
    pub pos: Vec2,
    pub at_ms: u64,
}

impl TouchSample {
    /// Speed from `self` to `to` along `axis` (a unit vector), in px/ms.
    pub fn velocity_to(&self, to: &TouchSample, axis: Vec2) -> f32 {
        let dt = to.at_ms.saturating_sub(self.at_ms).max(1) as f32;
        (to.pos - self.pos).dot(axis) / dt
    }
}

/// How the sheet moves relative to its lifted corner.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Sweep {
    /// The sheet starts flat and turns over the spine.
    Turning,
    /// The sheet starts turned away (single-page backward) and comes back.
    Returning,
}

#[derive(Debug, Clone)]
struct Session {
    page: Page,
    start: TouchSample,
    /// Decided once, on the first move past the slop.
    intent: Option<FlipDirection>,
    sweep: Sweep,
    origin: Vec2,
    touch: Vec2,
    max_tan: f32,
}

impl Session {
    fn new(page: Page, pos: Vec2) -> Self {
        let origin = page.corner(pos.y < page.bounds.center().y);
        Self {
            page,
            start: TouchSample { pos, at_ms: 0 },
            intent: None,
            sweep: Sweep::Turning,
            origin,
            touch: origin,
            max_tan: max_curl_tan(pos.y - origin.y, page.height()),
        }
    }

    /// Fixes the intent, sweep and lifted corner for this gesture.
    fn commit(&mut self, intent: Option<FlipDirection>, sweep: Sweep, dy: f32) {
        self.intent = intent;
        self.sweep = sweep;
        let top = if dy.abs() <= VERTICAL_DEADBAND {
            self.start.pos.y < self.page.bounds.center().y
        } else {
            // Moving up lifts the bottom corner.
            dy > 0.0
        };
        self.origin = self.page.corner(top);
        self.max_tan = max_curl_tan(self.start.pos.y - self.origin.y, self.page.height());
    }

    fn corner_pose(&self, finger: Vec2) -> Vec2 {
        let lead = if self.intent == Some(FlipDirection::Forward) { FORWARD_LEAD } else { BACKWARD_LEAD };
        let x = match self.sweep {
            Sweep::Turning => self.origin.x + lead * (finger.x - self.start.pos.x),
            Sweep::Returning => self.origin.x + lead * (finger.x - self.origin.x),
        };
        let raw = Vec2::new(x, self.origin.y + (finger.y - self.start.pos.y));
        constrain_touch(&self.page, self.origin, raw, self.max_tan)
    }

    /// Fraction of the page width travelled in the intended direction.
    fn progress(&self, finger: Vec2) -> f32 {
        let from_edge = self.page.free_edge_ratio(finger.x).min(1.0);
        match self.sweep {
            Sweep::Turning => from_edge,
            Sweep::Returning => 1.0 - from_edge,
        }
    }

    fn velocity(&self, end: &TouchSample) -> f32 {
        let inward = Vec2::new(-self.page.outward(), 0.0);
        let axis = match self.sweep {
            Sweep::Turning => inward,
            Sweep::Returning => -inward,
        };
        self.start.velocity_to(end, axis)
    }

    fn turned_pose(&self) -> Vec2 {
        Vec2::new(self.origin.x - 2.0 * self.page.width() * self.page.outward(), self.origin.y)
    }

    fn terminal_pose(&self, kind: EndKind) -> Vec2 {
        match (kind, self.sweep) {
            (EndKind::Restore, Sweep::Turning) => self.origin,
            (EndKind::Restore, Sweep::Returning) => self.turned_pose(),
            (_, Sweep::Turning) => self.turned_pose(),
            (_, Sweep::Returning) => self.origin,
        }
    }

    /// Pose a tap animates from, a short way into the turn.
    fn tap_pose(&self) -> Vec2 {
        let w = self.page.width();
        let top = (self.origin.y - self.page.bounds.top()).abs() < f32::EPSILON;
        let inward_y = if top { 1.0 } else { -1.0 };
        let (travel, slope) = match self.sweep {
            Sweep::Turning => (TAP_TRAVEL_RATIO * w, (PI / 6.0).tan()),
            Sweep::Returning => ((2.0 - TAP_TRAVEL_RATIO) * w, (PI / 20.0).tan()),
        };
        let raw = Vec2::new(
            self.origin.x - travel * self.page.outward(),
            self.origin.y + inward_y * TAP_TRAVEL_RATIO * w * slope,
        );
        constrain_touch(&self.page, self.origin, raw, self.max_tan)
    }
}

/// Direction a horizontal drag of `dx` asks for on `page`, or `None` when it
/// moves away from the spine.
fn drag_intent(layout: PageLayout, page: &Page, dx: f32) -> Option<(FlipDirection, Sweep)> {
    match (layout, page.side) {
        (PageLayout::Single, _) if dx < 0.0 => Some((FlipDirection::Forward, Sweep::Turning)),
        (PageLayout::Single, _) => Some((FlipDirection::Backward, Sweep::Returning)),
        (PageLayout::Double, PageSide::Right) if dx < 0.0 => Some((FlipDirection::Forward, Sweep::Turning)),
        (PageLayout::Double, PageSide::Left) if dx > 0.0 => Some((FlipDirection::Backward, Sweep::Turning)),
        _ => None,
    }
}

/// Direction a turn of `page` toward the other side of the spine takes.
fn turning_direction(page: &Page) -> FlipDirection {
    match page.side {
        PageSide::Right => FlipDirection::Forward,
        PageSide::Left => FlipDirection::Backward,
    }
}

#[inline]
fn allows<P: FlipPolicy + ?Sized>(policy: &P, direction: FlipDirection) -> bool {
    match direction {
        FlipDirection::Forward => policy.can_flip_forward(),
        FlipDirection::Backward => policy.can_flip_backward(),
    }
}

/// Everything the compositor needs to draw a flipping frame.
#[derive(Debug)]
pub struct FlipFrame<'a, T> {
    /// The page being turned.
    pub page: Page,
    pub fold: &'a FoldGeometry,
    pub mesh: &'a Mesh,
    pub strips: &'a ShadowStrips,
    /// Front of the turning sheet.
    pub sheet: Option<&'a T>,
    /// Back of the turning sheet.
    pub back: Option<&'a T>,
    /// Tint applied to the mirrored front when `back` is unset.
    pub back_tint: Color,
    /// Page revealed under the sheet.
    pub revealed: Option<&'a T>,
    /// The other page of a spread with its front texture.
    pub other: Option<(Page, Option<&'a T>)>,
    pub gradient_light: Option<&'a T>,
}

/// Interactive page-flip engine, generic over the renderer's texture handle.
///
/// Transitions and swaps are journaled until [`PageFlip::drain_events`] is
/// called. The journal keeps at most [`MAX_PENDING_EVENTS`] entries and drops
/// the oldest beyond that, so hosts should drain it once per frame.
pub struct PageFlip<T> {
    config: FlipConfig,
    surface: Option<SurfaceConfig>,
    max_segments: u32,

    state: FlipState,
    session: Option<Session>,
    scroller: Option<Scroller>,
    events: VecDeque<FlipEvent>,

    fold: Option<FoldGeometry>,
    mesh: Mesh,
    shadows: Shadows,
    strips: ShadowStrips,

    textures: [PageTextures<T>; 2],
    gradient_light: Option<T>,
}

impl<T> PageFlip<T> {
    pub fn new(config: FlipConfig) -> Self {
        Self {
            config: config.sanitized(),
            surface: None,
            max_segments: 2,
            state: FlipState::Idle,
            session: None,
            scroller: None,
            events: VecDeque::new(),
            fold: None,
            mesh: Mesh::new(),
            shadows: Shadows::default(),
            strips: ShadowStrips::new(),
            textures: [PageTextures::new(), PageTextures::new()],
            gradient_light: None,
        }
    }

    // ── surface lifecycle ─────────────────────────────────────────────────

    /// A new drawing surface exists. Any in-flight flip is dropped; pages
    /// are laid out on the following [`PageFlip::on_surface_changed`].
    pub fn on_surface_created(&mut self) {
        log::debug!("flip surface created");
        self.abort_animating();
    }

    /// Lays out pages for a `width × height` surface.
    ///
    /// Aborts any in-flight flip. Textures survive when the layout is
    /// unchanged and are retired otherwise.
    pub fn on_surface_changed(&mut self, width: f32, height: f32) {
        self.abort_animating();

        let next = SurfaceConfig::new(width, height, self.config.auto_page);
        let old_layout = self.surface.map(|s| s.layout);
        let new_layout = next.map(|s| s.layout);
        if old_layout.is_some() && old_layout != new_layout {
            log::debug!("page layout changed ({old_layout:?} -> {new_layout:?}); retiring textures");
            for page in &mut self.textures {
                page.retire_all();
            }
        }

        match next {
            Some(surface) => {
                self.max_segments = max_segments(surface.viewport, self.config.mesh_resolution);
                log::debug!(
                    "flip surface {}x{} ({:?}), {} mesh segments",
                    width,
                    height,
                    surface.layout,
                    self.max_segments
                );
            }
            None => log::warn!("flip surface {width}x{height} is empty; gestures disabled"),
        }
        self.surface = next;
    }

    // ── gestures ──────────────────────────────────────────────────────────

    /// Starts a session if `(x, y)` lies in a flip-eligible zone.
    pub fn on_finger_down(&mut self, x: f32, y: f32) -> bool {
        if self.state != FlipState::Idle {
            return false;
        }
        let Some(surface) = self.surface else {
            return false;
        };

        let pos = surface.clamp(Vec2::new(x, y));
        let Some(page) = surface.page_at(pos).copied() else {
            return false;
        };

        if self.config.click_to_flip {
            let ratio = self.config.click_width_ratio;
            let in_band = page.in_free_edge_band(pos.x, ratio)
                || (!surface.has_second_page() && page.in_spine_band(pos.x, ratio));
            if !in_band {
                return false;
            }
        }

        self.session = Some(Session::new(page, pos));
        self.transition(FlipState::BeginFlip);
        true
    }

    pub fn on_finger_move<P>(&mut self, x: f32, y: f32, policy: &P) -> bool
    where
        P: FlipPolicy + ?Sized,
    {
        let Some(surface) = self.surface else {
            return false;
        };
        let pos = surface.clamp(Vec2::new(x, y));

        match self.state {
            FlipState::BeginFlip => self.begin_drag(surface.layout, pos, policy),
            FlipState::ForwardFlip | FlipState::BackwardFlip | FlipState::Restoring => {
                self.drag(pos, policy);
                true
            }
            FlipState::Idle | FlipState::Ending(_) => false,
        }
    }

    pub fn on_finger_up<P>(&mut self, x: f32, y: f32, duration_ms: u64, policy: &P) -> bool
    where
        P: FlipPolicy + ?Sized,
    {
        let Some(surface) = self.surface else {
            return false;
        };
        let pos = surface.clamp(Vec2::new(x, y));

        if self.state == FlipState::BeginFlip && !self.begin_drag(surface.layout, pos, policy) {
            return self.tap(surface.layout, policy);
        }

        match self.state {
            FlipState::ForwardFlip | FlipState::BackwardFlip => {
                self.drag(pos, policy);
                self.release(pos, duration_ms, policy);
                true
            }
            FlipState::Restoring => {
                // The policy may have re-allowed the intent since the last move.
                self.drag(pos, policy);
                if self.state == FlipState::Restoring {
                    self.start_ending(EndKind::Restore);
                } else {
                    self.release(pos, duration_ms, policy);
                }
                true
            }
            FlipState::Idle | FlipState::BeginFlip | FlipState::Ending(_) => false,
        }
    }

    /// `true` while a forward flip is dragged and `(x, y)` has left the page.
    pub fn can_animate(&self, x: f32, y: f32) -> bool {
        self.state == FlipState::ForwardFlip
            && self.session.as_ref().is_some_and(|s| !s.page.contains(Vec2::new(x, y)))
    }

    /// Drops the session immediately: no swap, no geometry.
    pub fn abort_animating(&mut self) {
        if self.state == FlipState::Idle && self.session.is_none() {
            return;
        }
        self.end_session();
    }

    /// Advances the settle animation by `dt` seconds.
    ///
    /// Returns `true` when the frame changed and should be redrawn.
    pub fn animate(&mut self, dt: f32) -> bool {
        let FlipState::Ending(kind) = self.state else {
            return false;
        };
        let (Some(scroller), Some(session)) = (self.scroller.as_mut(), self.session.as_mut()) else {
            self.end_session();
            return true;
        };

        session.touch = scroller.advance(dt);
        if !scroller.is_finished() {
            self.refresh_geometry();
            return true;
        }

        let side = session.page.side;
        if kind != EndKind::Restore {
            match self.layout() {
                Some(PageLayout::Double) => self.swap_textures_with(side),
                _ => self.first_with_second(side),
            }
            self.record(FlipEvent::Swapped { side, kind });
        }
        self.end_session();
        true
    }

    fn begin_drag<P>(&mut self, layout: PageLayout, pos: Vec2, policy: &P) -> bool
    where
        P: FlipPolicy + ?Sized,
    {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let dx = pos.x - session.start.pos.x;
        if dx.abs() <= self.config.drag_slop {
            return false;
        }

        let dy = pos.y - session.start.pos.y;
        match drag_intent(layout, &session.page, dx) {
            Some((direction, sweep)) => session.commit(Some(direction), sweep, dy),
            None => session.commit(None, Sweep::Turning, dy),
        }
        self.drag(pos, policy);
        true
    }

    fn drag<P>(&mut self, pos: Vec2, policy: &P)
    where
        P: FlipPolicy + ?Sized,
    {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.touch = session.corner_pose(pos);
        let next = match session.intent {
            Some(direction) if allows(policy, direction) => direction.drag_state(),
            _ => FlipState::Restoring,
        };
        self.transition(next);
        self.refresh_geometry();
    }

    fn release<P>(&mut self, pos: Vec2, duration_ms: u64, policy: &P)
    where
        P: FlipPolicy + ?Sized,
    {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let end = TouchSample { pos, at_ms: duration_ms };
        let progress = session.progress(pos);
        let velocity = session.velocity(&end);
        let intent = session.intent;
        let completion: CompletionThreshold = self.config.completion;

        let kind = match intent {
            Some(direction) if allows(policy, direction) && completion.is_met(progress, velocity) => {
                direction.end_kind()
            }
            _ => {
                log::debug!("flip released under threshold (progress {progress:.2}, {velocity:.2} px/ms)");
                self.transition(FlipState::Restoring);
                EndKind::Restore
            }
        };
        self.start_ending(kind);
    }

    fn tap<P>(&mut self, layout: PageLayout, policy: &P) -> bool
    where
        P: FlipPolicy + ?Sized,
    {
        let Some(session) = self.session.as_mut() else {
            self.end_session();
            return false;
        };

        let ratio = self.config.click_width_ratio;
        let x = session.start.pos.x;
        let target = if !self.config.click_to_flip {
            None
        } else if session.page.in_free_edge_band(x, ratio) {
            Some((turning_direction(&session.page), Sweep::Turning))
        } else if layout == PageLayout::Single && session.page.in_spine_band(x, ratio) {
            Some((FlipDirection::Backward, Sweep::Returning))
        } else {
            None
        };

        match target {
            Some((direction, sweep)) if allows(policy, direction) => {
                session.commit(Some(direction), sweep, 0.0);
                session.touch = session.tap_pose();
                self.start_ending(direction.end_kind());
                true
            }
            _ => {
                self.end_session();
                false
            }
        }
    }

    fn start_ending(&mut self, kind: EndKind) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let target = session.terminal_pose(kind);
        self.scroller = Some(Scroller::new(
            session.touch,
            target,
            self.config.animation_duration,
            self.config.easing,
        ));
        self.transition(FlipState::Ending(kind));
        self.refresh_geometry();
    }

    fn end_session(&mut self) {
        self.session = None;
        self.scroller = None;
        self.clear_geometry();
        self.transition(FlipState::Idle);
    }

    fn transition(&mut self, to: FlipState) {
        let from = self.state;
        if from == to {
            return;
        }
        log::debug!("flip state {from} -> {to}");
        self.state = to;
        self.record(FlipEvent::StateChanged { from, to });
    }

    fn record(&mut self, event: FlipEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn refresh_geometry(&mut self) {
        let Some(session) = self.session.as_ref() else {
            self.clear_geometry();
            return;
        };
        let fold = compute_fold(
            &session.page,
            session.origin,
            session.touch,
            self.config.semi_perimeter_ratio,
            self.config.mesh_resolution,
        );
        self.mesh.rebuild(&fold, self.max_segments);
        self.shadows = compute_shadows(&fold, &self.config.edge_shadow, &self.config.base_shadow);
        self.strips.rebuild(&fold, &self.shadows);
        self.fold = Some(fold);
    }

    fn clear_geometry(&mut self) {
        self.fold = None;
        self.mesh.clear();
        self.shadows = Shadows::default();
        self.strips.clear();
    }

    // ── configuration ─────────────────────────────────────────────────────

    pub fn config(&self) -> &FlipConfig {
        &self.config
    }

    fn update_config(&mut self, f: impl FnOnce(&mut FlipConfig)) {
        let mut next = self.config.clone();
        f(&mut next);
        self.config = next.sanitized();
        if let Some(surface) = self.surface {
            self.max_segments = max_segments(surface.viewport, self.config.mesh_resolution);
        }
        if self.fold.is_some() {
            self.refresh_geometry();
        }
    }

    pub fn set_mesh_resolution(&mut self, px: u32) {
        self.update_config(|c| c.mesh_resolution = px);
    }

    pub fn set_semi_perimeter_ratio(&mut self, ratio: f32) {
        self.update_config(|c| c.semi_perimeter_ratio = ratio);
    }

    pub fn set_click_to_flip(&mut self, enabled: bool) {
        self.update_config(|c| c.click_to_flip = enabled);
    }

    pub fn set_click_width_ratio(&mut self, ratio: f32) {
        self.update_config(|c| c.click_width_ratio = ratio);
    }

    pub fn set_edge_shadow(&mut self, spec: ShadowSpec) {
        self.update_config(|c| c.edge_shadow = spec);
    }

    pub fn set_base_shadow(&mut self, spec: ShadowSpec) {
        self.update_config(|c| c.base_shadow = spec);
    }

    pub fn set_mask_alpha(&mut self, alpha: f32) {
        self.update_config(|c| c.mask_alpha = alpha);
    }

    pub fn set_completion(&mut self, completion: CompletionThreshold) {
        self.update_config(|c| c.completion = completion);
    }

    pub fn set_animation_duration(&mut self, duration: Duration) {
        self.update_config(|c| c.animation_duration = duration);
    }

    /// Switches automatic two-page layout; re-lays out the current surface.
    pub fn enable_auto_page(&mut self, enabled: bool) {
        if self.config.auto_page == enabled {
            return;
        }
        self.update_config(|c| c.auto_page = enabled);
        if let Some(surface) = self.surface {
            self.on_surface_changed(surface.viewport.width, surface.viewport.height);
        }
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn set_texture<U>(
        &mut self,
        side: PageSide,
        slot: TextureSlot,
        bitmap: &PageBitmap,
        uploader: &mut U,
    ) -> Result<(), TextureError>
    where
        U: TextureUploader<Handle = T> + ?Sized,
    {
        let result = bitmap
            .ensure_fits(self.config.max_texture_side)
            .and_then(|()| self.textures[side.index()].set(slot, bitmap, uploader));
        if let Err(err) = &result {
            log::warn!("{side:?}/{slot:?}: {err}");
        }
        result
    }

    pub fn set_first_texture<U>(&mut self, side: PageSide, bitmap: &PageBitmap, uploader: &mut U) -> Result<(), TextureError>
    where
        U: TextureUploader<Handle = T> + ?Sized,
    {
        self.set_texture(side, TextureSlot::First, bitmap, uploader)
    }

    pub fn set_second_texture<U>(&mut self, side: PageSide, bitmap: &PageBitmap, uploader: &mut U) -> Result<(), TextureError>
    where
        U: TextureUploader<Handle = T> + ?Sized,
    {
        self.set_texture(side, TextureSlot::Second, bitmap, uploader)
    }

    pub fn set_back_texture<U>(&mut self, side: PageSide, bitmap: &PageBitmap, uploader: &mut U) -> Result<(), TextureError>
    where
        U: TextureUploader<Handle = T> + ?Sized,
    {
        self.set_texture(side, TextureSlot::Back, bitmap, uploader)
    }

    pub fn set_gradient_light_texture<U>(&mut self, bitmap: &PageBitmap, uploader: &mut U) -> Result<(), TextureError>
    where
        U: TextureUploader<Handle = T> + ?Sized,
    {
        match bitmap.ensure_fits(self.config.max_texture_side).and_then(|()| uploader.upload(bitmap)) {
            Ok(handle) => {
                self.gradient_light = Some(handle);
                Ok(())
            }
            Err(err) => {
                log::warn!("gradient light: {err}");
                Err(err)
            }
        }
    }

    /// Commits a completed turn of `side` across the spine.
    ///
    /// On a spread the sheet's back becomes the other page's front and the
    /// revealed page becomes this page's front. A single page falls back to
    /// [`PageFlip::first_with_second`].
    pub fn swap_textures_with(&mut self, side: PageSide) {
        if self.layout() != Some(PageLayout::Double) {
            self.first_with_second(side);
            return;
        }
        let [left, right] = &mut self.textures;
        let (this, other) = match side {
            PageSide::Left => (left, right),
            PageSide::Right => (right, left),
        };
        other.put(TextureSlot::First, this.take(TextureSlot::Back));
        this.move_slot(TextureSlot::Second, TextureSlot::First);
    }

    /// Promotes `Second` into `First`, retiring the old front.
    pub fn first_with_second(&mut self, side: PageSide) {
        self.textures[side.index()].move_slot(TextureSlot::Second, TextureSlot::First);
    }

    /// Demotes `First` into `Second`, retiring the old second.
    pub fn second_with_first(&mut self, side: PageSide) {
        self.textures[side.index()].move_slot(TextureSlot::First, TextureSlot::Second);
    }

    /// Releases retired handles of `side`; returns how many were dropped.
    pub fn delete_unused_textures(&mut self, side: PageSide) -> usize {
        self.textures[side.index()].delete_unused()
    }

    pub fn is_texture_set(&self, side: PageSide, slot: TextureSlot) -> bool {
        self.textures[side.index()].is_set(slot)
    }

    pub fn textures(&self, side: PageSide) -> &PageTextures<T> {
        &self.textures[side.index()]
    }

    // ── introspection ─────────────────────────────────────────────────────

    #[inline]
    pub fn flip_state(&self) -> FlipState {
        self.state
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.state.is_animating()
    }

    /// Transitions and swaps since the last call, oldest first.
    pub fn drain_events(&mut self) -> std::collections::vec_deque::Drain<'_, FlipEvent> {
        self.events.drain(..)
    }

    pub fn surface(&self) -> Option<&SurfaceConfig> {
        self.surface.as_ref()
    }

    fn layout(&self) -> Option<PageLayout> {
        self.surface.map(|s| s.layout)
    }

    pub fn has_second_page(&self) -> bool {
        self.surface.is_some_and(|s| s.has_second_page())
    }

    pub fn page(&self, side: PageSide) -> Option<&Page> {
        self.surface.as_ref().and_then(|s| s.page(side))
    }

    pub fn page_width(&self) -> f32 {
        self.page(PageSide::Right).map_or(0.0, Page::width)
    }

    pub fn page_height(&self) -> f32 {
        self.page(PageSide::Right).map_or(0.0, Page::height)
    }

    /// Whether `side` names the left page of the current spread.
    pub fn is_left_page(&self, side: PageSide) -> bool {
        side == PageSide::Left && self.page(side).is_some()
    }

    pub fn is_right_page(&self, side: PageSide) -> bool {
        side == PageSide::Right && self.page(side).is_some()
    }

    pub fn fold(&self) -> Option<&FoldGeometry> {
        self.fold.as_ref()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn shadows(&self) -> &Shadows {
        &self.shadows
    }

    pub fn gradient_light(&self) -> Option<&T> {
        self.gradient_light.as_ref()
    }

    /// Snapshot for drawing a flipping frame; `None` while no fold exists.
    pub fn flip_frame(&self) -> Option<FlipFrame<'_, T>> {
        let session = self.session.as_ref()?;
        let fold = self.fold.as_ref()?;
        let surface = self.surface.as_ref()?;
        let side = session.page.side;
        let page = &self.textures[side.index()];

        let (sheet_slot, revealed_slot) = match session.sweep {
            Sweep::Turning => (TextureSlot::First, TextureSlot::Second),
            Sweep::Returning => (TextureSlot::Second, TextureSlot::First),
        };
        let other = surface
            .page(side.other())
            .map(|p| (*p, self.textures[side.other().index()].get(TextureSlot::First)));

        Some(FlipFrame {
            page: session.page,
            fold,
            mesh: &self.mesh,
            strips: &self.strips,
            sheet: page.get(sheet_slot),
            back: page.get(TextureSlot::Back),
            back_tint: page.mask(sheet_slot).faded(self.config.mask_alpha),
            revealed: page.get(revealed_slot),
            other,
            gradient_light: self.gradient_light.as_ref(),
        })
    }

    /// Pages with their front textures, for drawing an idle frame.
    pub fn page_frame(&self) -> impl Iterator<Item = (Page, Option<&T>)> + '_ {
        self.surface
            .iter()
            .flat_map(|s| s.pages())
            .map(|p| (*p, self.textures[p.side.index()].get(TextureSlot::First)))
    }
}
