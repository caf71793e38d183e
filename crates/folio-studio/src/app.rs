use folio_engine::coords::Vec2;
use folio_engine::core::{App, AppControl, FrameCtx};
use folio_engine::flip::{
    EndKind, FlipConfig, FlipDirection, FlipEvent, FlipState, PageBitmap, PageFlip, PageLayout, PageSide, Permissions,
    TextureSlot, TextureUploader,
};
use folio_engine::input::{Gesture, GestureTracker, Key};
use folio_engine::paint::Color;
use folio_engine::render::flip::{FlipRenderer, GpuTexture};

use crate::book::{Book, Position};

/// Texture assignment currently uploaded to the engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Loaded {
    layout: PageLayout,
    index: usize,
    direction: FlipDirection,
}

pub struct BookApp {
    book: Book,
    position: Position,
    flip: PageFlip<GpuTexture>,
    renderer: Option<FlipRenderer>,
    gestures: GestureTracker,
    /// Last drag direction; picks the single-page second slot.
    direction: FlipDirection,
    loaded: Option<Loaded>,
    light_loaded: bool,
    surface_ready: bool,
    title_index: Option<usize>,
}

impl BookApp {
    pub fn new(book: Book, config: FlipConfig) -> Self {
        let position = Position::new(book.len());
        Self {
            book,
            position,
            flip: PageFlip::new(config),
            renderer: None,
            gestures: GestureTracker::new(),
            direction: FlipDirection::Forward,
            loaded: None,
            light_loaded: false,
            surface_ready: false,
            title_index: None,
        }
    }

    fn layout(&self) -> Option<PageLayout> {
        self.flip.surface().map(|s| s.layout)
    }

    fn permissions(&self) -> Permissions {
        self.layout()
            .map_or(Permissions::NONE, |layout| self.position.permissions(layout))
    }

    fn on_gesture(&mut self, gesture: Gesture) {
        let policy = self.permissions();
        match gesture {
            Gesture::Down { x, y } => {
                self.flip.on_finger_down(x, y);
            }
            Gesture::Move { x, y } => {
                self.flip.on_finger_move(x, y, &policy);
            }
            Gesture::Up { x, y, duration_ms } => {
                self.flip.on_finger_up(x, y, duration_ms, &policy);
            }
        }
    }

    /// Turns a page from the keyboard with a synthetic tap on its edge.
    fn tap_turn(&mut self, direction: FlipDirection) {
        let Some(layout) = self.layout() else { return };
        if !self.flip.flip_state().is_idle() {
            return;
        }
        let (side, at_free_edge) = match (layout, direction) {
            (_, FlipDirection::Forward) => (PageSide::Right, true),
            (PageLayout::Double, FlipDirection::Backward) => (PageSide::Left, true),
            (PageLayout::Single, FlipDirection::Backward) => (PageSide::Right, false),
        };
        let Some(page) = self.flip.page(side).copied() else { return };

        let inset = page.width() * 0.02;
        let x = if at_free_edge {
            page.free_edge_x() - inset * page.outward()
        } else {
            page.spine_x() + inset * page.outward()
        };
        let at = Vec2::new(x, page.bounds.center().y);
        let policy = self.permissions();
        if self.flip.on_finger_down(at.x, at.y) {
            self.flip.on_finger_up(at.x, at.y, 0, &policy);
        }
    }

    fn handle_flip_events(&mut self) {
        let events: Vec<FlipEvent> = self.flip.drain_events().collect();
        let Some(layout) = self.layout() else { return };

        for event in events {
            match event {
                FlipEvent::StateChanged { to: FlipState::ForwardFlip, .. } => self.direction = FlipDirection::Forward,
                FlipEvent::StateChanged { to: FlipState::BackwardFlip, .. } => self.direction = FlipDirection::Backward,
                FlipEvent::StateChanged { to: FlipState::Ending(EndKind::Backward), .. } => {
                    self.direction = FlipDirection::Backward
                }
                FlipEvent::StateChanged { to: FlipState::Ending(EndKind::Forward), .. } => {
                    self.direction = FlipDirection::Forward
                }
                FlipEvent::Swapped { kind, .. } => {
                    let direction = match kind {
                        EndKind::Forward => FlipDirection::Forward,
                        EndKind::Backward => FlipDirection::Backward,
                        EndKind::Restore => continue,
                    };
                    self.position = self.position.advanced(layout, direction);
                    log::info!("page {}/{}", self.position.index + 1, self.book.len());
                }
                FlipEvent::StateChanged { .. } => {}
            }
        }
    }

    fn wanted(&self) -> Option<Loaded> {
        let layout = self.layout()?;
        Some(Loaded {
            layout,
            index: self.position.normalized(layout).index,
            direction: match layout {
                PageLayout::Single => self.direction,
                PageLayout::Double => FlipDirection::Forward,
            },
        })
    }
}

/// Uploads every slot for `want`. Missing pages become blank paper so stale
/// textures never linger.
fn upload_pages<U>(flip: &mut PageFlip<GpuTexture>, uploader: &mut U, book: &Book, position: Position, want: Loaded)
where
    U: TextureUploader<Handle = GpuTexture>,
{
    let position = Position { index: want.index, ..position };
    for side in PageSide::ALL {
        if flip.page(side).is_none() {
            continue;
        }
        for slot in TextureSlot::ALL {
            if want.layout == PageLayout::Single && slot == TextureSlot::Back {
                continue;
            }
            let bitmap = book.page_or_blank(position.page_for(want.layout, want.direction, side, slot));
            let result = match slot {
                TextureSlot::First => flip.set_first_texture(side, bitmap, uploader),
                TextureSlot::Second => flip.set_second_texture(side, bitmap, uploader),
                TextureSlot::Back => flip.set_back_texture(side, bitmap, uploader),
            };
            if let Err(err) = result {
                log::error!("page {side:?}/{slot:?}: {err}");
            }
        }
        let released = flip.delete_unused_textures(side);
        log::debug!("released {released} textures of {side:?}");
    }
}

impl App for BookApp {
    fn on_resize(&mut self, width: f32, height: f32) {
        if !self.surface_ready {
            self.flip.on_surface_created();
            self.surface_ready = true;
        }
        self.flip.on_surface_changed(width, height);
        if let Some(layout) = self.layout() {
            self.position = self.position.normalized(layout);
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        let now = ctx.time.elapsed_ms;
        for event in &ctx.input_frame.events {
            if let Some(gesture) = self.gestures.process(event, now) {
                self.on_gesture(gesture);
            }
        }
        if [Key::ArrowRight, Key::PageDown, Key::Space].iter().any(|k| ctx.input_frame.key_pressed(*k)) {
            self.tap_turn(FlipDirection::Forward);
        }
        if [Key::ArrowLeft, Key::PageUp].iter().any(|k| ctx.input_frame.key_pressed(*k)) {
            self.tap_turn(FlipDirection::Backward);
        }

        self.flip.animate(ctx.time.dt);
        self.handle_flip_events();

        if self.title_index != Some(self.position.index) {
            ctx.window
                .set_title(&format!("folio · page {} of {}", self.position.index + 1, self.book.len()));
            self.title_index = Some(self.position.index);
        }

        let want = self.wanted();
        let reload = want.filter(|w| self.loaded != Some(*w));
        let load_light = !self.light_loaded;

        let (flip, renderer, book, position) = (&mut self.flip, &mut self.renderer, &self.book, self.position);
        let mut loaded = None;
        let mut light_loaded = false;

        let control = ctx.render(Color::from_straight(0.16, 0.15, 0.14, 1.0), |rctx, target| {
            let renderer = renderer.get_or_insert_with(|| FlipRenderer::new(rctx.device));
            {
                let mut uploader = renderer.uploader(rctx);
                if load_light {
                    light_loaded = flip
                        .set_gradient_light_texture(&PageBitmap::gradient_light(256), &mut uploader)
                        .is_ok();
                }
                if let Some(want) = reload {
                    upload_pages(flip, &mut uploader, book, position, want);
                    loaded = Some(want);
                }
            }

            if flip.flip_state().is_idle() {
                renderer.draw_page_frame(rctx, target, flip);
            } else {
                renderer.draw_flip_frame(rctx, target, flip);
            }
        });

        self.light_loaded |= light_loaded;
        if loaded.is_some() {
            self.loaded = loaded;
        }
        control
    }
}
