use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::FlowConfig;
use crate::flow::{build_paths, FilterSnapshot, FlowRecord, PathSet};
use crate::geo::{ContainerSize, GeometryProvider, MapLayout};
use crate::particle::{allocate, ParticleSimulator};
use crate::render::{render_frame, render_map_svg, FrameStats, OverlaySurface, ZoomBehavior, ZoomTransform};

pub type FrameId = u64;

/// The host's per-frame callback source (e.g. `requestAnimationFrame`).
pub trait FrameScheduler {
    /// Asks for one callback on the next display frame.
    fn request_frame(&mut self) -> FrameId;

    fn cancel_frame(&mut self, id: FrameId);
}

/// Scheduler for headless hosts: requested frames queue up until the host
/// pulls them with [`QueuedScheduler::next_frame`].
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    next_id: FrameId,
    pending: Vec<FrameId>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[FrameId] {
        &self.pending
    }

    pub fn next_frame(&mut self) -> Option<FrameId> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        self.pending.push(self.next_id);
        self.next_id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.pending.retain(|pending| *pending != id);
    }
}

/// At most one outstanding frame plus the clock used for frame deltas.
#[derive(Debug, Default)]
pub struct AnimationLoop {
    frame: Option<FrameId>,
    last_time_ms: Option<f64>,
}

impl AnimationLoop {
    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.frame
    }

    fn cancel(&mut self, scheduler: &mut impl FrameScheduler) {
        if let Some(id) = self.frame.take() {
            scheduler.cancel_frame(id);
        }
    }

    fn restart(&mut self, scheduler: &mut impl FrameScheduler) {
        self.cancel(scheduler);
        self.last_time_ms = None;
        self.frame = Some(scheduler.request_frame());
    }

    /// Milliseconds since the previous tick; zero on the first tick after
    /// a restart and whenever the clock runs backwards.
    fn tick(&mut self, now_ms: f64) -> f64 {
        let delta = self.last_time_ms.map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_time_ms = Some(now_ms);
        delta
    }
}

/// What the user has chosen, copied into every rebuild and frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub filter: FilterSnapshot,
    pub transform: ZoomTransform,
}

pub struct ControllerProps<S, F> {
    pub config: FlowConfig,
    pub provider: GeometryProvider,
    pub records: Vec<FlowRecord>,
    pub container: ContainerSize,
    pub year: String,
    pub surface: S,
    pub scheduler: F,
    /// Fixed seed for reproducible particle timing; `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Sole mutator of view state. Filter changes rebuild paths and particles
/// and restart the loop; zoom changes only touch the transform.
pub struct InteractionController<S: OverlaySurface, F: FrameScheduler> {
    config: FlowConfig,
    zoom: ZoomBehavior,
    provider: GeometryProvider,
    records: Vec<FlowRecord>,
    layout: MapLayout,
    view: ViewState,
    paths: PathSet,
    simulator: ParticleSimulator,
    animation: AnimationLoop,
    surface: S,
    scheduler: F,
    rng: StdRng,
}

impl<S: OverlaySurface, F: FrameScheduler> InteractionController<S, F> {
    pub fn new(props: ControllerProps<S, F>) -> Self {
        let rng = match props.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let layout = props.provider.layout(props.container);
        let mut surface = props.surface;
        surface.resize(props.container);

        let mut controller = InteractionController {
            zoom: ZoomBehavior::new(props.config.scale_extent),
            config: props.config,
            provider: props.provider,
            records: props.records,
            layout,
            view: ViewState {
                filter: FilterSnapshot::for_year(props.year),
                transform: ZoomTransform::IDENTITY,
            },
            paths: PathSet::default(),
            simulator: ParticleSimulator::new(),
            animation: AnimationLoop::default(),
            surface,
            scheduler: props.scheduler,
            rng,
        };
        controller.rebuild();
        controller
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn year(&self) -> &str {
        &self.view.filter.year
    }

    pub fn selected_region(&self) -> Option<&str> {
        self.view.filter.selected_region.as_deref()
    }

    pub fn transform(&self) -> ZoomTransform {
        self.view.transform
    }

    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    pub fn particles(&self) -> &ParticleSimulator {
        &self.simulator
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.animation.pending_frame()
    }

    pub fn set_year(&mut self, year: impl Into<String>) {
        self.view.filter.year = year.into();
        self.rebuild();
    }

    /// Selects `code`, or clears the selection when it is already selected.
    pub fn click_region(&mut self, code: &str) {
        let filter = &mut self.view.filter;
        filter.selected_region = match filter.selected_region.as_deref() {
            Some(selected) if selected == code => None,
            _ => Some(code.to_string()),
        };
        self.rebuild();
    }

    pub fn set_show_inflow(&mut self, show: bool) {
        self.view.filter.show_inflow = show;
        self.rebuild();
    }

    pub fn set_show_outflow(&mut self, show: bool) {
        self.view.filter.show_outflow = show;
        self.rebuild();
    }

    /// Applies an externally supplied transform with its scale clamped.
    /// Transforms with non-finite components are ignored.
    pub fn set_transform(&mut self, transform: ZoomTransform) {
        if transform.is_finite() {
            self.view.transform = self.zoom.constrain(transform);
        }
    }

    pub fn zoom_by(&mut self, factor: f64, anchor: DVec2) {
        self.view.transform = self.zoom.scale_by(self.view.transform, factor, anchor);
    }

    pub fn pan_by(&mut self, offset: DVec2) {
        self.view.transform = self.zoom.translate_by(self.view.transform, offset);
    }

    /// Re-projects the map for the new container, then rebuilds since every
    /// centroid moved. The zoom resets to identity.
    pub fn resize(&mut self, container: ContainerSize) {
        self.view.transform = ZoomTransform::IDENTITY;
        self.layout = self.provider.layout(container);
        self.surface.resize(container);
        self.rebuild();
    }

    /// Runs frame `id` at host time `now_ms`: advance, draw, schedule the
    /// next frame. Frames that were cancelled or superseded are ignored.
    pub fn on_frame(&mut self, id: FrameId, now_ms: f64) -> Option<FrameStats> {
        if self.animation.frame != Some(id) {
            return None;
        }
        self.animation.frame = None;

        let delta_ms = self.animation.tick(now_ms);
        self.simulator
            .advance(&self.paths.paths, delta_ms, &self.config, &mut self.rng);
        let stats = render_frame(&mut self.surface, &self.paths, &self.simulator, self.view.transform);

        self.animation.frame = Some(self.scheduler.request_frame());
        Some(stats)
    }

    /// Boundaries and labels for the current layout, zoom and selection.
    pub fn map_svg(&self) -> String {
        render_map_svg(
            &self.layout,
            self.view.transform,
            self.selected_region(),
            self.config.label_zoom_threshold,
        )
    }

    fn rebuild(&mut self) {
        let filter = self.view.filter.clone();
        let paths = build_paths(&self.records, &filter, &self.layout.regions, &self.config);

        if paths.is_empty() {
            self.animation.cancel(&mut self.scheduler);
            self.paths = PathSet::default();
            self.simulator.clear();
            self.surface.clear();
            info!(year = %filter.year, "nothing to animate, overlay cleared");
            return;
        }

        let particles = allocate(&paths.paths, paths.total_volume, &self.config, &mut self.rng);
        debug!(
            year = %filter.year,
            paths = paths.len(),
            particles = particles.len(),
            "particle population rebuilt"
        );
        self.paths = paths;
        self.simulator.replace(particles);
        self.animation.restart(&mut self.scheduler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_scheduler_drops_cancelled_frames() {
        let mut scheduler = QueuedScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        scheduler.cancel_frame(a);
        assert_eq!(scheduler.pending(), &[b]);
        assert_eq!(scheduler.next_frame(), Some(b));
        assert_eq!(scheduler.next_frame(), None);
    }

    #[test]
    fn restart_cancels_the_previous_frame() {
        let mut scheduler = QueuedScheduler::new();
        let mut animation = AnimationLoop::default();
        animation.restart(&mut scheduler);
        let first = animation.pending_frame().unwrap();
        animation.restart(&mut scheduler);

        assert_eq!(scheduler.pending().len(), 1);
        assert_ne!(animation.pending_frame(), Some(first));
    }

    #[test]
    fn tick_measures_from_the_previous_frame() {
        let mut animation = AnimationLoop::default();
        assert_eq!(animation.tick(1000.0), 0.0);
        assert_eq!(animation.tick(1016.0), 16.0);
        assert_eq!(animation.tick(1010.0), 0.0);
        assert_eq!(animation.tick(1020.0), 10.0);
    }
}
