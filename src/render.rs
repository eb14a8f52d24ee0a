//! Turns a history window into a drawable figure.
//!
//! One parameter gives a density scatter per state variable. Two parameters
//! give a 3D scatter per variable, sliced along the first parameter by a
//! [`SliceController`].

use std::time::Instant;

use tracing::{info, warn};

use crate::axes::{Axes2D, Axes3D, Limits};
use crate::canvas::{ACCENT, BLACK, Canvas, FRAME, PANEL, Rect, WHITE, text_width};
use crate::config::DiagramConfig;
use crate::engine::{HistoryWindow, SimulationEngine};
use crate::grid::{Field, ParameterSet, RenderStrategy};
use crate::maps::Map;
use crate::slice::{Artifact, Mode, SliceController, Slider};

const TITLE_SCALE: usize = 3;
const WIDGET_SCALE: usize = 2;
const AZIMUTH: f64 = -60.0;
const ELEVATION: f64 = 30.0;
/// Slider step, in grid spacings of the first parameter.
const SLIDER_STEP_CELLS: f64 = 5.0;

/// Clickable parts of a figure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    Slider,
    Start,
    Stop,
}

pub struct DensityPlot {
    x: Field,
    history: HistoryWindow,
    axes: Vec<Axes2D>,
}

pub struct SlicedPlot {
    axes: Vec<Axes3D>,
    controller: SliceController,
    slider_rect: Rect,
    start_rect: Rect,
    stop_rect: Rect,
}

pub enum Diagram {
    Density(DensityPlot),
    Sliced(SlicedPlot),
}

pub struct Figure {
    title: String,
    width: usize,
    height: usize,
    alpha: f32,
    diagram: Diagram,
}

/// Subplot rectangles for `n` plots in one row, using matplotlib's default
/// subplot parameters.
fn subplot_rects(width: usize, height: usize, n: usize) -> Vec<Rect> {
    let (left, right, bottom, top, wspace) = (0.125, 0.9, 0.11, 0.88, 0.2);
    let total = (right - left) * width as f64;
    let w = total / (n as f64 + (n as f64 - 1.0) * wspace);
    let y = ((1.0 - top) * height as f64) as usize;
    let h = ((top - bottom) * height as f64) as usize;
    (0..n)
        .map(|i| {
            let x = left * width as f64 + i as f64 * w * (1.0 + wspace);
            Rect::new(x as usize, y, w as usize, h)
        })
        .collect()
}

/// Figure-fraction box `[left, bottom, width, height]` to pixels.
fn figure_rect(width: usize, height: usize, frac: [f64; 4]) -> Rect {
    let [l, b, w, h] = frac;
    let top = 1.0 - (b + h);
    Rect::new(
        (l * width as f64) as usize,
        (top * height as f64) as usize,
        ((w * width as f64) as usize).max(1),
        ((h * height as f64) as usize).max(1),
    )
}

pub struct DiagramRenderer<'a> {
    config: &'a DiagramConfig,
}

impl<'a> DiagramRenderer<'a> {
    pub fn new(config: &'a DiagramConfig) -> Self {
        DiagramRenderer { config }
    }

    /// Renders the engine's latest window. The figure shares the window's
    /// snapshots with the engine.
    pub fn render_engine<M: Map>(&self, engine: &SimulationEngine<M>) -> Figure {
        let names: Vec<&str> = engine.vars().names().collect();
        self.render(engine.name(), engine.window().clone(), engine.params(), &names)
    }

    pub fn render(
        &self,
        name: &str,
        window: HistoryWindow,
        params: &ParameterSet,
        variables: &[&str],
    ) -> Figure {
        let (width, height) = (self.config.window.width, self.config.window.height);
        let diagram = match params.strategy() {
            RenderStrategy::TwoD => Diagram::Density(self.density(window, params, variables)),
            RenderStrategy::ThreeD => Diagram::Sliced(self.sliced(window, params, variables)),
        };
        info!(map = name, strategy = ?params.strategy(), "diagram assembled");
        Figure {
            title: format!("{} Bifurcation Diagram", name),
            width,
            height,
            alpha: self.config.point_alpha,
            diagram,
        }
    }

    fn density(&self, window: HistoryWindow, params: &ParameterSet, variables: &[&str]) -> DensityPlot {
        let (pname, x) = params.by_index(0);
        let rects = subplot_rects(self.config.window.width, self.config.window.height, variables.len());
        let xlim = Limits::new(x.first(), x.last());

        let axes = variables
            .iter()
            .zip(rects)
            .enumerate()
            .map(|(v, (vname, rect))| {
                let ylim = match window.variable_range(v) {
                    Some((lo, hi)) => Limits::new(lo, hi).padded(0.05),
                    None => {
                        warn!(variable = *vname, "no finite values to plot");
                        Limits::new(0.0, 1.0)
                    }
                };
                Axes2D {
                    rect,
                    x: xlim,
                    y: ylim,
                    xlabel: pname.to_string(),
                    ylabel: vname.to_string(),
                }
            })
            .collect();

        DensityPlot { x: x.clone(), history: window, axes }
    }

    fn sliced(&self, window: HistoryWindow, params: &ParameterSet, variables: &[&str]) -> SlicedPlot {
        let (xname, x) = params.by_index(0);
        let (yname, y) = params.by_index(1);
        let (width, height) = (self.config.window.width, self.config.window.height);

        let cols = x.cols();
        let middle = cols / 2;
        let (xmin, xmax) = (x.first(), x.get(0, cols - 1));
        let (ymin, ymax) = (y.first(), y.get(y.rows() - 1, 0));

        let axes = variables
            .iter()
            .zip(subplot_rects(width, height, variables.len()))
            .enumerate()
            .map(|(v, (vname, rect))| {
                // computed once over the whole window, not per slice
                let zlim = match window.variable_range(v) {
                    Some((lo, hi)) => Limits::new(lo, hi),
                    None => {
                        warn!(variable = *vname, "no finite values to plot");
                        Limits::new(0.0, 1.0)
                    }
                };
                Axes3D::new(
                    rect,
                    [Limits::new(xmin, xmax), Limits::new(ymin, ymax), zlim],
                    [xname.to_string(), yname.to_string(), vname.to_string()],
                    AZIMUTH,
                    ELEVATION,
                )
            })
            .collect();

        let artifacts = (0..variables.len())
            .flat_map(|v| (0..window.len()).map(move |s| Artifact::new(v, s)))
            .collect();

        let spacing = if cols > 1 { x.get(0, 1) - x.get(0, 0) } else { 0.0 };
        let slider = Slider::new(xname, xmin, xmax, x.get(0, middle), SLIDER_STEP_CELLS * spacing);

        let controller = SliceController::new(
            x.clone(),
            y.clone(),
            window,
            artifacts,
            slider,
            &self.config.animation,
            middle,
        );

        SlicedPlot {
            axes,
            controller,
            slider_rect: figure_rect(width, height, [0.08, 0.15, 0.03, 0.6]),
            start_rect: figure_rect(width, height, [0.75, 0.05, 0.1, 0.075]),
            stop_rect: figure_rect(width, height, [0.86, 0.05, 0.1, 0.075]),
        }
    }
}

impl Figure {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Present only for two-parameter diagrams.
    pub fn controller(&self) -> Option<&SliceController> {
        match &self.diagram {
            Diagram::Sliced(plot) => Some(&plot.controller),
            Diagram::Density(_) => None,
        }
    }

    pub fn controller_mut(&mut self) -> Option<&mut SliceController> {
        match &mut self.diagram {
            Diagram::Sliced(plot) => Some(&mut plot.controller),
            Diagram::Density(_) => None,
        }
    }

    pub fn control_at(&self, px: f32, py: f32) -> Option<Control> {
        let Diagram::Sliced(plot) = &self.diagram else {
            return None;
        };
        if plot.slider_rect.contains(px, py) {
            Some(Control::Slider)
        } else if plot.start_rect.contains(px, py) {
            Some(Control::Start)
        } else if plot.stop_rect.contains(px, py) {
            Some(Control::Stop)
        } else {
            None
        }
    }

    /// Slider value under a vertical pixel position, clamped to the track.
    pub fn slider_value_at(&self, py: f32) -> Option<f64> {
        let Diagram::Sliced(plot) = &self.diagram else {
            return None;
        };
        let r = plot.slider_rect;
        let slider = plot.controller.slider();
        let t = ((r.bottom() as f64 - py as f64) / r.h as f64).clamp(0.0, 1.0);
        Some(slider.min + t * (slider.max - slider.min))
    }

    /// Handles a click. Returns whether anything changed.
    pub fn press(&mut self, px: f32, py: f32, now: Instant) -> bool {
        match self.control_at(px, py) {
            Some(Control::Slider) => self.drag_slider(py),
            Some(Control::Start) => self.controller_mut().map(|c| c.start(now)).is_some(),
            Some(Control::Stop) => self.controller_mut().map(|c| c.stop()).is_some(),
            None => false,
        }
    }

    pub fn drag_slider(&mut self, py: f32) -> bool {
        let Some(value) = self.slider_value_at(py) else {
            return false;
        };
        // the slider widget redraws even when the plot is locked by the animation
        self.controller_mut().map(|c| c.slider_changed(value)).is_some()
    }

    /// Moves the slider by `steps` slider steps.
    pub fn nudge_slider(&mut self, steps: f64) -> bool {
        let Some(controller) = self.controller_mut() else {
            return false;
        };
        let slider = controller.slider();
        let value = slider.value() + steps * slider.step;
        controller.slider_changed(value);
        true
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.clear(WHITE);
        let tw = text_width(&self.title, TITLE_SCALE);
        canvas.text(self.width.saturating_sub(tw) / 2, 10, &self.title, BLACK, TITLE_SCALE);

        match &self.diagram {
            Diagram::Density(plot) => plot.draw(canvas, self.alpha),
            Diagram::Sliced(plot) => plot.draw(canvas, self.alpha),
        }
    }

    /// Draws into a fresh canvas of the figure's size.
    pub fn to_canvas(&self) -> Canvas {
        let mut canvas = Canvas::new(self.width, self.height);
        self.draw(&mut canvas);
        canvas
    }
}

impl DensityPlot {
    pub fn axes(&self) -> &[Axes2D] {
        &self.axes
    }

    fn draw(&self, canvas: &mut Canvas, alpha: f32) {
        let xs = self.x.as_slice();
        for (v, axes) in self.axes.iter().enumerate() {
            axes.draw_frame(canvas);
            if axes.rect.is_empty() {
                continue;
            }
            for snapshot in self.history.snapshots() {
                for (&x, &y) in xs.iter().zip(snapshot[v].as_slice()) {
                    if !x.is_finite() || !y.is_finite() {
                        continue;
                    }
                    let (px, py) = axes.to_pixel(x, y);
                    if axes.contains(px, py) {
                        canvas.blend(px, py, BLACK, alpha);
                    }
                }
            }
        }
    }
}

impl SlicedPlot {
    pub fn axes(&self) -> &[Axes3D] {
        &self.axes
    }

    pub fn controller(&self) -> &SliceController {
        &self.controller
    }

    fn draw(&self, canvas: &mut Canvas, alpha: f32) {
        for axes in &self.axes {
            axes.draw_frame(canvas);
        }
        for artifact in self.controller.artifacts() {
            let axes = &self.axes[artifact.variable];
            if axes.rect.is_empty() {
                continue;
            }
            for [x, y, z] in artifact.points() {
                if !z.is_finite() {
                    continue;
                }
                let (px, py) = axes.project(x, y, z);
                if axes.contains(px, py) {
                    canvas.blend(px, py, BLACK, alpha);
                }
            }
        }
        self.draw_widgets(canvas);
    }

    fn draw_widgets(&self, canvas: &mut Canvas) {
        let slider = self.controller.slider();
        let r = self.slider_rect;

        canvas.fill(r, PANEL);
        let filled = (slider.fraction() * r.h as f64) as usize;
        canvas.fill(Rect::new(r.x, r.bottom() - filled, r.w, filled), ACCENT);
        canvas.outline(r, FRAME);

        let label_w = text_width(&slider.label, WIDGET_SCALE);
        let lx = (r.x + r.w / 2).saturating_sub(label_w / 2);
        canvas.text(lx, r.y.saturating_sub(16), &slider.label, BLACK, WIDGET_SCALE);
        let value = format!("{:.3}", slider.value());
        let vw = text_width(&value, WIDGET_SCALE);
        canvas.text((r.x + r.w / 2).saturating_sub(vw / 2), r.bottom() + 6, &value, BLACK, WIDGET_SCALE);

        let animating = self.controller.mode() == Mode::Animating;
        for (rect, label, active) in [(self.start_rect, "start", animating), (self.stop_rect, "stop", !animating)] {
            canvas.fill(rect, if active { ACCENT } else { PANEL });
            canvas.outline(rect, FRAME);
            let tw = text_width(label, WIDGET_SCALE);
            let tx = rect.x + rect.w.saturating_sub(tw) / 2;
            let ty = rect.y + rect.h.saturating_sub(5 * WIDGET_SCALE) / 2;
            canvas.text(tx, ty, label, if active { WHITE } else { BLACK }, WIDGET_SCALE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowConfig;
    use crate::maps::{Gauss, Logistic};
    use crate::progress::Silent;

    fn tiny_config() -> DiagramConfig {
        DiagramConfig {
            window: WindowConfig { width: 1, height: 1, fps: 30 },
            ..DiagramConfig::default()
        }
    }

    #[test]
    fn subplots_share_the_row() {
        let rects = subplot_rects(1000, 500, 2);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].y, rects[1].y);
        assert!(rects[0].right() < rects[1].x);
        assert!(rects[1].right() <= 900);
    }

    #[test]
    fn figure_rect_flips_vertical_axis() {
        let r = figure_rect(1000, 500, [0.75, 0.05, 0.1, 0.075]);
        assert_eq!(r.x, 750);
        assert_eq!(r.w, 100);
        assert!(r.bottom() <= 475 && r.bottom() >= 474);
    }

    #[test]
    fn degenerate_window_draws_without_panicking() {
        let config = tiny_config();
        let renderer = DiagramRenderer::new(&config);

        let mut engine = SimulationEngine::from_setup(Logistic::preset(20).unwrap()).unwrap();
        engine.iterate_field(30, 5, &mut Silent).unwrap();
        let figure = renderer.render_engine(&engine);
        assert_eq!(figure.to_canvas().buffer().len(), 1);

        let mut engine = SimulationEngine::from_setup(Gauss::preset(6).unwrap()).unwrap();
        engine.iterate_field(30, 5, &mut Silent).unwrap();
        let figure = renderer.render_engine(&engine);
        assert_eq!(figure.to_canvas().buffer().len(), 1);
    }
}
