use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bifurcation::axes::Limits;
use bifurcation::canvas::{GRID, WHITE};
use bifurcation::{
    AnimationConfig, AnimationState, Control, Diagram, DiagramConfig, DiagramRenderer, Figure,
    Gauss, Logistic, Mode, SimulationEngine, Silent, WindowConfig, linspace, slice_index,
};

const ALPHA_POINTS: usize = 11;
const BETA_POINTS: usize = 5;

fn test_config() -> DiagramConfig {
    DiagramConfig {
        window: WindowConfig { width: 600, height: 300, fps: 30 },
        animation: AnimationConfig { frames: 10, interval_ms: 20 },
        ..DiagramConfig::default()
    }
}

fn gauss_engine() -> SimulationEngine<Gauss> {
    let alpha = linspace(3.0, 12.0, ALPHA_POINTS);
    let beta = linspace(-1.0, 1.0, BETA_POINTS);
    let x0 = bifurcation::Field::filled(BETA_POINTS, ALPHA_POINTS, 1e-5);
    let setup = Gauss::setup(&alpha, &beta, x0).unwrap();
    let mut engine = SimulationEngine::from_setup(setup).unwrap();
    engine.iterate_field(30, 4, &mut Silent).unwrap();
    engine
}

fn gauss_figure() -> (SimulationEngine<Gauss>, Figure) {
    let engine = gauss_engine();
    let figure = DiagramRenderer::new(&test_config()).render_engine(&engine);
    (engine, figure)
}

#[test]
fn artifacts_start_at_middle_column() {
    let (engine, figure) = gauss_figure();
    let controller = figure.controller().expect("two parameters give a sliced plot");
    assert_eq!(controller.grid_size(), ALPHA_POINTS);
    assert_eq!(controller.current_index(), ALPHA_POINTS / 2);
    assert_eq!(controller.artifacts().len(), engine.window().len());
    assert_eq!(controller.mutation_count(), 0);
    assert_eq!(controller.mode(), Mode::Idle);

    let alpha = engine.params().get("alpha").unwrap();
    let beta = engine.params().get("beta").unwrap();
    for artifact in controller.artifacts() {
        let expected_z = engine.window().snapshot(artifact.snapshot)[artifact.variable].column(5);
        let points: Vec<[f64; 3]> = artifact.points().collect();
        assert_eq!(points.len(), BETA_POINTS);
        for (row, [x, y, z]) in points.into_iter().enumerate() {
            assert_eq!(x, alpha.get(row, 5));
            assert_eq!(y, beta.get(row, 5));
            assert_eq!(z, expected_z[row]);
        }
    }
}

#[test]
fn slider_maps_range_ends_to_grid_ends() {
    let (engine, mut figure) = gauss_figure();
    let controller = figure.controller_mut().unwrap();

    assert!(controller.slider_changed(3.0));
    assert_eq!(controller.current_index(), 0);
    assert!(controller.slider_changed(12.0));
    assert_eq!(controller.current_index(), ALPHA_POINTS - 1);
    assert!(controller.slider_changed(99.0));
    assert_eq!(controller.current_index(), ALPHA_POINTS - 1);

    let last = engine.window().snapshot(0)[0].column(ALPHA_POINTS - 1);
    assert_eq!(controller.artifacts()[0].zs(), last.as_slice());
}

#[test]
fn slice_index_is_monotonic_and_in_range() {
    let mut rng = StdRng::seed_from_u64(0x5EED_F00D);
    for _ in 0..50 {
        let min: f64 = rng.gen_range(-10.0..10.0);
        let max = min + rng.gen_range(0.1..20.0);
        let n = rng.gen_range(1..2000);

        assert_eq!(slice_index(min, min, max, n), 0);
        assert_eq!(slice_index(max, min, max, n), n - 1);

        let mut values: Vec<f64> = (0..100).map(|_| rng.gen_range(min - 5.0..max + 5.0)).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let indices: Vec<usize> = values.iter().map(|&v| slice_index(v, min, max, n)).collect();
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));
        assert!(indices.iter().all(|&i| i < n));
    }
}

#[test]
fn animation_and_slider_never_both_mutate() {
    let (_engine, mut figure) = gauss_figure();
    let controller = figure.controller_mut().unwrap();
    let t0 = Instant::now();
    let interval = Duration::from_millis(20);

    controller.start(t0);
    assert_eq!(controller.mode(), Mode::Animating);
    // a fresh animation resets to the first column
    assert_eq!(controller.current_index(), 0);
    let after_start = controller.mutation_count();
    assert_eq!(after_start, 1);

    assert!(!controller.slider_changed(7.5));
    assert_eq!(controller.mutation_count(), after_start);
    assert_eq!(controller.current_index(), 0);

    assert!(controller.tick(t0));
    assert!(!controller.tick(t0 + interval / 2));
    assert!(controller.tick(t0 + interval));
    assert_eq!(controller.mutation_count(), after_start + 2);
    // frame 1 of 10 over 11 columns
    assert_eq!(controller.current_index(), 1);

    controller.stop();
    assert_eq!(controller.mode(), Mode::Idle);
    assert_eq!(controller.animation_state(), AnimationState::Paused { frame: 2 });
    let after_stop = controller.mutation_count();
    assert!(!controller.tick(t0 + interval * 10));
    assert_eq!(controller.mutation_count(), after_stop);

    assert!(controller.slider_changed(3.0));
    assert_eq!(controller.mutation_count(), after_stop + 1);
    assert_eq!(controller.current_index(), 0);
}

#[test]
fn restart_resumes_instead_of_resetting() {
    let (_engine, mut figure) = gauss_figure();
    let controller = figure.controller_mut().unwrap();
    let t0 = Instant::now();

    controller.start(t0);
    controller.tick(t0);
    controller.tick(t0 + Duration::from_millis(20));
    controller.tick(t0 + Duration::from_millis(40));
    controller.stop();
    assert!(controller.slider_changed(12.0));
    let before = controller.mutation_count();

    let t1 = t0 + Duration::from_secs(1);
    controller.start(t1);
    assert_eq!(controller.mutation_count(), before);
    assert_eq!(controller.current_index(), ALPHA_POINTS - 1);
    assert!(!controller.tick(t1));
    assert!(controller.tick(t1 + Duration::from_millis(20)));
    // frame 3 of 10 over 11 columns
    assert_eq!(controller.current_index(), 3);
}

#[test]
fn arrow_keys_step_the_slider() {
    let (_engine, mut figure) = gauss_figure();
    let t0 = Instant::now();

    assert!(figure.nudge_slider(1.0));
    let controller = figure.controller().unwrap();
    assert_eq!(controller.current_index(), ALPHA_POINTS - 1);
    assert_eq!(controller.mutation_count(), 1);

    figure.controller_mut().unwrap().start(t0);
    let controller = figure.controller().unwrap();
    let locked_index = controller.current_index();
    let locked_mutations = controller.mutation_count();
    let locked_zs = controller.artifacts()[0].zs().to_vec();
    let before = controller.slider().value();

    // the widget moves but the plotted slice stays with the animation
    assert!(figure.nudge_slider(-1.0));
    let controller = figure.controller().unwrap();
    assert!(controller.slider().value() < before);
    assert_eq!(controller.current_index(), locked_index);
    assert_eq!(controller.mutation_count(), locked_mutations);
    assert_eq!(controller.artifacts()[0].zs(), locked_zs.as_slice());

    figure.controller_mut().unwrap().stop();
    assert!(figure.nudge_slider(-1.0));
    let controller = figure.controller().unwrap();
    assert_eq!(controller.current_index(), 0);
    assert_eq!(controller.mutation_count(), locked_mutations + 1);
}

#[test]
fn nudging_a_density_figure_does_nothing() {
    let setup = Logistic::preset(20).unwrap();
    let mut engine = SimulationEngine::from_setup(setup).unwrap();
    engine.iterate_field(30, 5, &mut Silent).unwrap();
    let mut figure = DiagramRenderer::new(&test_config()).render_engine(&engine);
    assert!(!figure.nudge_slider(1.0));
}

#[test]
fn buttons_and_slider_respond_to_clicks() {
    let (_engine, mut figure) = gauss_figure();
    let now = Instant::now();

    assert_eq!(figure.control_at(480.0, 273.0), Some(Control::Start));
    assert_eq!(figure.control_at(546.0, 273.0), Some(Control::Stop));
    assert_eq!(figure.control_at(300.0, 150.0), None);

    assert!(figure.press(57.0, 254.0, now));
    assert_eq!(figure.controller().unwrap().current_index(), 0);

    assert!(figure.press(480.0, 273.0, now));
    assert_eq!(figure.controller().unwrap().mode(), Mode::Animating);
    assert!(figure.press(546.0, 273.0, now));
    assert_eq!(figure.controller().unwrap().mode(), Mode::Idle);
}

#[test]
fn z_limits_cover_the_whole_window() {
    let (engine, figure) = gauss_figure();
    let Diagram::Sliced(plot) = figure.diagram() else {
        panic!("expected a sliced diagram");
    };
    let (lo, hi) = engine.window().variable_range(0).unwrap();
    assert_eq!(plot.axes()[0].z, Limits::new(lo, hi));
}

#[test]
fn density_plot_marks_pixels() {
    let setup = Logistic::preset(200).unwrap();
    let mut engine = SimulationEngine::from_setup(setup).unwrap();
    engine.iterate_field(300, 50, &mut Silent).unwrap();
    let figure = DiagramRenderer::new(&test_config()).render_engine(&engine);
    assert!(figure.controller().is_none());

    let Diagram::Density(plot) = figure.diagram() else {
        panic!("expected a density diagram");
    };
    let rect = plot.axes()[0].rect;
    assert_eq!(plot.axes()[0].x, Limits::new(2.7, 4.0));

    let canvas = figure.to_canvas();
    let marked = (rect.y + 1..rect.bottom() - 1)
        .flat_map(|y| (rect.x + 1..rect.right() - 1).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let p = canvas.pixel(x, y);
            p != WHITE && p != GRID
        })
        .count();
    assert!(marked > 100, "only {} plotted pixels", marked);
}
