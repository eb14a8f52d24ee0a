pub mod axes;
pub mod canvas;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod maps;
pub mod progress;
pub mod render;
pub mod slice;
pub mod viewer;

pub use config::{AnimationConfig, DiagramConfig, ProgressConfig, WindowConfig};
pub use engine::{HistoryWindow, SimulationEngine};
pub use error::{ConfigFileError, ConfigurationError, DiagramError, IterationError};
pub use grid::{Field, ParameterSet, RenderStrategy, VariableSet, linspace, meshgrid};
pub use maps::{Duffing, Gauss, Henon, Logistic, Map, Setup};
pub use progress::{ProgressBar, ProgressReporter, Silent};
pub use render::{Control, Diagram, DiagramRenderer, Figure};
pub use slice::{AnimationState, Mode, SliceController, frame_index, slice_index};

/// Runs `iterations` steps with a stdout progress bar, then builds the figure.
pub fn plot_bifurcation_diagram<M: Map>(
    engine: &mut SimulationEngine<M>,
    config: &DiagramConfig,
) -> Result<Figure, DiagramError> {
    println!("Iterating {}...", engine.name());
    let mut progress = ProgressBar::stdout(config.progress.width, config.progress.step);
    engine.iterate_field(config.iterations, config.last_num, &mut progress)?;
    Ok(DiagramRenderer::new(config).render_engine(engine))
}
