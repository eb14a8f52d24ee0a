use std::time::Instant;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use tracing::info;

use crate::canvas::Canvas;
use crate::config::WindowConfig;
use crate::error::DiagramError;
use crate::render::{Control, Figure};

/// Tracks whether the current mouse press started on the slider, so that
/// dragging keeps scrubbing even when the cursor leaves the track.
#[derive(Default)]
struct Pointer {
    was_down: bool,
    dragging_slider: bool,
}

/// Opens a window for `figure` and runs the event loop on the calling
/// thread until the window is closed or Escape is pressed.
pub fn run(mut figure: Figure, options: &WindowConfig) -> Result<(), DiagramError> {
    let (width, height) = figure.size();
    let mut window = Window::new(figure.title(), width, height, WindowOptions::default())?;
    window.set_target_fps(options.fps);
    info!(title = figure.title(), width, height, "window opened");

    let mut canvas = Canvas::new(width, height);
    let mut pointer = Pointer::default();
    let mut dirty = true;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let now = Instant::now();

        let down = window.get_mouse_down(MouseButton::Left);
        if let Some((mx, my)) = window.get_mouse_pos(MouseMode::Discard) {
            if down && !pointer.was_down {
                pointer.dragging_slider = figure.control_at(mx, my) == Some(Control::Slider);
                dirty |= figure.press(mx, my, now);
            } else if down && pointer.dragging_slider {
                dirty |= figure.drag_slider(my);
            }
        }
        if !down {
            pointer.dragging_slider = false;
        }
        pointer.was_down = down;

        if window.is_key_pressed(Key::Up, KeyRepeat::Yes) {
            dirty |= figure.nudge_slider(1.0);
        }
        if window.is_key_pressed(Key::Down, KeyRepeat::Yes) {
            dirty |= figure.nudge_slider(-1.0);
        }
        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            if let Some(controller) = figure.controller_mut() {
                controller.toggle(now);
                dirty = true;
            }
        }

        if let Some(controller) = figure.controller_mut() {
            dirty |= controller.tick(now);
        }

        if dirty {
            figure.draw(&mut canvas);
            window.update_with_buffer(canvas.buffer(), width, height)?;
            dirty = false;
        } else {
            window.update();
        }
    }

    info!(title = figure.title(), "window closed");
    Ok(())
}
