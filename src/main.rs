use std::time::{Duration, Instant};

use anyhow::Result;
use ember_fountain::settings::Settings;
use winit::{
    dpi::LogicalSize,
    event::{DeviceEvent, ElementState, Event, KeyboardInput, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

mod app;

use app::App;

fn main() -> Result<()> {
    env_logger::init();

    let settings = Settings::from_env();
    let target_frame_interval = Duration::from_secs_f64(1.0 / settings.frames_per_second);

    let event_loop = EventLoop::new();

    let window = WindowBuilder::new()
        .with_title("Ember Fountain")
        .with_inner_size(LogicalSize::<u32> {
            width: settings.window_width,
            height: settings.window_height,
        })
        .build(&event_loop)?;

    let mut last_render_inst = Instant::now();

    let mut app = App::new(window, settings)?;

    event_loop.run(move |e, _, control_flow| {
        match e {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                WindowEvent::Resized(size) => app.on_resize(size),
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    app.on_resize(*new_inner_size)
                }
                WindowEvent::MouseInput {
                    state: ElementState::Released,
                    button: MouseButton::Left,
                    ..
                } => app.on_mouse_up(),
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state,
                            virtual_keycode: Some(keycode),
                            ..
                        },
                    ..
                } => app.on_key(keycode, state),
                _ => (),
            },
            Event::DeviceEvent { event, .. } => match event {
                DeviceEvent::MouseMotion { delta } => app.on_mouse_move(delta),
                DeviceEvent::MouseWheel { delta } => app.on_mouse_scroll(delta),
                _ => (),
            },
            Event::MainEventsCleared => {
                let since_last_frame = last_render_inst.elapsed();
                if let Some(wait) = frame_wait(target_frame_interval, since_last_frame) {
                    *control_flow = ControlFlow::WaitUntil(Instant::now() + wait);
                    return;
                }

                app.render();

                last_render_inst = Instant::now();
            }
            _ => (),
        }

        if app.exit_requested() {
            *control_flow = ControlFlow::Exit;
        }
    });
}

/// Time left before the next frame is due, or `None` if it is due now.
fn frame_wait(target_interval: Duration, since_last_frame: Duration) -> Option<Duration> {
    target_interval
        .checked_sub(since_last_frame)
        .filter(|wait| !wait.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_until_the_frame_is_due() {
        let target = Duration::from_millis(16);
        assert_eq!(
            frame_wait(target, Duration::from_millis(10)),
            Some(Duration::from_millis(6))
        );
        assert_eq!(frame_wait(target, target), None);
        assert_eq!(frame_wait(target, Duration::from_millis(40)), None);
    }
}
