#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod surface;
mod ui;
mod window;

use app::ViewerApp;
use surface::{FrameSurface, RenderError};
use ui::ViewerUi;
use window::{create_window, ControlFlow, Event, Window, WindowEvent};

const WINDOW_TITLE: &str = concat!("Matchview ", env!("CARGO_PKG_VERSION"));
const WINDOW_WIDTH: u32 = 1100;
const WINDOW_HEIGHT: u32 = 720;

fn main() {
    let (event_loop, window) = create_window(WINDOW_TITLE, WINDOW_WIDTH, WINDOW_HEIGHT)
        .unwrap_or_else(|err| {
            eprintln!("window init failed: {}", err);
            std::process::exit(1);
        });
    let window: &'static Window = Box::leak(Box::new(window));
    let main_window_id = window.id();

    let mut surface = FrameSurface::new(window).unwrap_or_else(|err| {
        eprintln!("renderer init failed: {}", err);
        std::process::exit(1);
    });
    let mut ui = ViewerUi::new(window, surface.device(), surface.surface_format());
    let mut app = ViewerApp::new();

    window.set_visible(true);

    if let Err(err) = event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, window_id } if window_id == main_window_id => {
                let _ = ui.handle_window_event(window, &event);
                match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => {
                        if size.width > 0 && size.height > 0 {
                            surface.resize(size);
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = surface.window_inner_size();
                        if size.width > 0 && size.height > 0 {
                            surface.resize(size);
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let size = window.inner_size();
                        if size.width == 0 || size.height == 0 {
                            return;
                        }
                        if size != surface.size() {
                            surface.resize(size);
                        }
                        let draw_data = ui.draw_frame(window, size, |ctx| app.frame(ctx));

                        let render_result = surface.render_with_overlay(
                            |device, queue, encoder, view, _format| {
                                ui.paint(device, queue, encoder, view, &draw_data);
                            },
                        );
                        match render_result {
                            Ok(()) => {}
                            Err(RenderError::Lost | RenderError::Outdated) => {
                                let size = surface.window_inner_size();
                                if size.width > 0 && size.height > 0 {
                                    surface.resize(size);
                                }
                            }
                            Err(RenderError::OutOfMemory) => {
                                eprintln!("render error: out of memory");
                                elwt.exit();
                            }
                            Err(RenderError::Timeout) => {}
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                app.shutdown();
            }
            _ => {}
        }
    }) {
        eprintln!("event loop exited with error: {}", err);
    }
}
