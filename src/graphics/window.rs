//! The window, its OpenGL context, and the keyboard state the frame loop polls.
//!
//! winit delivers input through an event loop that wants to own the thread. The frame loop
//! wants the opposite: ask "is Escape down?" once per frame and then hand control back. So
//! [`GlWindow::poll_events`] pumps whatever is pending with `run_return` and records it in an
//! [`InputState`] that can be queried at any time between polls.

use std::any::Any;
use std::collections::HashSet;
use std::panic;

use gl;
use glutin::dpi::{LogicalSize, PhysicalSize};
use glutin::event::{ElementState, Event, VirtualKeyCode, WindowEvent};
use glutin::event_loop::{ControlFlow, EventLoop};
use glutin::platform::run_return::EventLoopExtRunReturn;
use glutin::window::WindowBuilder;
use glutin::{Api, ContextBuilder, ContextError, GlProfile, GlRequest, PossiblyCurrent, WindowedContext};

use super::error::GlError;
use super::utils::gl_string;

/// Everything about the window besides its size and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowHints {
    pub resizable: bool,
    pub vsync: bool,
    /// Requested core profile version, `(major, minor)`
    pub gl_version: (u8, u8),
}

impl Default for WindowHints {
    fn default() -> Self {
        WindowHints {
            resizable: true,
            vsync: true,
            gl_version: (3, 3),
        }
    }
}

/// Keys currently held down, and whether anybody has asked the window to close.
#[derive(Debug, Default)]
pub struct InputState {
    pressed: HashSet<VirtualKeyCode>,
    should_close: bool,
}

impl InputState {
    pub fn key_event(&mut self, key: Option<VirtualKeyCode>, state: ElementState) {
        // Keys the platform can't map to a virtual code can't be asked about either
        let key = match key {
            Some(k) => k,
            None => return,
        };

        match state {
            ElementState::Pressed => { self.pressed.insert(key); }
            ElementState::Released => { self.pressed.remove(&key); }
        }
    }

    /// Whether `key` is down as of the last poll.
    pub fn key(&self, key: VirtualKeyCode) -> ElementState {
        if self.pressed.contains(&key) {
            ElementState::Pressed
        } else {
            ElementState::Released
        }
    }

    pub fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }

    pub fn should_close(&self) -> bool {
        self.should_close
    }
}

pub struct GlWindow {
    events: EventLoop<()>,
    context: WindowedContext<PossiblyCurrent>,
    input: InputState,
}

impl GlWindow {
    /// Opens a window with a core profile context, makes the context current on this thread and
    /// loads the GL function pointers. Nothing in [`super::opengl`] may be called before this.
    pub fn create(width: u32, height: u32, title: &str, hints: &WindowHints) -> Result<Self, GlError> {
        if width == 0 || height == 0 {
            return Err(GlError::Window(format!(
                "window size must be positive, got {}x{}",
                width, height
            )));
        }

        let events = event_loop()?;

        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width as f64, height as f64))
            .with_resizable(hints.resizable);

        let context = ContextBuilder::new()
            .with_gl(GlRequest::Specific(Api::OpenGl, hints.gl_version))
            .with_gl_profile(GlProfile::Core)
            .with_depth_buffer(24)
            .with_vsync(hints.vsync)
            .build_windowed(window, &events)
            .map_err(|e| GlError::Window(e.to_string()))?;

        let context = unsafe { context.make_current() }
            .map_err(|(_, e)| GlError::Window(format!("could not make the context current: {}", e)))?;

        gl::load_with(|symbol| context.get_proc_address(symbol) as *const _);

        log::info!(
            "OpenGL {} on {} ({})",
            gl_string(gl::VERSION),
            gl_string(gl::RENDERER),
            gl_string(gl::VENDOR)
        );

        let size = context.window().inner_size();
        set_viewport(size);
        log::debug!("opened \"{}\" at {}x{} physical pixels", title, size.width, size.height);

        Ok(Self {
            events,
            context,
            input: InputState::default(),
        })
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn should_close(&self) -> bool {
        self.input.should_close()
    }

    /// Handles every event that's pending and returns as soon as the queue is empty.
    pub fn poll_events(&mut self) {
        let GlWindow { events, context, input } = self;

        // The loop starts out polling, so it only stops once it runs out of events
        events.run_return(|event, _, control_flow| {
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => input.set_should_close(true),
                    WindowEvent::KeyboardInput { input: key, .. } => {
                        input.key_event(key.virtual_keycode, key.state)
                    }
                    WindowEvent::Resized(size) => {
                        context.resize(size);
                        set_viewport(size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        context.resize(*new_inner_size);
                        set_viewport(*new_inner_size);
                    }
                    _ => {}
                },
                Event::MainEventsCleared => *control_flow = ControlFlow::Exit,
                _ => {}
            }
        });
    }

    pub fn swap_buffers(&self) -> Result<(), ContextError> {
        self.context.swap_buffers()
    }
}

/// winit panics instead of returning an error when it can't start (no display, or not on the
/// main thread). The panic is caught quietly and its message becomes the error.
fn event_loop() -> Result<EventLoop<()>, GlError> {
    let hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let events = panic::catch_unwind(EventLoop::new);
    panic::set_hook(hook);

    events.map_err(|payload| GlError::Window(panic_message(&*payload)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("no windowing system is available")
    }
}

fn set_viewport(size: PhysicalSize<u32>) {
    log::trace!("viewport is now {}x{}", size.width, size.height);
    unsafe {
        gl::Viewport(0, 0, size.width as i32, size.height as i32);
    }
}
