//! The winit application driving an [`Engine`] in a window.
//!
//! Input arriving between two redraws is queued and handed to the engine
//! with the next frame. A stopped loop or a fatal error exits the event loop;
//! the error is returned from [`run`].

use std::sync::Arc;

use anyhow::Context as _;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    config::EngineConfig,
    context::Context,
    flow::{Engine, LoopState},
    geometry::WgpuStore,
    pipelines::shader::{BASE_SHADER, Shader},
    render::WgpuRenderer,
    resources::{load_string, prefetch_textures},
    scene::{InputEvent, Level},
};

type WindowEngine = Engine<WgpuStore, WgpuRenderer>;

struct App {
    async_runtime: tokio::runtime::Runtime,
    config: EngineConfig,
    level: Option<Level>,
    engine: Option<WindowEngine>,
    pending: Vec<InputEvent>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: EngineConfig, level: Level) -> anyhow::Result<Self> {
        let async_runtime =
            tokio::runtime::Runtime::new().context("could not start the async runtime")?;
        Ok(Self {
            async_runtime,
            config,
            level: Some(level),
            engine: None,
            pending: Vec::new(),
            error: None,
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<WindowEngine> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("could not create the window")?,
        );
        let mut level = self.level.take().context("level was already handed out")?;

        let config = &self.config;
        let init_future = async move {
            let ctx = Context::new(window, config).await?;
            let source = match &config.shader {
                Some(path) => load_string(&config.assets_dir, path).await?,
                None => BASE_SHADER.to_string(),
            };
            let shader = Shader::parse(&source)?;
            prefetch_textures(&config.assets_dir, &mut level).await?;
            anyhow::Ok((ctx, shader, level))
        };
        let (ctx, shader, level) = self.async_runtime.block_on(init_future)?;

        let renderer = WgpuRenderer::new(ctx, &shader, &self.config);
        let store = renderer.vertex_store();
        let mut engine = Engine::new(store, renderer, &self.config);
        engine.load_level(level)?;
        Ok(engine)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(engine) => {
                engine.renderer().context().window().request_redraw();
                self.engine = Some(engine);
            }
            Err(e) => self.fail(event_loop, e.context("engine initialization failed")),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if self.engine.is_some() {
            self.pending.push(InputEvent::Device(event));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let engine = match &mut self.engine {
            Some(engine) => engine,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => self.pending.push(InputEvent::Quit),
            WindowEvent::Resized(size) => engine
                .renderer_mut()
                .context_mut()
                .resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let events = std::mem::take(&mut self.pending);
                match engine.frame(events) {
                    Ok(LoopState::Running) => {}
                    Ok(LoopState::Stopped) => event_loop.exit(),
                    Err(e) => self.fail(event_loop, e.into()),
                }
            }
            event => self.pending.push(InputEvent::Window(event)),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(engine) = &self.engine {
            engine.renderer().context().window().request_redraw();
        }
    }
}

/// Open a window and run `level` until it quits.
///
/// Initialization failures (window, GPU device, shader, level load) and
/// fatal frame errors are logged and returned.
pub fn run(config: EngineConfig, level: Level) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new().context("could not create the event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, level)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
