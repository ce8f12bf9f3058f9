//! Engine context and the per-frame update loop.
//!
//! [`Engine`] owns the geometry buffer, the renderer and the current level.
//! Loading a level and running a frame both take `&mut self`, so a level swap
//! can never interleave with a frame.
//!
//! # Frame
//!
//! Every iteration runs to completion in this order:
//!
//! 1. measure the wall-clock delta since the previous iteration
//! 2. hand the queued input events to every controller
//! 3. tick each actor, then resolve its collisions
//! 4. regroup the actors by model
//! 5. tick every camera and pick the active one
//! 6. draw
//! 7. log the frame timing
//!
//! A quit request (an [`InputEvent::Quit`] or a controller returning
//! [`Signal::Quit`]) lets the current iteration finish and stops the loop
//! afterwards, also when the iteration fails.

use instant::{Duration, Instant};

use crate::{
    batch::{InstanceBatcher, InstanceBatches},
    builder::{BufferBuilder, LevelLayout},
    camera::tick_cameras,
    config::EngineConfig,
    error::EngineError,
    geometry::{GeometryBuffer, VertexStore},
    render::{Frame, Renderer},
    scene::{InputEvent, Level, Signal},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Running,
    Stopped,
}

/// Loop state that survives between frames.
#[derive(Debug, Default)]
pub struct FrameLoop {
    state: LoopState,
    batcher: InstanceBatcher,
    last_frame: Option<Instant>,
    frames: u64,
    log_timing: bool,
}

impl FrameLoop {
    pub fn new(log_timing: bool) -> Self {
        Self {
            log_timing,
            ..Default::default()
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn next_delta(&mut self) -> Duration {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last))
            .unwrap_or_default();
        self.last_frame = Some(now);
        dt
    }

    fn log_timing(&self, dt: Duration) {
        let fps = if dt.is_zero() {
            0.0
        } else {
            1.0 / dt.as_secs_f64()
        };
        if self.log_timing {
            log::info!("frame {}: {:?} ({:.1} fps)", self.frames, dt, fps);
        } else {
            log::trace!("frame {}: {:?} ({:.1} fps)", self.frames, dt, fps);
        }
    }
}

pub struct Engine<S: VertexStore, R: Renderer<S>> {
    geometry: GeometryBuffer<S>,
    renderer: R,
    level: Option<Level>,
    frame_loop: FrameLoop,
}

impl<S: VertexStore, R: Renderer<S>> Engine<S, R> {
    pub fn new(store: S, renderer: R, config: &EngineConfig) -> Self {
        Self {
            geometry: GeometryBuffer::new(store),
            renderer,
            level: None,
            frame_loop: FrameLoop::new(config.log_timing),
        }
    }

    /// Make `level` the current level, replacing the previous one.
    ///
    /// The previous level is dropped even when loading fails; frames then
    /// report [`EngineError::NoLevel`] until a level loads.
    pub fn load_level(&mut self, mut level: Level) -> Result<LevelLayout, EngineError> {
        self.level = None;
        if level.cameras.is_empty() {
            return Err(EngineError::NoCamera(level.name));
        }
        let layout = BufferBuilder::load_level(&mut self.geometry, &mut self.renderer, &mut level)?;
        self.level = Some(level);
        self.frame_loop.last_frame = None;
        Ok(layout)
    }

    /// Run one iteration timed by the wall clock.
    pub fn frame(
        &mut self,
        events: impl IntoIterator<Item = InputEvent>,
    ) -> Result<LoopState, EngineError> {
        if self.frame_loop.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }
        let dt = self.frame_loop.next_delta();
        self.frame_with_delta(events, dt)
    }

    /// Run one iteration with a fixed delta.
    pub fn frame_with_delta(
        &mut self,
        events: impl IntoIterator<Item = InputEvent>,
        dt: Duration,
    ) -> Result<LoopState, EngineError> {
        if self.frame_loop.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }
        let mut quit = false;
        let result = self.step(events, dt, &mut quit);
        if quit {
            log::info!("quit requested, stopping after frame {}", self.frame_loop.frames);
            self.frame_loop.state = LoopState::Stopped;
        }
        result.map(|()| self.frame_loop.state)
    }

    // `quit` is raised as soon as an event asks for it, so an iteration that
    // fails later still stops the loop.
    fn step(
        &mut self,
        events: impl IntoIterator<Item = InputEvent>,
        dt: Duration,
        quit: &mut bool,
    ) -> Result<(), EngineError> {
        let Some(level) = self.level.as_mut() else {
            *quit |= events.into_iter().any(|event| matches!(event, InputEvent::Quit));
            return Err(EngineError::NoLevel);
        };

        for event in events {
            *quit |= matches!(event, InputEvent::Quit);
            for controller in level.controllers.iter_mut() {
                *quit |= controller.on_event(&event, &mut level.actors) == Signal::Quit;
            }
        }

        for idx in 0..level.actors.len() {
            level.actors[idx].tick(dt);
            level.collision.resolve(idx, &mut level.actors);
        }

        let batches = self
            .frame_loop
            .batcher
            .rebuild(&level.actors, level.models.len())?;

        let active = tick_cameras(&mut level.cameras, dt, &level.actors)
            .ok_or_else(|| EngineError::NoCamera(level.name.clone()))?;

        let frame = Frame {
            camera: level.cameras[active].view(),
            sky_block: &level.sky_block,
            terrain: &level.terrain,
            models: &level.models,
            actors: &level.actors,
            batches,
        };
        match self.renderer.draw(&self.geometry, &frame) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                log::warn!("skipping frame {}: {}", self.frame_loop.frames, e);
                self.renderer.recover(&e);
            }
            Err(e) => return Err(e.into()),
        }

        self.frame_loop.frames += 1;
        self.frame_loop.log_timing(dt);
        Ok(())
    }

    pub fn state(&self) -> LoopState {
        self.frame_loop.state
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    /// Actor grouping of the last frame.
    pub fn batches(&self) -> &InstanceBatches {
        self.frame_loop.batcher.batches()
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }

    pub fn geometry(&self) -> &GeometryBuffer<S> {
        &self.geometry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
