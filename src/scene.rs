//! Levels and the collaborators living in them: actors, controllers and
//! collision resolution.
//!
//! A [`Level`] owns everything that is active at one time: the sky block and
//! terrain models, the models actors are drawn with, the textures those models
//! use, and the actors, cameras and controllers ticked each frame.

use std::fmt::Debug;

use instant::Duration;
use winit::{
    event::{DeviceEvent, ElementState, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    camera::Camera,
    data_structures::{
        instance::Transform,
        model::{Model, ModelId, TextureId, TextureSource},
        vertex::VERTEX_SIZE,
    },
};

/// An entity drawn with one of its level's models.
pub trait Actor {
    /// Advance the actor by `dt`. May move it or switch its model.
    fn tick(&mut self, dt: Duration);

    /// The model this actor is currently drawn with.
    fn model(&self) -> ModelId;

    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    /// Called by collision resolution when this actor overlaps `other`.
    fn on_collision(&mut self, _other: &Transform) {}
}

// Lets `Level` list its actors in debug output
impl Debug for dyn Actor + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor")
            .field("model", &self.model())
            .field("position", &self.transform().position)
            .finish()
    }
}

/// Input queued between two frames and handed to every controller.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Window(WindowEvent),
    Device(DeviceEvent),
    /// The window was asked to close.
    Quit,
}

/// What a controller wants the frame loop to do next.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Signal {
    #[default]
    Continue,
    Quit,
}

/// Turns input events into actor changes or a quit request.
pub trait Controller {
    fn on_event(&mut self, event: &InputEvent, actors: &mut [Box<dyn Actor>]) -> Signal;
}

/// Requests a quit when Escape is pressed.
#[derive(Clone, Copy, Debug, Default)]
pub struct EscapeToQuit;

impl Controller for EscapeToQuit {
    fn on_event(&mut self, event: &InputEvent, _: &mut [Box<dyn Actor>]) -> Signal {
        match event {
            InputEvent::Window(WindowEvent::KeyboardInput { event, .. })
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                Signal::Quit
            }
            _ => Signal::Continue,
        }
    }
}

/// Pairwise collision hook run right after each actor's tick.
pub trait Collision {
    /// Check `actors[actor]` against every other actor and react to overlaps.
    fn resolve(&mut self, actor: usize, actors: &mut [Box<dyn Actor>]);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoCollision;

impl Collision for NoCollision {
    fn resolve(&mut self, _: usize, _: &mut [Box<dyn Actor>]) {}
}

/// Bounding-sphere overlap test.
///
/// Each actor is a sphere of `radius` times its largest scale component.
/// On overlap only the resolved actor is notified; the other side gets its
/// own call when its turn comes.
#[derive(Clone, Copy, Debug)]
pub struct SphereCollision {
    pub radius: f32,
}

impl SphereCollision {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl Collision for SphereCollision {
    fn resolve(&mut self, actor: usize, actors: &mut [Box<dyn Actor>]) {
        let Some(current) = actors.get(actor).map(|a| *a.transform()) else {
            return;
        };
        let reach = self.radius * current.max_scale();
        let hits: Vec<Transform> = actors
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != actor)
            .map(|(_, other)| *other.transform())
            .filter(|other| {
                let limit = reach + self.radius * other.max_scale();
                cgmath::InnerSpace::magnitude2(other.position - current.position) < limit * limit
            })
            .collect();
        for other in hits.iter() {
            actors[actor].on_collision(other);
        }
    }
}

/// Everything active at one time.
pub struct Level {
    pub name: String,
    pub sky_block: Model,
    pub terrain: Model,
    pub models: Vec<Model>,
    pub textures: Vec<TextureSource>,
    pub actors: Vec<Box<dyn Actor>>,
    pub cameras: Vec<Box<dyn Camera>>,
    pub controllers: Vec<Box<dyn Controller>>,
    pub collision: Box<dyn Collision>,
}

impl Level {
    pub fn new(name: &str, sky_block: Model, terrain: Model) -> Self {
        Self {
            name: name.to_string(),
            sky_block,
            terrain,
            models: Vec::new(),
            textures: Vec::new(),
            actors: Vec::new(),
            cameras: Vec::new(),
            controllers: Vec::new(),
            collision: Box::new(NoCollision),
        }
    }

    pub fn add_model(&mut self, model: Model) -> ModelId {
        self.models.push(model);
        ModelId(self.models.len() - 1)
    }

    pub fn add_texture(&mut self, texture: TextureSource) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn spawn(&mut self, actor: impl Actor + 'static) -> usize {
        self.actors.push(Box::new(actor));
        self.actors.len() - 1
    }

    pub fn add_camera(&mut self, camera: impl Camera + 'static) {
        self.cameras.push(Box::new(camera));
    }

    pub fn add_controller(&mut self, controller: impl Controller + 'static) {
        self.controllers.push(Box::new(controller));
    }

    pub fn with_collision(mut self, collision: impl Collision + 'static) -> Self {
        self.collision = Box::new(collision);
        self
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.0)
    }

    /// Sky block, terrain, then the model collection: the order the geometry
    /// buffer is filled in.
    pub fn all_models(&self) -> impl Iterator<Item = &Model> {
        [&self.sky_block, &self.terrain]
            .into_iter()
            .chain(self.models.iter())
    }

    pub fn total_vertices(&self) -> usize {
        self.all_models().map(|model| model.vertices.len()).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_vertices() as u64 * VERTEX_SIZE
    }
}

impl Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("name", &self.name)
            .field("models", &self.models.len())
            .field("actors", &self.actors)
            .field("cameras", &self.cameras.len())
            .field("controllers", &self.controllers.len())
            .finish()
    }
}
