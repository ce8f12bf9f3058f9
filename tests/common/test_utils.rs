#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use batch_ngin::{
    camera::{Camera, CameraView, FixedCamera},
    data_structures::{
        instance::Transform,
        model::{Model, ModelId, TextureId, TextureSource},
        vertex::Vertex,
    },
    error::GpuError,
    geometry::{GeometryBuffer, HostStore},
    render::{DrawPlan, Frame, Renderer},
    resources::texture::TextureLoader,
    scene::{Actor, Collision, Controller, InputEvent, Level, Signal},
};
use instant::Duration;

/// Shared, ordered record of what the collaborators of a level were asked to do.
pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// `n` vertices with distinct positions so their bytes can be told apart.
pub(crate) fn vertices(n: usize, seed: f32) -> Vec<Vertex> {
    (0..n)
        .map(|i| {
            let i = i as f32;
            Vertex::new([seed, i, -i], [i as u8, seed as u8, 7, 255], [i, seed])
        })
        .collect()
}

/// A level with a sky block of `sky` vertices, terrain of `terrain` vertices,
/// one model per entry of `models` and a single fixed camera.
pub(crate) fn level_with(sky: usize, terrain: usize, models: &[usize]) -> Level {
    let mut level = Level::new(
        "test",
        Model::new("sky", vertices(sky, 1.0)),
        Model::new("terrain", vertices(terrain, 2.0)),
    );
    for (idx, count) in models.iter().enumerate() {
        level.add_model(Model::new(&format!("model{}", idx), vertices(*count, 10.0 + idx as f32)));
    }
    level.add_camera(FixedCamera::new(CameraView::new((0.0, 5.0, 10.0), (0.0, 0.0, 0.0))));
    level
}

/// Renderer keeping every draw plan instead of talking to a GPU.
#[derive(Default)]
pub(crate) struct RecordingRenderer {
    pub loaded: Vec<(TextureId, String)>,
    pub unloads: usize,
    pub plans: Vec<DrawPlan>,
    pub cameras: Vec<CameraView>,
    pub recovered: usize,
    /// Returned by the next draw instead of drawing.
    pub fail_next: Option<GpuError>,
    pub journal: Option<Journal>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: &Journal) -> Self {
        Self {
            journal: Some(journal.clone()),
            ..Self::default()
        }
    }
}

impl TextureLoader for RecordingRenderer {
    fn unload_all(&mut self) {
        self.unloads += 1;
        self.loaded.clear();
    }

    fn load(&mut self, id: TextureId, source: &TextureSource) -> Result<(), GpuError> {
        self.loaded.push((id, source.name.clone()));
        Ok(())
    }
}

impl Renderer<HostStore> for RecordingRenderer {
    fn draw(&mut self, geometry: &GeometryBuffer<HostStore>, frame: &Frame<'_>) -> Result<(), GpuError> {
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push("draw".to_string());
        }
        if let Some(e) = self.fail_next.take() {
            return Err(e);
        }
        geometry.ensure_drawable()?;
        let plan = DrawPlan::build(frame, 1.0, 0.1, 100.0)?;
        self.cameras.push(frame.camera);
        self.plans.push(plan);
        Ok(())
    }

    fn recover(&mut self, _error: &GpuError) {
        self.recovered += 1;
    }
}

/// Actor that journals its ticks and collisions and can switch model on its next tick.
pub(crate) struct TestActor {
    pub name: String,
    pub model: ModelId,
    pub transform: Transform,
    pub next_model: Option<ModelId>,
    pub journal: Journal,
}

impl TestActor {
    pub fn new(name: &str, model: ModelId, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            model,
            transform: Transform::new(),
            next_model: None,
            journal: journal.clone(),
        }
    }

    pub fn at(mut self, position: [f32; 3]) -> Self {
        self.transform.position = position.into();
        self
    }

    pub fn switching_to(mut self, model: ModelId) -> Self {
        self.next_model = Some(model);
        self
    }
}

impl Actor for TestActor {
    fn tick(&mut self, _dt: Duration) {
        self.journal.borrow_mut().push(format!("tick {}", self.name));
        if let Some(model) = self.next_model.take() {
            self.model = model;
        }
    }

    fn model(&self) -> ModelId {
        self.model
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn on_collision(&mut self, _other: &Transform) {
        self.journal.borrow_mut().push(format!("hit {}", self.name));
    }
}

pub(crate) struct TestCamera {
    pub name: String,
    pub view: CameraView,
    pub primary: bool,
    pub journal: Journal,
}

impl TestCamera {
    pub fn new(name: &str, eye: [f32; 3], journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            view: CameraView::new(eye, [0.0, 0.0, 0.0]),
            primary: false,
            journal: journal.clone(),
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

impl Camera for TestCamera {
    fn tick(&mut self, _dt: Duration, _actors: &[Box<dyn Actor>]) {
        self.journal.borrow_mut().push(format!("camera {}", self.name));
    }

    fn view(&self) -> CameraView {
        self.view
    }

    fn is_primary(&self) -> bool {
        self.primary
    }
}

/// Answers each event with the next scripted signal, `Continue` once the script runs out.
pub(crate) struct ScriptedController {
    pub signals: VecDeque<Signal>,
    pub journal: Journal,
}

impl ScriptedController {
    pub fn new(signals: impl IntoIterator<Item = Signal>, journal: &Journal) -> Self {
        Self {
            signals: signals.into_iter().collect(),
            journal: journal.clone(),
        }
    }
}

impl Controller for ScriptedController {
    fn on_event(&mut self, event: &InputEvent, _actors: &mut [Box<dyn Actor>]) -> Signal {
        let name = match event {
            InputEvent::Quit => "quit",
            InputEvent::Window(_) => "window",
            InputEvent::Device(_) => "device",
        };
        self.journal.borrow_mut().push(format!("event {}", name));
        self.signals.pop_front().unwrap_or_default()
    }
}

/// Journals every resolve call.
pub(crate) struct JournalCollision {
    pub journal: Journal,
}

impl Collision for JournalCollision {
    fn resolve(&mut self, actor: usize, _actors: &mut [Box<dyn Actor>]) {
        self.journal.borrow_mut().push(format!("resolve {}", actor));
    }
}
