//! Spinning cubes and pyramids on a checkerboard, watched by an orbiting camera.
//!
//! Reads `engine.toml` from the working directory when present. Escape or
//! closing the window quits.

use batch_ngin::{
    app,
    camera::{CameraView, OrbitCamera},
    cgmath::{self, Rotation3},
    config::EngineConfig,
    data_structures::{
        instance::Transform,
        model::{Model, ModelId, TextureSource},
        shapes,
    },
    scene::{Actor, EscapeToQuit, Level, SphereCollision},
};
use instant::Duration;

struct Spinner {
    model: ModelId,
    transform: Transform,
    axis: cgmath::Vector3<f32>,
    speed: cgmath::Deg<f32>,
}

impl Actor for Spinner {
    fn tick(&mut self, dt: Duration) {
        let step = cgmath::Quaternion::from_axis_angle(self.axis, self.speed * dt.as_secs_f32());
        self.transform.rotation = step * self.transform.rotation;
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
        self.speed = -self.speed;
    }
}

fn checkerboard(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|idx| {
            let (x, y) = (idx % size, idx / size);
            if (x + y) % 2 == 0 {
                [200, 200, 200, 255]
            } else {
                [60, 90, 60, 255]
            }
        })
        .collect()
}

fn build_level() -> Level {
    let sky = Model::new("sky", shapes::sky_box(500.0, [90, 140, 220, 255], [200, 220, 240, 255]));
    let mut level = Level::new("spin", sky, Model::new("terrain", Vec::new()));
    let ground = level.add_texture(TextureSource::rgba("checker", 8, 8, checkerboard(8)));
    level.terrain = Model::new("terrain", shapes::plane(40.0, 8.0, [255, 255, 255, 255]))
        .with_texture(ground);

    let cube = level.add_model(Model::new(
        "cube",
        shapes::cube([
            [220, 60, 60, 255],
            [60, 220, 60, 255],
            [60, 60, 220, 255],
            [220, 220, 60, 255],
            [60, 220, 220, 255],
            [220, 60, 220, 255],
        ]),
    ));
    let pyramid = level.add_model(Model::new(
        "pyramid",
        shapes::pyramid([230, 160, 40, 255], [255, 255, 255, 255]),
    ));

    for row in -2..=2 {
        for col in -2..=2 {
            let model = if (row + col) % 2 == 0 { cube } else { pyramid };
            let position = cgmath::Vector3::new(col as f32 * 4.0, 1.0, row as f32 * 4.0);
            level.spawn(Spinner {
                model,
                transform: Transform::at(position),
                axis: cgmath::Vector3::unit_y(),
                speed: cgmath::Deg(30.0 + 10.0 * (row + 2) as f32),
            });
        }
    }

    let view = CameraView::new((0.0, 12.0, 24.0), (0.0, 0.0, 0.0));
    level.add_camera(OrbitCamera::new(view, cgmath::Deg(10.0)).primary());
    level.add_controller(EscapeToQuit);
    level.with_collision(SphereCollision::new(0.9))
}

fn main() {
    let result = EngineConfig::load("engine.toml").and_then(|config| app::run(config, build_level()));
    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
