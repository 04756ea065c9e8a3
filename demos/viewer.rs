//! Interactive viewer demo
//!
//! A small scene: a checkered ground plane, an orange crate carrying a
//! satellite cube parented to it, and a sphere. Fly with WASD + mouse look,
//! Space/Shift to rise and fall. Tab releases the cursor for the entity
//! editor, Esc quits.

use anyhow::Result;
use cgmath::{Deg, Quaternion, Rotation3, Vector3};

use neep::assets::{AssetLibrary, TextureImage};
use neep::gfx::geometry::{generate_cube, generate_plane, generate_sphere};
use neep::gfx::resources::material::Material;

fn main() -> Result<()> {
    env_logger::init();

    let mut assets = AssetLibrary::new();
    let cube = assets.insert_mesh("cube", generate_cube());
    let ground = assets.insert_mesh("ground", generate_plane(24.0, 24.0));
    let sphere = assets.insert_mesh("sphere", generate_sphere(32, 16));
    let checker = assets.insert_texture(
        "checker",
        TextureImage::checker(256, 32, [200, 200, 200, 255], [90, 90, 90, 255]),
    );

    let mut app = neep::default();
    let scene = app.scene_mut();

    scene.materials.add_material(
        Material::new("floor", [1.0, 1.0, 1.0, 1.0]).with_texture(checker),
    );
    scene
        .materials
        .add_material(Material::new("crate", [0.85, 0.45, 0.15, 1.0]));
    scene
        .materials
        .add_material(Material::new("porcelain", [0.9, 0.9, 0.95, 1.0]));

    scene.add_entity("ground", &ground, "floor");

    let crate_entity = scene.add_entity("crate", &cube, "crate");
    {
        let transform = scene.transform_mut(crate_entity);
        transform.position = Vector3::new(0.0, 1.0, 0.0);
        transform.scale = Vector3::new(2.0, 2.0, 2.0);
    }

    // Parented to the crate: follows every edit made in the entity editor
    let satellite = scene.add_entity("satellite", &cube, "default");
    scene.set_parent(satellite, Some(crate_entity))?;
    {
        let transform = scene.transform_mut(satellite);
        transform.position = Vector3::new(1.2, 0.8, 0.0);
        transform.rotation = Quaternion::from_angle_y(Deg(30.0));
        transform.scale = Vector3::new(0.25, 0.25, 0.25);
    }

    let ball = scene.add_entity("ball", &sphere, "porcelain");
    {
        let transform = scene.transform_mut(ball);
        transform.position = Vector3::new(-3.5, 0.75, -2.0);
        transform.scale = Vector3::new(1.5, 1.5, 1.5);
    }

    app.set_ui(|ui| {
        ui.window("Help")
            .size([260.0, 120.0], imgui::Condition::FirstUseEver)
            .position([16.0, 460.0], imgui::Condition::FirstUseEver)
            .build(|| {
                ui.text("WASD   move");
                ui.text("mouse  look");
                ui.text("Space  rise / Shift fall");
                ui.text("Tab    toggle cursor");
                ui.text("Esc    quit");
            });
    });

    app.run();
    Ok(())
}
