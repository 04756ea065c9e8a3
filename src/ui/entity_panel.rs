// src/ui/entity_panel.rs
//! Entity editor panel
//!
//! Lists the scene's entities and edits the selected entity's transform
//! fields in place. The renderer tolerates these edits because world
//! matrices are recomputed from the arena every frame.

use cgmath::{Deg, Euler, Quaternion, Rad};

use crate::gfx::scene::Scene;

/// Draws the entity editor window
///
/// `selected_index` persists the selection between frames.
pub fn draw_entity_editor(ui: &imgui::Ui, scene: &mut Scene, selected_index: &mut Option<usize>) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Entity Editor")
        .size([340.0, 420.0], imgui::Condition::FirstUseEver)
        .position([16.0, 16.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            let camera_position = scene.camera.position;
            ui.text(format!(
                "camera ({:.2}, {:.2}, {:.2})",
                camera_position.x, camera_position.y, camera_position.z
            ));
            ui.text_disabled("Tab releases the cursor, Esc quits");
            ui.separator();

            render_entity_list(ui, scene, selected_index);
            ui.separator();
            render_transform_controls(ui, scene, selected_index);
        });
}

fn render_entity_list(ui: &imgui::Ui, scene: &Scene, selected_index: &mut Option<usize>) {
    ui.text("Entities");
    ui.spacing();

    ui.child_window("entity_list")
        .size([0.0, 120.0])
        .border(true)
        .build(|| {
            for (i, entity) in scene.entities.iter().enumerate() {
                let is_selected = *selected_index == Some(i);
                let label = format!("{}##{}", entity.name, i);

                if ui
                    .selectable_config(&label)
                    .selected(is_selected)
                    .build()
                {
                    *selected_index = Some(i);
                }
            }
        });
}

fn render_transform_controls(
    ui: &imgui::Ui,
    scene: &mut Scene,
    selected_index: &mut Option<usize>,
) {
    let Some(index) = *selected_index else {
        ui.text_disabled("select an entity to edit");
        return;
    };
    if index >= scene.entities.len() {
        *selected_index = None;
        return;
    }

    ui.text(format!("Selected: {}", scene.entities[index].name));
    ui.spacing();

    let mut visible = scene.entities[index].visible;
    if ui.checkbox("visible", &mut visible) {
        scene.entities[index].visible = visible;
    }

    let transform = scene.transform_mut(index);

    let mut position: [f32; 3] = transform.position.into();
    if imgui::Drag::new("position")
        .speed(0.05)
        .build_array(ui, &mut position)
    {
        transform.position = position.into();
    }

    // Edit rotation as Euler degrees, store as a quaternion
    let euler = Euler::from(transform.rotation);
    let mut rotation_degrees: [f32; 3] = [
        Deg::from(euler.x).0,
        Deg::from(euler.y).0,
        Deg::from(euler.z).0,
    ];
    if imgui::Drag::new("rotation")
        .speed(0.5)
        .build_array(ui, &mut rotation_degrees)
    {
        transform.rotation = Quaternion::from(Euler::new(
            Rad::from(Deg(rotation_degrees[0])),
            Rad::from(Deg(rotation_degrees[1])),
            Rad::from(Deg(rotation_degrees[2])),
        ));
    }

    let mut scale: [f32; 3] = transform.scale.into();
    if imgui::Drag::new("scale")
        .speed(0.01)
        .range(0.01, 100.0)
        .build_array(ui, &mut scale)
    {
        transform.scale = scale.into();
    }
}
