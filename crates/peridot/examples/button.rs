//! A two-frame sprite-sheet button: hover flips the frame, click logs.
//!
//! Expects `assets/sprites/button.png`, a 192×64 sheet of two 96×32
//! frames stacked in one row.

use peridot::prelude::*;

fn main() {
    App::new("button")
        .window_size(1280, 720)
        .background_color(Color::rgb(232, 207, 166))
        .setup(|ctx, router| {
            let button = ctx.spawn_sprite(
                Sprite::new("assets/sprites/button.png")
                    .size(360.0, 120.0)
                    .frames(96.0, 32.0, 2, 2)
                    .speed_ms(180.0)
                    .autoplay(false),
            );
            ctx.scene.add(&mut ctx.nodes, button);

            router.add_hover(
                &ctx.nodes,
                button,
                |ctx, _event, id| {
                    if let Ok(entity) = ctx.nodes.entity_mut(id) {
                        entity.set_frame(1);
                    }
                },
                |ctx, _event, id| {
                    if let Ok(entity) = ctx.nodes.entity_mut(id) {
                        entity.set_frame(0);
                    }
                },
            );

            router.add_click(&ctx.nodes, button, |_ctx, event, id| {
                log::info!("button {id} clicked at {:?}", event.world);
            });

            router.add_key_down(KeyCode::Escape, |ctx, _| ctx.request_exit());
        })
        .run();
}
