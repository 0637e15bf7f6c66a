//! Flat shapes and a grouped player: arrow keys move the group, and the
//! background flashes while the player overlaps the obstacle.

use peridot::prelude::*;

const STEP: f32 = 8.0;

fn main() {
    App::new("shapes")
        .window_size(800, 600)
        .background_color(Color::rgb(30, 30, 46))
        .setup(|ctx, router| {
            let body = ctx.spawn_shape(
                Shape::quad()
                    .size(60.0, 60.0)
                    .color(Color::rgb(137, 180, 250)),
            );
            let hat = ctx.spawn_shape(
                Shape::triangle()
                    .position(0.0, 50.0, 0.0)
                    .size(40.0, 30.0)
                    .color(Color::rgb(243, 139, 168)),
            );
            let player = ctx.spawn_group(&[body, hat]);

            let obstacle = ctx.spawn_shape(
                Shape::quad()
                    .position(200.0, 0.0, 0.0)
                    .size(80.0, 80.0)
                    .color(Color::rgb(166, 227, 161)),
            );

            ctx.scene.add(&mut ctx.nodes, player);
            ctx.scene.add(&mut ctx.nodes, obstacle);

            for (key, dx, dy) in [
                (KeyCode::ArrowLeft, -STEP, 0.0),
                (KeyCode::ArrowRight, STEP, 0.0),
                (KeyCode::ArrowUp, 0.0, STEP),
                (KeyCode::ArrowDown, 0.0, -STEP),
            ] {
                router.add_key_down(key, move |ctx, _| {
                    let pos = ctx.nodes.node(player).position();
                    ctx.nodes
                        .node_mut(player)
                        .set_position(pos.x + dx, pos.y + dy, pos.z);
                });
            }

            router.add_hover(
                &ctx.nodes,
                obstacle,
                |ctx, _event, id| {
                    if let Ok(entity) = ctx.nodes.entity_mut(id) {
                        entity.set_color(Color::rgb(249, 226, 175));
                    }
                },
                |ctx, _event, id| {
                    if let Ok(entity) = ctx.nodes.entity_mut(id) {
                        entity.set_color(Color::rgb(166, 227, 161));
                    }
                },
            );

            router.add_key_down(KeyCode::Escape, |ctx, _| ctx.request_exit());
        })
        .update(move |ctx, _router| {
            // Scene members are spawned in setup; look them up by order.
            let members: Vec<NodeId> = ctx.scene.iter().collect();
            if let [player, obstacle] = members[..] {
                let body = ctx
                    .nodes
                    .children(player)
                    .ok()
                    .and_then(|children| children.first().copied());
                if let Some(body) = body {
                    let colliding = ctx.nodes.collides(body, obstacle);
                    ctx.set_background_color(if colliding {
                        Color::rgb(69, 30, 46)
                    } else {
                        Color::rgb(30, 30, 46)
                    });
                }
            }
        })
        .run();
}
