//! Named audio playback: space toggles a looping track on and off.
//!
//! Expects `assets/audio/theme.ogg`. Run with `--features audio`.

use peridot::prelude::*;

fn main() {
    App::new("sounds")
        .window_size(640, 360)
        .setup(|ctx, router| {
            ctx.audio.add("assets/audio/theme.ogg", "theme");

            router.add_key_down(KeyCode::Space, |ctx, _| {
                if ctx.audio.is_playing("theme") {
                    ctx.audio.stop("theme");
                } else {
                    ctx.audio.play("theme");
                }
            });

            router.add_key_down(KeyCode::Escape, |ctx, _| ctx.request_exit());
        })
        .run();
}
