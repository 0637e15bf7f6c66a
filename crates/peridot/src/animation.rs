//! Sprite-sheet animation state.
//!
//! Two playback modes share one frame counter:
//!
//! * **Cyclic** — the frame index wraps `0..total_frames` forever. This is
//!   the mode every sprite starts in; whether it actually advances is the
//!   `autoplay` flag captured at spawn.
//! * **Sequence** — an explicit list of frame indices plays in order, either
//!   looping or once. A one-shot run may name a revert sequence to fall back
//!   into and a completion callback that fires exactly once.
//!
//! Frames only advance when the owner is drawn; a sprite outside the active
//! scene is frozen, and resumes from where it stopped.

use std::fmt;

/// Playback interpretation of the frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationMode {
    /// `frame = (frame + 1) % total_frames` on every advance.
    Cyclic,
    /// Frames come from an explicit index sequence.
    Sequence,
}

/// Error for sequence playback requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    /// A sequence playback was requested with no frames.
    EmptySequence,
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySequence => write!(f, "animation sequence is empty"),
        }
    }
}

impl std::error::Error for AnimationError {}

/// Normalized UV bounds of the current frame within its texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRect {
    pub u_min: f32,
    pub u_max: f32,
    pub v_min: f32,
    pub v_max: f32,
}

pub(crate) type CompletionCallback = Box<dyn FnMut()>;

/// Per-sprite animation state machine.
pub struct AnimationState {
    mode: AnimationMode,
    current_frame: u32,
    total_frames: u32,
    frames_per_row: u32,
    frame_width: f32,
    frame_height: f32,
    playing: bool,
    play_once: bool,
    sequence: Vec<u32>,
    sequence_index: usize,
    revert_sequence: Vec<u32>,
    speed_ms: f64,
    last_advance_ms: f64,
    on_complete: Option<CompletionCallback>,
}

impl AnimationState {
    /// A sheet with `frame_width`/`frame_height` of zero is treated as a
    /// single static image covering the whole texture.
    pub fn new(
        frame_width: f32,
        frame_height: f32,
        frames_per_row: u32,
        total_frames: u32,
        speed_ms: f64,
        autoplay: bool,
    ) -> Self {
        Self {
            mode: AnimationMode::Cyclic,
            current_frame: 0,
            total_frames: total_frames.max(1),
            frames_per_row: frames_per_row.max(1),
            frame_width,
            frame_height,
            playing: autoplay,
            play_once: false,
            sequence: Vec::new(),
            sequence_index: 0,
            revert_sequence: Vec::new(),
            speed_ms,
            last_advance_ms: 0.0,
            on_complete: None,
        }
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed_ms(&self) -> f64 {
        self.speed_ms
    }

    pub fn set_speed_ms(&mut self, speed_ms: f64) {
        self.speed_ms = speed_ms;
    }

    /// Jumps to a frame and stops playback. Does not change the mode.
    pub fn set_frame(&mut self, frame: u32) {
        self.current_frame = frame;
        self.playing = false;
    }

    /// Starts a looping sequence. The visible frame does not change until
    /// the first advance.
    pub fn play(&mut self, sequence: Vec<u32>, speed_ms: f64) -> Result<(), AnimationError> {
        if sequence.is_empty() {
            return Err(AnimationError::EmptySequence);
        }
        self.mode = AnimationMode::Sequence;
        self.sequence = sequence;
        self.sequence_index = 0;
        self.speed_ms = speed_ms;
        self.playing = true;
        self.play_once = false;
        Ok(())
    }

    /// Plays a sequence once. On exhaustion, either switches to looping
    /// `revert` or stops on the last frame, then invokes `on_complete`
    /// exactly once. A callback passed here replaces any stored one; `None`
    /// leaves the stored callback in place.
    pub fn play_once(
        &mut self,
        sequence: Vec<u32>,
        revert: Option<Vec<u32>>,
        speed_ms: f64,
        on_complete: Option<CompletionCallback>,
    ) -> Result<(), AnimationError> {
        if sequence.is_empty() {
            return Err(AnimationError::EmptySequence);
        }
        self.mode = AnimationMode::Sequence;
        self.sequence = sequence;
        self.sequence_index = 0;
        self.speed_ms = speed_ms;
        self.playing = true;
        self.play_once = true;
        match revert {
            Some(r) if !r.is_empty() => self.revert_sequence = r,
            _ => self.revert_sequence.clear(),
        }
        if let Some(cb) = on_complete {
            self.on_complete = Some(cb);
        }
        Ok(())
    }

    /// Stops playback and rewinds to frame 0. The mode is left as-is.
    pub fn stop(&mut self) {
        self.current_frame = 0;
        self.playing = false;
        self.play_once = false;
    }

    /// Advances by at most one frame, gated on the elapsed-time clock.
    ///
    /// Called from the draw path only, so inactive sprites freeze in place.
    pub(crate) fn advance(&mut self, now_ms: f64) {
        if self.total_frames <= 1 || !self.playing || now_ms - self.last_advance_ms <= self.speed_ms
        {
            return;
        }
        match self.mode {
            AnimationMode::Cyclic => {
                self.current_frame = (self.current_frame + 1) % self.total_frames;
            }
            AnimationMode::Sequence => {
                self.current_frame = self.sequence[self.sequence_index];
                self.sequence_index += 1;
                if self.sequence_index >= self.sequence.len() {
                    self.sequence_index = 0;
                    if self.play_once {
                        if self.revert_sequence.is_empty() {
                            self.playing = false;
                        } else {
                            self.sequence = std::mem::take(&mut self.revert_sequence);
                        }
                        self.play_once = false;
                        if let Some(cb) = self.on_complete.as_mut() {
                            cb();
                        }
                    }
                }
            }
        }
        self.last_advance_ms = now_ms;
    }

    /// UV bounds of the current frame. Row 0 is the top of the sheet.
    pub fn frame_rect(&self, texture_width: f32, texture_height: f32) -> FrameRect {
        if self.frame_width > 0.0 && self.frame_height > 0.0 {
            let col = (self.current_frame % self.frames_per_row) as f32;
            let row = (self.current_frame / self.frames_per_row) as f32;
            FrameRect {
                u_min: col * self.frame_width / texture_width,
                u_max: (col + 1.0) * self.frame_width / texture_width,
                v_min: row * self.frame_height / texture_height,
                v_max: (row + 1.0) * self.frame_height / texture_height,
            }
        } else {
            FrameRect {
                u_min: 0.0,
                u_max: 1.0,
                v_min: 0.0,
                v_max: 1.0,
            }
        }
    }
}

impl fmt::Debug for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationState")
            .field("mode", &self.mode)
            .field("current_frame", &self.current_frame)
            .field("total_frames", &self.total_frames)
            .field("playing", &self.playing)
            .field("play_once", &self.play_once)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sheet(total: u32, autoplay: bool) -> AnimationState {
        AnimationState::new(32.0, 32.0, 4, total, 100.0, autoplay)
    }

    #[test]
    fn cyclic_wraps_around() {
        let mut anim = sheet(3, true);
        anim.advance(150.0);
        assert_eq!(anim.current_frame(), 1);
        anim.advance(300.0);
        assert_eq!(anim.current_frame(), 2);
        anim.advance(450.0);
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn advance_waits_for_frame_duration() {
        let mut anim = sheet(4, true);
        anim.advance(50.0);
        assert_eq!(anim.current_frame(), 0);
        anim.advance(100.0); // not strictly greater than speed
        assert_eq!(anim.current_frame(), 0);
        anim.advance(100.5);
        assert_eq!(anim.current_frame(), 1);
        // Timestamp only moves when a frame advances, so the next advance
        // is measured from 100.5.
        anim.advance(150.0);
        assert_eq!(anim.current_frame(), 1);
        anim.advance(201.0);
        assert_eq!(anim.current_frame(), 2);
    }

    #[test]
    fn single_frame_never_advances() {
        let mut anim = sheet(1, true);
        anim.advance(10_000.0);
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn stopped_animation_freezes_and_resumes() {
        let mut anim = sheet(4, false);
        anim.advance(500.0);
        assert_eq!(anim.current_frame(), 0);
        anim.play(vec![2, 3], 100.0).unwrap();
        anim.advance(700.0);
        assert_eq!(anim.current_frame(), 2);
    }

    #[test]
    fn set_frame_stops_playback() {
        let mut anim = sheet(4, true);
        anim.set_frame(2);
        assert!(!anim.is_playing());
        anim.advance(1_000.0);
        assert_eq!(anim.current_frame(), 2);
    }

    #[test]
    fn looping_sequence_restarts() {
        let mut anim = sheet(8, false);
        anim.play(vec![4, 5], 100.0).unwrap();
        anim.advance(101.0);
        assert_eq!(anim.current_frame(), 4);
        anim.advance(202.0);
        assert_eq!(anim.current_frame(), 5);
        anim.advance(303.0);
        assert_eq!(anim.current_frame(), 4);
        assert!(anim.is_playing());
    }

    #[test]
    fn play_once_reverts_and_completes_exactly_once() {
        let completions = Rc::new(Cell::new(0u32));
        let seen = completions.clone();
        let mut anim = sheet(8, false);
        anim.play_once(
            vec![1, 2, 3],
            Some(vec![0]),
            100.0,
            Some(Box::new(move || seen.set(seen.get() + 1))),
        )
        .unwrap();

        anim.advance(101.0);
        assert_eq!(anim.current_frame(), 1);
        anim.advance(202.0);
        assert_eq!(anim.current_frame(), 2);
        assert_eq!(completions.get(), 0);
        anim.advance(303.0);
        assert_eq!(anim.current_frame(), 3);
        assert_eq!(completions.get(), 1);
        assert!(anim.is_playing());

        // Now looping the revert sequence; the callback must not fire again.
        anim.advance(404.0);
        assert_eq!(anim.current_frame(), 0);
        anim.advance(505.0);
        assert_eq!(anim.current_frame(), 0);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn play_once_without_revert_stops_on_last_frame() {
        let mut anim = sheet(8, false);
        anim.play_once(vec![6, 7], None, 100.0, None).unwrap();
        anim.advance(101.0);
        anim.advance(202.0);
        assert_eq!(anim.current_frame(), 7);
        assert!(!anim.is_playing());
        anim.advance(1_000.0);
        assert_eq!(anim.current_frame(), 7);
    }

    #[test]
    fn empty_sequence_is_rejected_and_state_unchanged() {
        let mut anim = sheet(4, false);
        anim.set_frame(2);
        assert_eq!(anim.play(vec![], 50.0), Err(AnimationError::EmptySequence));
        assert_eq!(
            anim.play_once(vec![], None, 50.0, None),
            Err(AnimationError::EmptySequence)
        );
        assert_eq!(anim.current_frame(), 2);
        assert!(!anim.is_playing());
        assert_eq!(anim.mode(), AnimationMode::Cyclic);
    }

    #[test]
    fn stop_rewinds_but_keeps_mode() {
        let mut anim = sheet(8, false);
        anim.play(vec![3, 4], 100.0).unwrap();
        anim.advance(101.0);
        anim.stop();
        assert_eq!(anim.current_frame(), 0);
        assert!(!anim.is_playing());
        assert_eq!(anim.mode(), AnimationMode::Sequence);
    }

    #[test]
    fn frame_rect_walks_the_sheet() {
        let mut anim = AnimationState::new(32.0, 32.0, 4, 8, 100.0, false);
        anim.set_frame(5); // column 1, row 1
        let r = anim.frame_rect(128.0, 64.0);
        assert_eq!(r.u_min, 0.25);
        assert_eq!(r.u_max, 0.5);
        assert_eq!(r.v_min, 0.5);
        assert_eq!(r.v_max, 1.0);
    }

    #[test]
    fn zero_frame_size_covers_whole_texture() {
        let anim = AnimationState::new(0.0, 0.0, 1, 1, 100.0, false);
        let r = anim.frame_rect(256.0, 256.0);
        assert_eq!((r.u_min, r.u_max, r.v_min, r.v_max), (0.0, 1.0, 0.0, 1.0));
    }
}
