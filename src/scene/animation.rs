//! Keyframe animation clips and the per-node animator that plays them.
//!
//! An [`Animator`] lives on a node and owns a list of clips. Tracks target the
//! animator's own node (empty path) or a descendant addressed by a
//! `/`-separated path of child names, and drive one TRS property each.

use crate::core::math::interpolation::{keyframe_segment, lerp_vec3, slerp};
use crate::scene::graph::{NodeId, Scene};
use log::{debug, warn};
use nalgebra::{UnitQuaternion, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackProperty {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone)]
pub enum TrackValues {
    Vector(Vec<Vector3<f32>>),
    Rotation(Vec<UnitQuaternion<f32>>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackSample {
    Vector(Vector3<f32>),
    Rotation(UnitQuaternion<f32>),
}

#[derive(Debug, Clone)]
pub struct Track {
    /// Child path relative to the animator node; empty targets the node itself.
    pub target: String,
    pub property: TrackProperty,
    /// Strictly increasing key times in seconds.
    pub times: Vec<f32>,
    pub values: TrackValues,
}

impl Track {
    pub fn sample(&self, t: f32) -> Option<TrackSample> {
        let (a, b, f) = keyframe_segment(&self.times, t)?;
        match &self.values {
            TrackValues::Vector(v) => {
                let (va, vb) = (v.get(a)?, v.get(b)?);
                Some(TrackSample::Vector(lerp_vec3(va, vb, f)))
            }
            TrackValues::Rotation(q) => {
                let (qa, qb) = (q.get(a)?, q.get(b)?);
                Some(TrackSample::Rotation(slerp(qa, qb, f)))
            }
        }
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub looping: bool,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Duration defaults to the latest key time across all tracks.
    pub fn new(name: impl Into<String>, looping: bool, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(Track::end_time).fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            looping,
            tracks,
        }
    }

    /// Maps playback time into clip-local time.
    fn local_time(&self, time: f32) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else if self.looping {
            time.rem_euclid(self.duration)
        } else {
            time.min(self.duration)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub clip: usize,
    pub time: f32,
}

/// Plays one clip at a time on its node.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    pub clips: Vec<AnimationClip>,
    pub playback: Option<Playback>,
    pub speed: f32,
}

impl Animator {
    pub fn new(clips: Vec<AnimationClip>) -> Self {
        Self {
            clips,
            playback: None,
            speed: 1.0,
        }
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|c| c.name.as_str())
    }

    /// Starts the named clip from the beginning.
    pub fn play(&mut self, name: &str) -> bool {
        match self.clips.iter().position(|c| c.name == name) {
            Some(clip) => {
                debug!("Playing clip '{}'", name);
                self.playback = Some(Playback { clip, time: 0.0 });
                true
            }
            None => {
                warn!("Animator has no clip named '{}'", name);
                false
            }
        }
    }

    pub fn current_clip(&self) -> Option<&AnimationClip> {
        self.playback.and_then(|p| self.clips.get(p.clip))
    }

    pub fn advance(&mut self, dt: f32) {
        if let Some(p) = &mut self.playback {
            p.time += dt * self.speed;
        }
    }

    /// Samples every track of the current clip at the current time.
    pub fn sample(&self) -> Vec<(&str, TrackProperty, TrackSample)> {
        let Some(p) = self.playback else {
            return Vec::new();
        };
        let Some(clip) = self.clips.get(p.clip) else {
            return Vec::new();
        };
        let t = clip.local_time(p.time);
        clip.tracks
            .iter()
            .filter_map(|track| {
                track
                    .sample(t)
                    .map(|s| (track.target.as_str(), track.property, s))
            })
            .collect()
    }
}

/// Advances all animators active in the hierarchy and writes sampled poses.
pub fn update(scene: &mut Scene, dt: f32) {
    let animated: Vec<NodeId> = scene
        .node_ids()
        .filter(|&id| scene.is_active_in_hierarchy(id))
        .filter(|&id| scene.node(id).is_some_and(|n| n.animator.is_some()))
        .collect();

    for id in animated {
        let samples: Vec<(NodeId, TrackProperty, TrackSample)> = {
            let Some(animator) = scene.node_mut(id).and_then(|n| n.animator.as_mut()) else {
                continue;
            };
            animator.advance(dt);
            let Some(animator) = scene.node(id).and_then(|n| n.animator.as_ref()) else {
                continue;
            };
            animator
                .sample()
                .into_iter()
                .filter_map(|(path, prop, s)| scene.find_path(id, path).map(|t| (t, prop, s)))
                .collect()
        };

        for (target, property, sample) in samples {
            let Some(node) = scene.node_mut(target) else {
                continue;
            };
            match (property, sample) {
                (TrackProperty::Translation, TrackSample::Vector(v)) => {
                    node.transform.position = v
                }
                (TrackProperty::Scale, TrackSample::Vector(v)) => node.transform.scale = v,
                (TrackProperty::Rotation, TrackSample::Rotation(q)) => {
                    node.transform.rotation = q
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounce() -> AnimationClip {
        AnimationClip::new(
            "Bounce",
            true,
            vec![Track {
                target: String::new(),
                property: TrackProperty::Translation,
                times: vec![0.0, 1.0, 2.0],
                values: TrackValues::Vector(vec![
                    Vector3::zeros(),
                    Vector3::new(0.0, 1.0, 0.0),
                    Vector3::zeros(),
                ]),
            }],
        )
    }

    #[test]
    fn play_unknown_clip_is_rejected() {
        let mut animator = Animator::new(vec![bounce()]);
        assert!(!animator.play("Spin"));
        assert!(animator.playback.is_none());
        assert!(animator.play("Bounce"));
        assert_eq!(animator.current_clip().map(|c| c.name.as_str()), Some("Bounce"));
    }

    #[test]
    fn looping_clip_wraps() {
        let mut animator = Animator::new(vec![bounce()]);
        animator.play("Bounce");
        animator.advance(2.5);
        let samples = animator.sample();
        assert_eq!(samples.len(), 1);
        match samples[0].2 {
            TrackSample::Vector(v) => assert!((v.y - 0.5).abs() < 1e-5),
            _ => panic!("expected a vector sample"),
        }
    }

    #[test]
    fn update_moves_active_node() {
        let mut scene = Scene::new();
        let id = scene.spawn("Ball", None);
        let mut animator = Animator::new(vec![bounce()]);
        animator.play("Bounce");
        scene.node_mut(id).unwrap().animator = Some(animator);

        update(&mut scene, 1.0);
        assert!((scene.node(id).unwrap().transform.position.y - 1.0).abs() < 1e-5);

        scene.set_active(id, false);
        update(&mut scene, 0.5);
        assert!((scene.node(id).unwrap().transform.position.y - 1.0).abs() < 1e-5);
    }
}
