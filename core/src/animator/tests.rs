//! Animator tests against the in-memory scene

use scrollstage_shared::{Effect, FeatureKind, ThresholdFeature};

use super::*;
use crate::scene::SceneGraph;
use crate::test_utils::{CLIP_SECONDS, Harness, feature, plain_new_scene};

fn threshold_feature(src: &str) -> (String, Option<String>, ThresholdFeature) {
    let spec = feature(src);
    match spec.effect {
        FeatureKind::Threshold(f) => (spec.id, spec.asset, f),
        other => panic!("expected threshold feature, got {other:?}"),
    }
}

fn particles_src() -> String {
    let mut src = String::from(
        r#"
id = "particles"
asset = "plain_new"

[effect]
kind = "threshold"
parent = "particle_pla"
"#,
    );
    for (i, enter) in [0.33, 0.35, 0.37, 0.39].into_iter().enumerate() {
        let node = format!("particle_{}", i + 1);
        src.push_str(&format!(
            r#"
[[effect.entries]]
threshold = {{ enter = {enter} }}
on_enter = [{{ op = "show", node = "{node}" }}, {{ op = "play", clips = {{ node = "{node}" }} }}]
on_exit = [{{ op = "hide", node = "{node}" }}, {{ op = "stop", clips = {{ node = "{node}" }} }}]
"#
        ));
    }
    src
}

const BOTTLE: &str = r#"
id = "bottle-glass"
asset = "plain_new"

[effect]
kind = "threshold"

[[effect.entries]]
threshold = { enter = 0.29, exit = 0.2873245662504144 }
on_enter = [
    { op = "show", node = "bottle_glas" },
    { op = "play", clips = { node = "bottle_glas", index = 2 }, start_time = 5.0 },
]
on_exit = [
    { op = "hide", node = "bottle_glas" },
    { op = "reverse", clips = { node = "bottle_glas" } },
]
"#;

// ============================================================================
// Threshold animator
// ============================================================================

#[test]
fn test_parent_visible_while_any_group_active() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(&particles_src())).unwrap();

    h.tick(animator.as_mut(), 0.34);
    assert!(h.visible("particle_pla"));
    assert!(h.visible("particle_1"));

    h.tick(animator.as_mut(), 0.40);
    h.tick(animator.as_mut(), 0.36);
    assert!(h.visible("particle_pla"));
    assert!(!h.visible("particle_3"));
    assert!(!h.visible("particle_4"));

    h.tick(animator.as_mut(), 0.20);
    assert!(!h.visible("particle_pla"));
    assert!(!h.visible("particle_1"));
    assert!(!h.visible("particle_2"));
}

#[test]
fn test_parent_untouched_on_idle_ticks() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(&particles_src())).unwrap();

    h.tick(animator.as_mut(), 0.34);
    // Something else hides the container; holding the scroll must not undo it
    let parent = h.node("particle_pla");
    h.scene.set_visible(parent, false);
    h.tick(animator.as_mut(), 0.34);
    assert!(!h.visible("particle_pla"));
}

#[test]
fn test_enter_plays_once_from_start_time() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(BOTTLE)).unwrap();
    let clips = h.scene.clips_rooted_at(h.node("bottle_glas"));

    h.tick(animator.as_mut(), 0.30);
    let main = h.scene.clip(clips[2]).unwrap();
    assert!(main.is_running());
    assert_eq!(main.time(), 5.0);
    assert!(!h.scene.clip(clips[0]).unwrap().is_running());

    h.scene.advance_animations(0.5);
    h.tick(animator.as_mut(), 0.30);
    h.tick(animator.as_mut(), 0.31);
    assert_eq!(h.scene.clip(clips[2]).unwrap().time(), 5.5);
}

#[test]
fn test_exit_reverses_from_clip_end_when_at_start() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(BOTTLE)).unwrap();
    let clips = h.scene.clips_rooted_at(h.node("bottle_glas"));

    h.tick(animator.as_mut(), 0.30);
    h.scene.advance_animations(0.5);

    // Inside the hysteresis band nothing happens
    h.tick(animator.as_mut(), 0.288);
    assert!(h.visible("bottle_glas"));

    h.tick(animator.as_mut(), 0.28);
    assert!(!h.visible("bottle_glas"));

    let idle = h.scene.clip(clips[0]).unwrap();
    assert_eq!(idle.time(), CLIP_SECONDS);
    assert_eq!(idle.time_scale(), -1.0);
    assert!(idle.is_running());

    let main = h.scene.clip(clips[2]).unwrap();
    assert_eq!(main.time(), 5.5);
    assert_eq!(main.time_scale(), -1.0);
}

#[test]
fn test_pending_asset_is_a_noop_until_loaded() {
    let mut h = Harness::unloaded(plain_new_scene());
    let mut animator = build_animator(&feature(BOTTLE)).unwrap();
    let clips = h.scene.clips_rooted_at(h.node("bottle_glas"));

    h.tick(animator.as_mut(), 0.30);
    assert!(!h.scene.clip(clips[2]).unwrap().is_running());

    h.refresh();
    h.tick(animator.as_mut(), 0.30);
    assert!(h.scene.clip(clips[2]).unwrap().is_running());
}

#[test]
fn test_missing_object_makes_feature_inert() {
    let mut h = Harness::new(plain_new_scene());
    let (id, asset, spec) = threshold_feature(
        r#"
id = "broken"
asset = "plain_new"

[effect]
kind = "threshold"

[[effect.entries]]
threshold = { enter = 0.1 }
on_enter = [
    { op = "hide", node = "bottle_glas" },
    { op = "show", node = "no_such_node" },
]
"#,
    );
    let mut animator = ThresholdAnimator::new(id, asset, spec);

    h.tick(&mut animator, 0.5);
    assert!(animator.is_inert());
    assert!(h.visible("bottle_glas"));
    assert!(!animator.bank().any_active());

    h.tick(&mut animator, 0.0);
    h.tick(&mut animator, 0.5);
    assert!(h.visible("bottle_glas"));
}

#[test]
fn test_overlay_elements_without_asset() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(
        r#"
id = "scroll-hint"

[effect]
kind = "threshold"

[[effect.entries]]
threshold = { enter = 0.01105094485578517 }
on_enter = [
    { op = "element_opacity", element = "initScrollInfo", opacity = 0.0 },
    { op = "element_opacity", element = "truuLogo", opacity = 1.0 },
]
on_exit = [
    { op = "element_opacity", element = "initScrollInfo", opacity = 1.0 },
    { op = "element_opacity", element = "truuLogo", opacity = 0.0 },
]
"#,
    ))
    .unwrap();

    h.tick(animator.as_mut(), 0.0);
    assert!(h.overlay.events().is_empty());

    h.tick(animator.as_mut(), 0.02);
    h.tick(animator.as_mut(), 0.03);
    assert_eq!(h.overlay.events().len(), 2);
    assert_eq!(h.overlay.element_opacity("truuLogo"), Some(1.0));

    h.tick(animator.as_mut(), 0.005);
    assert_eq!(h.overlay.element_opacity("initScrollInfo"), Some(1.0));
    assert_eq!(h.overlay.element_opacity("truuLogo"), Some(0.0));
}

// ============================================================================
// Visibility window
// ============================================================================

#[test]
fn test_window_shows_label_and_pauses_clips() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(
        r#"
id = "bottle-label"
asset = "plain_new"

[effect]
kind = "visibility_window"
node = "bottle_pla_with_label_off__on"
start = 0.305
end = 0.3315283456735551
pause = { node = "bottle_glas" }
"#,
    ))
    .unwrap();
    let clips = h.scene.clips_rooted_at(h.node("bottle_glas"));
    h.scene.clip_mut(clips[2]).unwrap().play_forward_from(5.0);

    h.tick(animator.as_mut(), 0.30);
    assert!(!h.visible("bottle_pla_with_label_off__on"));
    assert!(!h.scene.clip(clips[2]).unwrap().is_paused());

    h.tick(animator.as_mut(), 0.31);
    assert!(h.visible("bottle_pla_with_label_off__on"));
    assert!(h.scene.clip(clips[2]).unwrap().is_paused());

    h.tick(animator.as_mut(), 0.3315283456735551);
    assert!(!h.visible("bottle_pla_with_label_off__on"));
}

// ============================================================================
// Liquid fill
// ============================================================================

const SILHOUETTE: &str = r#"
id = "silhouette"
asset = "plain_new"

[effect]
kind = "liquid_fill"
active = { start = 0.4, end = 0.6 }
fill = { start = 0.4, end = 0.5 }
body = "Silhuette"
parts = [{ node = "legs" }, { node = "upper_legs" }, { node = "belly" }, { node = "head" }]
show_inside = ["Silhuette_outside_pla"]
hide_inside = ["ipad_cam_04"]
body_position = [0.0, 1.0, 0.0]
"#;

#[test]
fn test_whole_body_fill() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(SILHOUETTE)).unwrap();

    h.tick(animator.as_mut(), 0.3);
    assert!(!h.visible("Silhuette"));
    assert!(!h.visible("legs"));
    assert!(!h.visible("Silhuette_outside_pla"));
    assert!(h.visible("ipad_cam_04"));

    // Body moved up by one: spans y 1..5, fill at 1 + 4 * 0.375
    h.tick(animator.as_mut(), 0.4375);
    assert!(h.visible("Silhuette"));
    assert!(h.visible("Silhuette_outside_pla"));
    assert!(!h.visible("ipad_cam_04"));
    assert_eq!(h.scene.position(h.node("Silhuette")), Some(glam::Vec3::Y));

    assert!(h.visible("legs"));
    assert!(h.visible("upper_legs"));
    assert!(!h.visible("belly"));
    assert!(!h.visible("head"));
    let clip = h.scene.clip_height(h.node("upper_legs")).unwrap();
    assert!((clip - 2.5).abs() < 1e-4);

    h.tick(animator.as_mut(), 0.55);
    assert!(h.visible("head"));
    let clip = h.scene.clip_height(h.node("head")).unwrap();
    assert!((clip - 5.0).abs() < 1e-4);

    h.tick(animator.as_mut(), 0.7);
    assert!(!h.visible("Silhuette"));
    assert!(!h.visible("head"));
    assert!(h.visible("ipad_cam_04"));
}

const FOOD: &str = r#"
id = "food-body"
asset = "plain_new"

[effect]
kind = "liquid_fill"
active = { start = 0.6, end = 1.0 }
fill = { start = 0.6, end = 0.7 }
body = "Silhuette"
staging = "sequential"
parts = [
    { node = "legs", tint = [0.376, 1.0, 0.0, 1.0] },
    { node = "upper_legs" },
    { node = "belly" },
    { node = "head" },
]
companions = [
    { node = "food_01", appear = 0.0, fade_out = 0.25 },
    { node = "food_02", appear = 0.25 },
]
"#;

#[test]
fn test_sequential_fill_phases() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(FOOD)).unwrap();

    // Overall 0.375: legs full, upper legs half, belly at its base
    h.tick(animator.as_mut(), 0.6375);
    let legs = h.scene.clip_height(h.node("legs")).unwrap();
    let upper = h.scene.clip_height(h.node("upper_legs")).unwrap();
    let belly = h.scene.clip_height(h.node("belly")).unwrap();
    assert!((legs - 1.0).abs() < 1e-4);
    assert!((upper - 1.5).abs() < 1e-4);
    assert!((belly - 2.0).abs() < 1e-4);
}

#[test]
fn test_part_tints_applied_on_resolve() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(FOOD)).unwrap();

    h.tick(animator.as_mut(), 0.1);
    assert_eq!(
        h.scene.tint(h.node("legs")),
        Some([0.376, 1.0, 0.0, 1.0])
    );
    assert_eq!(h.scene.tint(h.node("upper_legs")), None);
}

#[test]
fn test_resolve_effects_run_once_before_part_tints() {
    let mut spec = feature(FOOD);
    let FeatureKind::LiquidFill(fill) = &mut spec.effect else {
        panic!("expected liquid fill feature");
    };
    fill.on_resolve = vec![
        Effect::Hide {
            node: "Silhuette_outside_pla".into(),
        },
        Effect::Tint {
            node: "Silhuette".into(),
            color: [0.0, 0.835, 1.0, 0.1],
        },
    ];

    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&spec).unwrap();
    assert!(h.visible("Silhuette_outside_pla"));

    h.tick(animator.as_mut(), 0.1);
    assert!(!h.visible("Silhuette_outside_pla"));
    assert_eq!(
        h.scene.tint(h.node("upper_legs")),
        Some([0.0, 0.835, 1.0, 0.1])
    );
    assert_eq!(
        h.scene.tint(h.node("legs")),
        Some([0.376, 1.0, 0.0, 1.0])
    );

    // Later ticks leave it alone
    let outline = h.node("Silhuette_outside_pla");
    h.scene.set_visible(outline, true);
    h.tick(animator.as_mut(), 0.65);
    assert!(h.visible("Silhuette_outside_pla"));
}

#[test]
fn test_companions_fade_in_turn() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = build_animator(&feature(FOOD)).unwrap();

    h.tick(animator.as_mut(), 0.6125);
    assert!(h.visible("food_01"));
    assert_eq!(h.scene.opacity(h.node("food_01")), Some(1.0));
    assert!(!h.visible("food_02"));

    // Overall 0.28: food_01 is 40% through its fade
    h.tick(animator.as_mut(), 0.628);
    let alpha = h.scene.opacity(h.node("food_01")).unwrap();
    assert!((alpha - 0.4).abs() < 1e-3);
    assert!(h.visible("food_02"));

    h.tick(animator.as_mut(), 0.65);
    assert!(!h.visible("food_01"));

    h.tick(animator.as_mut(), 0.5);
    assert!(!h.visible("food_02"));
    assert!(!h.visible("legs"));
}

// ============================================================================
// Slideshow
// ============================================================================

const SLIDES: &str = r#"
id = "ipad-slides"
asset = "plain_new"

[effect]
kind = "slideshow"
screen = "ipad"
screen_child = 1
start = 0.2
end = 0.3
images = [
    "/images/picture1.png",
    "/images/picture2.png",
    "/images/picture3.png",
    "/images/picture4.png",
    "/images/picture5.png",
    "/images/picture6.png",
]
"#;

fn slideshow() -> SlideshowAnimator {
    let spec = feature(SLIDES);
    match spec.effect {
        FeatureKind::Slideshow(f) => SlideshowAnimator::new(spec.id, spec.asset, f).unwrap(),
        other => panic!("expected slideshow, got {other:?}"),
    }
}

#[test]
fn test_slide_not_reassigned_while_scroll_held() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = slideshow();

    for _ in 0..4 {
        h.tick(&mut animator, 0.21);
    }
    assert_eq!(animator.shown(), Some(0));
    assert_eq!(h.textures.request_count(), 1);
    assert!(h.scene.texture(h.node("ipad_glass")).is_some());
    assert!(h.scene.texture(h.node("ipad_frame")).is_none());
}

#[test]
fn test_stale_load_replaced_by_newer_selection() {
    let mut h = Harness::new(plain_new_scene());
    h.textures = crate::textures::MemoryTextures::new(2);
    let mut animator = slideshow();

    h.tick(&mut animator, 0.21);
    assert_eq!(animator.pending(), Some(0));

    h.tick(&mut animator, 0.26);
    assert_eq!(animator.pending(), Some(3));
    h.tick(&mut animator, 0.26);
    assert_eq!(animator.shown(), None);
    h.tick(&mut animator, 0.26);
    assert_eq!(animator.shown(), Some(3));
    assert_eq!(animator.pending(), None);

    // picture1 was never polled to completion, so nothing else lands
    h.tick(&mut animator, 0.26);
    assert_eq!(animator.shown(), Some(3));
}

#[test]
fn test_leaving_range_drops_pending_load() {
    let mut h = Harness::new(plain_new_scene());
    h.textures = crate::textures::MemoryTextures::new(5);
    let mut animator = slideshow();

    h.tick(&mut animator, 0.21);
    assert!(animator.pending().is_some());
    h.tick(&mut animator, 0.5);
    assert!(animator.pending().is_none());

    h.tick(&mut animator, 0.21);
    assert_eq!(animator.pending(), Some(0));
}

#[test]
fn test_cached_slide_reused() {
    let mut h = Harness::new(plain_new_scene());
    let mut animator = slideshow();

    h.tick(&mut animator, 0.21);
    let first = h.scene.texture(h.node("ipad_glass"));
    h.tick(&mut animator, 0.29);
    assert_eq!(animator.shown(), Some(5));
    h.tick(&mut animator, 0.21);
    assert_eq!(h.scene.texture(h.node("ipad_glass")), first);
    assert_eq!(h.textures.request_count(), 2);
}

#[test]
fn test_failed_slide_logged_and_cleared() {
    let mut h = Harness::new(plain_new_scene());
    h.textures = crate::textures::MemoryTextures::new(0).with_missing("/images/picture1.png");
    let mut animator = slideshow();

    h.tick(&mut animator, 0.21);
    assert_eq!(animator.pending(), None);
    assert_eq!(animator.shown(), None);
}
