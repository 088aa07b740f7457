// Integration tests for soundstage
// These drive the playback manager end to end on the headless engine

use rand::rngs::StdRng;
use rand::SeedableRng;

use soundstage::audio_system::{
    EffectParams, FadeState, HeadlessEngine, PlaybackManager, SoundCategory,
};
use soundstage::AudioConfig;

const EPSILON: f32 = 1e-5;

fn manager() -> PlaybackManager<HeadlessEngine> {
    PlaybackManager::with_rng(HeadlessEngine::new(), StdRng::seed_from_u64(2024)).unwrap()
}

fn with_music(tracks: &[&str]) -> PlaybackManager<HeadlessEngine> {
    let mut manager = manager();
    for track in tracks {
        manager.load_music(track).unwrap();
    }
    manager
}

/// Tick in small steps so each fade crosses several updates
fn tick(manager: &mut PlaybackManager<HeadlessEngine>, seconds: f32) {
    let steps = (seconds / 0.1).round() as usize;
    for _ in 0..steps {
        manager.update(0.1);
    }
}

#[test]
fn test_loading_twice_keeps_one_entry() {
    let mut manager = manager();
    manager.load_effect("sfx/jump.wav").unwrap();
    manager.load_effect("sfx/jump.wav").unwrap();
    manager.load_music("music/theme.ogg").unwrap();
    manager.load_music("music/theme.ogg").unwrap();

    assert_eq!(manager.loaded_count(SoundCategory::Effects), 1);
    assert_eq!(manager.loaded_count(SoundCategory::Music), 1);
    assert_eq!(manager.engine().sounds_created(), 2);
}

#[test]
fn test_failed_load_leaves_no_entry() {
    let engine = HeadlessEngine::new().with_file_check();
    let mut manager = PlaybackManager::with_rng(engine, StdRng::seed_from_u64(1)).unwrap();

    assert!(manager.load_effect("no/such/file.wav").is_err());
    assert_eq!(manager.loaded_count(SoundCategory::Effects), 0);
}

#[test]
fn test_music_fades_in_to_exactly_one() {
    let mut manager = with_music(&["a.ogg"]);
    manager.play_music("a.ogg");

    assert_eq!(manager.current_music(), Some("a.ogg"));
    assert_eq!(manager.fade_state(), FadeState::FadeIn);
    assert_eq!(manager.music_channel_volume(), Some(0.0));

    manager.update(0.4);
    let volume = manager.music_channel_volume().unwrap();
    assert!((volume - 0.4).abs() < EPSILON);

    // Overshooting the fade lands exactly on 1.0
    manager.update(5.0);
    assert_eq!(manager.music_channel_volume(), Some(1.0));
    assert_eq!(manager.fade_state(), FadeState::None);
}

#[test]
fn test_same_track_does_not_restart() {
    let mut manager = with_music(&["a.ogg"]);
    manager.play_music("a.ogg");
    tick(&mut manager, 0.5);
    let before = manager.music_channel_volume().unwrap();

    manager.play_music("a.ogg");

    assert_eq!(manager.engine().channels_playing("a.ogg").len(), 1);
    assert_eq!(manager.music_channel_volume(), Some(before));
    assert_eq!(manager.fade_state(), FadeState::FadeIn);
    assert_eq!(manager.pending_music(), None);
}

#[test]
fn test_switching_tracks_fades_out_then_starts_next() {
    let mut manager = with_music(&["a.ogg", "b.ogg"]);
    manager.play_music("a.ogg");
    tick(&mut manager, 0.5);

    manager.play_music("b.ogg");
    assert_eq!(manager.current_music(), Some("a.ogg"));
    assert_eq!(manager.fade_state(), FadeState::FadeOut);
    assert_eq!(manager.pending_music(), Some("b.ogg"));
    assert!(manager.engine().channels_playing("b.ogg").is_empty());

    // A was at about 0.5, so a little over half a second finishes it
    tick(&mut manager, 0.6);

    assert_eq!(manager.current_music(), Some("b.ogg"));
    assert_eq!(manager.pending_music(), None);
    assert_eq!(manager.fade_state(), FadeState::FadeIn);
    assert!(manager.engine().channels_playing("a.ogg").is_empty());
    assert_eq!(manager.engine().channels_playing("b.ogg").len(), 1);

    tick(&mut manager, 1.2);
    assert_eq!(manager.music_channel_volume(), Some(1.0));
}

#[test]
fn test_latest_request_wins_while_fading_out() {
    let mut manager = with_music(&["a.ogg", "b.ogg", "c.ogg"]);
    manager.play_music("a.ogg");
    tick(&mut manager, 1.2);

    manager.play_music("b.ogg");
    manager.play_music("c.ogg");
    assert_eq!(manager.pending_music(), Some("c.ogg"));

    tick(&mut manager, 1.2);
    assert_eq!(manager.current_music(), Some("c.ogg"));
    assert!(manager.engine().channels_playing("b.ogg").is_empty());
}

#[test]
fn test_requesting_fading_track_keeps_fading_out() {
    let mut manager = with_music(&["a.ogg", "b.ogg"]);
    manager.play_music("a.ogg");
    tick(&mut manager, 1.2);

    manager.play_music("b.ogg");
    tick(&mut manager, 0.3);
    let before = manager.music_channel_volume().unwrap();
    manager.play_music("a.ogg");

    assert_eq!(manager.current_music(), Some("a.ogg"));
    assert_eq!(manager.fade_state(), FadeState::FadeOut);
    assert_eq!(manager.pending_music(), Some("b.ogg"));
    assert_eq!(manager.music_channel_volume(), Some(before));
    assert_eq!(manager.engine().channels_playing("a.ogg").len(), 1);

    tick(&mut manager, 1.0);
    assert_eq!(manager.current_music(), Some("b.ogg"));
    assert!(manager.engine().channels_playing("a.ogg").is_empty());
}

#[test]
fn test_pending_track_starts_in_the_finishing_update() {
    let mut manager = with_music(&["a.ogg", "b.ogg"]);
    manager.play_music("a.ogg");
    manager.update(1.0);
    assert_eq!(manager.music_channel_volume(), Some(1.0));

    manager.play_music("b.ogg");
    manager.update(1.0);

    assert_eq!(manager.current_music(), Some("b.ogg"));
    assert_eq!(manager.music_channel_volume(), Some(0.0));
    assert_eq!(manager.fade_state(), FadeState::FadeIn);
    assert_eq!(manager.pending_music(), None);
    assert!(manager.engine().channels_playing("a.ogg").is_empty());
}

#[test]
fn test_one_shot_channels_are_reclaimed_on_update() {
    let mut manager = with_music(&["a.ogg"]);
    manager.load_effect("hit.wav").unwrap();
    manager.play_music("a.ogg");

    for _ in 0..1000 {
        manager.play_effect("hit.wav", EffectParams::default());
        manager.update(0.5);
    }

    assert!(manager.engine().channels_playing("hit.wav").is_empty());
    assert_eq!(manager.engine().channel_count(), 1);
}

#[test]
fn test_stop_music_fades_out_and_clears() {
    let mut manager = with_music(&["a.ogg", "b.ogg"]);
    manager.play_music("a.ogg");
    tick(&mut manager, 1.2);

    manager.play_music("b.ogg");
    manager.stop_music();
    assert_eq!(manager.pending_music(), None);

    manager.update(0.25);
    let volume = manager.music_channel_volume().unwrap();
    assert!((0.0..=1.0).contains(&volume));

    manager.update(10.0);
    assert_eq!(manager.current_music(), None);
    assert_eq!(manager.fade_state(), FadeState::None);
    assert_eq!(manager.engine().channel_count(), 0);

    // Nothing pending, so nothing starts later
    tick(&mut manager, 1.0);
    assert_eq!(manager.current_music(), None);
}

#[test]
fn test_stop_music_without_music_is_noop() {
    let mut manager = with_music(&["a.ogg"]);
    manager.stop_music();
    manager.update(1.0);
    assert_eq!(manager.current_music(), None);
}

#[test]
fn test_volume_stays_in_bounds_during_fades() {
    let mut manager = with_music(&["a.ogg", "b.ogg"]);
    manager.play_music("a.ogg");

    for step in 0..200 {
        if step == 50 {
            manager.play_music("b.ogg");
        }
        manager.update(0.037);
        if let Some(volume) = manager.music_channel_volume() {
            assert!((0.0..=1.0).contains(&volume), "volume {} out of range", volume);
        }
    }
    assert_eq!(manager.current_music(), Some("b.ogg"));
}

#[test]
fn test_unloaded_music_is_ignored() {
    let mut manager = manager();
    manager.play_music("missing.ogg");
    manager.update(1.0);

    assert_eq!(manager.current_music(), None);
    assert_eq!(manager.engine().channel_count(), 0);
}

#[test]
fn test_fixed_effect_volume_is_exact() {
    let mut manager = manager();
    manager.load_effect("hit.wav").unwrap();

    let params = EffectParams::none().with_volume(0.35, 0.35);
    for _ in 0..20 {
        manager.play_effect("hit.wav", params);
    }

    let channels = manager.engine().channels_playing("hit.wav");
    assert_eq!(channels.len(), 20);
    for channel in channels {
        assert_eq!(channel.volume, 0.35);
        assert_eq!(channel.frequency, 44_100.0);
        assert!(!channel.paused);
        assert!(!channel.looping);
    }
}

#[test]
fn test_effect_variation_stays_in_range() {
    let mut manager = manager();
    manager.load_effect("hit.wav").unwrap();

    let params = EffectParams::none().with_volume(0.5, 0.9).with_pitch(-12.0, 12.0);
    for _ in 0..50 {
        manager.play_effect("hit.wav", params);
    }

    for channel in manager.engine().channels() {
        assert!((0.5..=0.9).contains(&channel.volume));
        assert!(channel.frequency >= 22_050.0 - 0.5 && channel.frequency <= 88_200.0 + 0.5);
    }
}

#[test]
fn test_unloaded_effect_is_ignored() {
    let mut manager = manager();
    manager.load_effect("hit.wav").unwrap();

    manager.play_effect("missing.wav", EffectParams::default());

    assert_eq!(manager.engine().channel_count(), 0);
    assert_eq!(manager.loaded_count(SoundCategory::Effects), 1);
}

#[test]
fn test_stop_effects_leaves_music_playing() {
    let mut manager = with_music(&["a.ogg"]);
    manager.load_effect("hit.wav").unwrap();
    manager.play_music("a.ogg");
    manager.play_effect("hit.wav", EffectParams::default());
    manager.play_effect("hit.wav", EffectParams::default());

    manager.stop_effects();

    assert!(manager.engine().channels_playing("hit.wav").is_empty());
    assert_eq!(manager.engine().channels_playing("a.ogg").len(), 1);
}

#[test]
fn test_effect_channel_limit_is_swallowed() {
    let engine = HeadlessEngine::new().with_max_channels(2);
    let mut manager = PlaybackManager::with_rng(engine, StdRng::seed_from_u64(3)).unwrap();
    manager.load_effect("hit.wav").unwrap();

    for _ in 0..5 {
        manager.play_effect("hit.wav", EffectParams::default());
    }
    assert_eq!(manager.engine().channel_count(), 2);
}

#[test]
fn test_volume_setters_are_independent() {
    let mut manager = manager();
    manager.set_master_volume(0.8);
    manager.set_effects_volume(0.5);
    manager.set_music_volume(1.7);

    assert_eq!(manager.master_volume(), 0.8);
    assert_eq!(manager.category_volume(SoundCategory::Effects), 0.5);
    assert_eq!(manager.category_volume(SoundCategory::Music), 1.0); // Clamped
}

#[test]
fn test_apply_config() {
    let mut manager = with_music(&["a.ogg"]);
    let config = AudioConfig {
        master_volume: 0.9,
        effects_volume: 0.6,
        music_volume: 0.3,
        fade_seconds: 2.0,
        ..AudioConfig::default()
    };
    manager.apply_config(&config);

    assert_eq!(manager.master_volume(), 0.9);
    assert_eq!(manager.category_volume(SoundCategory::Effects), 0.6);
    assert_eq!(manager.category_volume(SoundCategory::Music), 0.3);

    // Fades now take two seconds
    manager.play_music("a.ogg");
    manager.update(1.0);
    let volume = manager.music_channel_volume().unwrap();
    assert!((volume - 0.5).abs() < EPSILON);
}

#[test]
fn test_update_ticks_engine_every_call() {
    let mut manager = manager();
    for _ in 0..7 {
        manager.update(0.016);
    }
    assert_eq!(manager.engine().updates(), 7);
}
