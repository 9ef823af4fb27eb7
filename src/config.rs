/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Every tuning value the simulation uses lives here; the defaults are
/// the canonical gameplay numbers.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub general: GeneralConfig,
    pub gamepad: GamepadConfig,
}

/// All world-unit tuning. Velocities are per frame (fixed timestep).
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_power: f32,      // negative = upward
    pub speed_x: f32,
    pub player_size: f32,
    pub lava_speed: f32,
    pub platform_width: f32,
    pub platform_height: f32,
    pub platform_gap: f32,
    pub gap_jitter: f32,
    pub wall_margin: f32,
    pub floor_height: f32,
    pub world_depth: f32,     // generate platforms until y < -world_depth
    pub camera_lag: f32,
    pub moving_min_index: usize,
    pub moving_chance: f32,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub tick_rate_ms: u64,
    /// Fixed RNG seed for reproducible runs. None = entropy-seeded.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_power")]
    jump_power: f32,
    #[serde(default = "default_speed_x")]
    speed_x: f32,
    #[serde(default = "default_player_size")]
    player_size: f32,
    #[serde(default = "default_lava_speed")]
    lava_speed: f32,
    #[serde(default = "default_platform_width")]
    platform_width: f32,
    #[serde(default = "default_platform_height")]
    platform_height: f32,
    #[serde(default = "default_platform_gap")]
    platform_gap: f32,
    #[serde(default = "default_gap_jitter")]
    gap_jitter: f32,
    #[serde(default = "default_wall_margin")]
    wall_margin: f32,
    #[serde(default = "default_floor_height")]
    floor_height: f32,
    #[serde(default = "default_world_depth")]
    world_depth: f32,
    #[serde(default = "default_camera_lag")]
    camera_lag: f32,
    #[serde(default = "default_moving_min_index")]
    moving_min_index: usize,
    #[serde(default = "default_moving_chance")]
    moving_chance: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_gravity() -> f32 { 0.4 }
fn default_jump_power() -> f32 { -12.0 }
fn default_speed_x() -> f32 { 3.0 }
fn default_player_size() -> f32 { 20.0 }
fn default_lava_speed() -> f32 { 1.0 }
fn default_platform_width() -> f32 { 170.0 }
fn default_platform_height() -> f32 { 10.0 }
fn default_platform_gap() -> f32 { 120.0 }
fn default_gap_jitter() -> f32 { 40.0 }
fn default_wall_margin() -> f32 { 10.0 }
fn default_floor_height() -> f32 { 100.0 }
fn default_world_depth() -> f32 { 50_000.0 }
fn default_camera_lag() -> f32 { 0.1 }
fn default_moving_min_index() -> usize { 99 }   // static tower first, movers later
fn default_moving_chance() -> f32 { 0.3 }

fn default_tick_rate() -> u64 { 16 }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into(), "X".into(), "Y".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_pad_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            jump_power: default_jump_power(),
            speed_x: default_speed_x(),
            player_size: default_player_size(),
            lava_speed: default_lava_speed(),
            platform_width: default_platform_width(),
            platform_height: default_platform_height(),
            platform_gap: default_platform_gap(),
            gap_jitter: default_gap_jitter(),
            wall_margin: default_wall_margin(),
            floor_height: default_floor_height(),
            world_depth: default_world_depth(),
            camera_lag: default_camera_lag(),
            moving_min_index: default_moving_min_index(),
            moving_chance: default_moving_chance(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_rate_ms: default_tick_rate(),
            seed: None,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            confirm: default_pad_confirm(),
            cancel: default_pad_cancel(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        TomlPhysics::default().into()
    }
}

impl From<TomlPhysics> for PhysicsConfig {
    fn from(t: TomlPhysics) -> Self {
        PhysicsConfig {
            gravity: t.gravity,
            jump_power: t.jump_power,
            speed_x: t.speed_x,
            player_size: t.player_size,
            lava_speed: t.lava_speed,
            platform_width: t.platform_width,
            platform_height: t.platform_height,
            platform_gap: t.platform_gap,
            gap_jitter: t.gap_jitter,
            wall_margin: t.wall_margin,
            floor_height: t.floor_height,
            world_depth: t.world_depth,
            camera_lag: t.camera_lag,
            moving_min_index: t.moving_min_index,
            moving_chance: t.moving_chance,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        load_toml(&candidate_dirs()).into()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            physics: t.physics.into(),
            general: GeneralConfig {
                tick_rate_ms: t.general.tick_rate_ms,
                seed: t.general.seed,
            },
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
