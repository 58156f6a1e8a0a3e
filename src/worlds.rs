//! Static world table and speed curve

use serde::Serialize;

use crate::consts::DEFAULT_SPEED;

/// A themed group of stages sharing a speed curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldConfig {
    pub id: u32,
    pub name: &'static str,
    pub name_ko: &'static str,
    pub stages: u32,
    /// Fall speed at stage 1 (pixels per 60 Hz frame)
    pub base_speed: f32,
    /// Speed gained across one full stage
    pub speed_increment: f32,
    pub color: &'static str,
}

const fn world(
    id: u32,
    name: &'static str,
    name_ko: &'static str,
    base_speed: f32,
    speed_increment: f32,
    color: &'static str,
) -> WorldConfig {
    WorldConfig {
        id,
        name,
        name_ko,
        stages: 33,
        base_speed,
        speed_increment,
        color,
    }
}

pub const WORLDS: &[WorldConfig] = &[
    world(1, "Supervivencia", "생존·기초기능어", 0.3, 0.015, "#4a9c6d"),
    world(2, "Personas", "사람·가족", 0.35, 0.018, "#c9a227"),
    world(3, "Casa y Lugar", "집·위치", 0.4, 0.02, "#a23b72"),
    world(4, "Comida y Compra", "음식·쇼핑", 0.45, 0.02, "#2e86ab"),
    world(5, "Escuela y Trabajo", "학교·일상동사", 0.5, 0.022, "#e07a5f"),
    world(6, "Ciudad y Tránsito", "도시·교통", 0.55, 0.022, "#81b29a"),
    world(7, "Viaje y Problemas", "여행·문제해결", 0.6, 0.025, "#f2cc8f"),
    world(8, "Salud", "건강·병원", 0.65, 0.025, "#6d6875"),
    world(9, "Opinión y Emoción", "취미·감정·의견", 0.7, 0.028, "#e63946"),
    world(10, "Sociedad y Naturaleza", "사회·자연·추상", 0.75, 0.03, "#457b9d"),
];

pub fn world_config(world_id: u32) -> Option<&'static WorldConfig> {
    WORLDS.iter().find(|w| w.id == world_id)
}

pub fn world_count() -> u32 {
    WORLDS.len() as u32
}

/// Fall speed for a stage at the given progress (0..=1)
///
/// Unknown worlds fall back to `DEFAULT_SPEED`.
pub fn calculate_speed(world_id: u32, stage_num: u32, progress_ratio: f32) -> f32 {
    let Some(world) = world_config(world_id) else {
        return DEFAULT_SPEED;
    };
    let stage_bonus = stage_num.saturating_sub(1) as f32 * 0.02;
    let progress_bonus = progress_ratio * world.speed_increment * 10.0;
    world.base_speed + stage_bonus + progress_bonus
}

/// Stage after this one, crossing into the next world; `None` after the last
pub fn next_stage(world_id: u32, stage_num: u32) -> Option<(u32, u32)> {
    let world = world_config(world_id)?;
    if stage_num < world.stages {
        return Some((world_id, stage_num + 1));
    }
    world_config(world_id + 1).map(|next| (next.id, 1))
}

/// Stage before this one, crossing back into the previous world
pub fn previous_stage(world_id: u32, stage_num: u32) -> Option<(u32, u32)> {
    if stage_num > 1 {
        return Some((world_id, stage_num - 1));
    }
    let prev = world_config(world_id.checked_sub(1)?)?;
    Some((prev.id, prev.stages))
}
