//! Synthetic player and agent population.
//!
//! Agents walk straight at the player and hit on contact. The player wanders
//! and attacks the closest agent in reach. Waves and upgrades feed back into
//! the population and the player's damage.

use std::collections::BTreeMap;

use director_content::ItemCatalog;
use director_core::{
    AgentId, Difficulty, DirectorRng, ItemCategory, Rarity, TelemetryEvent, TelemetrySnapshot,
    env::seeded,
};
use director_runtime::UpgradeOffer;
use glam::Vec2;
use rand::Rng;

const MAX_HP: f32 = 100.0;
const PLAYER_SPEED: f32 = 4.0;
const AGENT_SPEED: f32 = 2.5;
const CONTACT_RADIUS: f32 = 1.2;
const ATTACK_RADIUS: f32 = 5.0;
const SPAWN_RADIUS: f32 = 14.0;
const REGEN_PER_SEC: f32 = 1.5;

#[derive(Clone, Copy, Debug)]
struct Agent {
    position: Vec2,
    health: f32,
    first_hit_at: Option<f32>,
}

/// Everything the host reports to the director after one step.
#[derive(Debug, Default)]
pub struct Frame {
    pub telemetry: Vec<TelemetryEvent>,
    pub spawned: Vec<(AgentId, Vec2)>,
    pub moved: Vec<(AgentId, Vec2)>,
    pub hits: Vec<AgentId>,
    pub deaths: Vec<AgentId>,
}

pub struct World {
    rng: DirectorRng,
    catalog: ItemCatalog,
    clock: f32,
    position: Vec2,
    heading: f32,
    hp: f32,
    power: f32,
    /// Item name to level.
    inventory: BTreeMap<String, u32>,
    agents: BTreeMap<AgentId, Agent>,
    next_id: u32,
    pending_spawns: Vec<(AgentId, Vec2)>,
}

impl World {
    pub fn new(seed: u64, catalog: ItemCatalog) -> Self {
        Self {
            rng: seeded(seed),
            catalog,
            clock: 0.0,
            position: Vec2::ZERO,
            heading: 0.0,
            hp: MAX_HP,
            power: 1.0,
            inventory: BTreeMap::new(),
            agents: BTreeMap::new(),
            next_id: 0,
            pending_spawns: Vec::new(),
        }
    }

    pub fn alive(&self) -> usize {
        self.agents.len()
    }

    pub fn hp(&self) -> f32 {
        self.hp
    }

    /// Places `count` agents on a ring around the player.
    pub fn spawn(&mut self, count: u32) {
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0f32..std::f32::consts::TAU);
            let position = self.position + Vec2::from_angle(angle) * SPAWN_RADIUS;
            let id = AgentId(self.next_id);
            self.next_id += 1;
            self.agents.insert(
                id,
                Agent {
                    position,
                    health: 10.0,
                    first_hit_at: None,
                },
            );
            self.pending_spawns.push((id, position));
        }
    }

    /// Spawns a wave sized by its requested difficulty.
    pub fn spawn_wave(&mut self, difficulty: Difficulty) {
        let count = match difficulty {
            Difficulty::Easy => 3,
            Difficulty::Medium => 5,
            Difficulty::Hard => 8,
        };
        self.spawn(count);
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        let inventory = self
            .catalog
            .tally(self.inventory.iter().map(|(name, level)| (name.as_str(), *level)));
        TelemetrySnapshot::new(self.hp, MAX_HP)
            .with_movement(Vec2::from_angle(self.heading))
            .with_position(self.position)
            .with_inventory(inventory)
    }

    /// Advances the world by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> Frame {
        self.clock += dt;
        let mut frame = Frame {
            spawned: std::mem::take(&mut self.pending_spawns),
            ..Frame::default()
        };

        self.heading += self.rng.gen_range(-1.0f32..1.0) * dt * 2.0;
        self.position += Vec2::from_angle(self.heading) * PLAYER_SPEED * dt;

        for (&id, agent) in self.agents.iter_mut() {
            let to_player = self.position - agent.position;
            if to_player.length() > CONTACT_RADIUS {
                agent.position += to_player.normalize_or_zero() * AGENT_SPEED * dt;
                frame.moved.push((id, agent.position));
            } else if self.rng.gen_bool((0.8 * dt).clamp(0.0, 1.0) as f64) {
                let damage: f32 = self.rng.gen_range(3.0..7.0);
                self.hp -= damage;
                frame.hits.push(id);
                frame.telemetry.push(TelemetryEvent::DamageTaken(damage));
            }
        }

        self.attack(dt, &mut frame);

        self.hp = (self.hp + REGEN_PER_SEC * dt).min(MAX_HP);
        if self.hp <= 0.0 {
            tracing::info!("World: player went down at {:.1}s, reviving", self.clock);
            self.hp = MAX_HP;
        }
        frame
    }

    fn attack(&mut self, dt: f32, frame: &mut Frame) {
        let position = self.position;
        let target = self
            .agents
            .iter()
            .map(|(&id, agent)| (id, agent.position.distance(position)))
            .filter(|(_, distance)| *distance < ATTACK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);
        let Some(id) = target else {
            return;
        };

        let damage = 12.0 * self.power * dt * self.rng.gen_range(0.5f32..1.5);
        let clock = self.clock;
        let Some(agent) = self.agents.get_mut(&id) else {
            return;
        };
        agent.first_hit_at.get_or_insert(clock);
        agent.health -= damage;
        frame.telemetry.push(TelemetryEvent::DamageDealt(damage));

        if agent.health <= 0.0 {
            let ttk = clock - agent.first_hit_at.unwrap_or(clock);
            self.agents.remove(&id);
            frame.deaths.push(id);
            frame.telemetry.push(TelemetryEvent::Kill { ttk });
        }
    }

    /// Offers drawn from the catalog with random rarities.
    pub fn upgrade_pool(&mut self) -> Vec<UpgradeOffer> {
        let named = [
            (ItemCategory::Brutality, &self.catalog.brutality),
            (ItemCategory::Tactics, &self.catalog.tactics),
            (ItemCategory::Survival, &self.catalog.survival),
        ];
        let mut pool = Vec::new();
        for (category, names) in named {
            for name in names {
                let rarity = match self.rng.gen_range(0u32..100) {
                    0..=54 => Rarity::Common,
                    55..=79 => Rarity::Uncommon,
                    80..=93 => Rarity::Rare,
                    94..=98 => Rarity::Ssr,
                    _ => Rarity::Evolution,
                };
                pool.push(UpgradeOffer::new(name.clone(), Some(category), rarity));
            }
        }
        pool
    }

    /// Levels up the picked item and reports the pickup.
    pub fn take_upgrade(&mut self, offer: &UpgradeOffer) -> Option<TelemetryEvent> {
        *self.inventory.entry(offer.name.clone()).or_insert(0) += 1;
        self.power += match offer.category {
            Some(ItemCategory::Brutality) => 0.15,
            Some(_) => 0.05,
            None => 0.0,
        };
        offer.category.map(|category| TelemetryEvent::ItemPicked {
            category,
            rarity: offer.rarity,
        })
    }
}
