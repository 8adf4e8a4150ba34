use glam::Vec3;
use tankfield_common::{ObstacleId, SceneHandle, SceneNode, TileCoord, Transform};
use tankfield_input::{FireTrigger, InputSnapshot, TriggerSignal};
use tankfield_stream::{ObstacleManager, StreamDelta, TerrainManager};

use crate::camera::{CameraPose, ChaseCamera};
use crate::collision::CollisionManager;
use crate::config::{ConfigError, GameConfig};
use crate::projectile::{FireReport, ProjectileManager, ProjectileOutcome};
use crate::tank::{MoveOutcome, Tank};

/// Session-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    /// Never decreases.
    pub score: u64,
    pub is_playing: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            score: 0,
            is_playing: true,
        }
    }
}

/// A lifecycle event, logged as it happens and drained into each frame report.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    TileCreated(TileCoord),
    TileEvicted(TileCoord),
    TankBlocked(ObstacleId),
    ProjectileFired(FireReport),
    ProjectileFinished(ProjectileOutcome),
    ScoreChanged { score: u64 },
    Paused,
    Resumed,
}

/// Everything the host needs after one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub tick: u64,
    pub tank: Transform,
    pub camera: CameraPose,
    pub movement: MoveOutcome,
    pub stream: StreamDelta,
    pub fired: Option<FireReport>,
    pub outcomes: Vec<ProjectileOutcome>,
    pub score: u64,
    pub events: Vec<GameEvent>,
}

/// The game loop root. Owns every entity and manager.
///
/// All mutation goes through [`Game::frame`], which runs the subsystems in a
/// fixed order: fire trigger, tank, terrain and obstacles, collision cache,
/// projectiles, camera.
pub struct Game {
    config: GameConfig,
    tank: Tank,
    terrain: TerrainManager,
    obstacles: ObstacleManager,
    collision: CollisionManager,
    projectiles: ProjectileManager,
    trigger: FireTrigger,
    camera: ChaseCamera,
    camera_pose: CameraPose,
    state: GameState,
    tick: u64,
    event_log: Vec<GameEvent>,
}

impl Game {
    /// Spawn the tank at the origin and generate the terrain around it.
    ///
    /// The config is validated first; nothing reaches the scene if it is
    /// rejected.
    pub fn new(config: GameConfig, scene: &mut dyn SceneHandle) -> Result<Self, ConfigError> {
        let _span = tracing::info_span!("game_init").entered();
        config.validate()?;

        let mut terrain = TerrainManager::new(config.terrain.clone());
        let mut obstacles = ObstacleManager::new(config.obstacles.clone(), config.terrain.seed);
        let stream = terrain.create_terrain(scene, &mut obstacles);

        let mut tank = Tank::new(&config.tank);
        let ground = terrain.tile(TileCoord::new(0, 0)).and_then(|t| t.height_at(0.0, 0.0));
        if let Some(ground) = ground {
            tank.transform.position.y = ground + tank.ride_height;
        }
        scene.add(SceneNode::Tank(tank.id()), tank.transform);

        let mut collision = CollisionManager::new();
        collision.update_obstacles(obstacles.obstacles());

        let camera = ChaseCamera::from(&config.camera);
        let camera_pose = camera.follow(&tank.transform);
        let projectiles = ProjectileManager::new(config.projectiles.clone());

        let event_log = stream.created.iter().copied().map(GameEvent::TileCreated).collect();

        tracing::info!(
            tiles = terrain.live_count(),
            obstacles = obstacles.len(),
            seed = config.terrain.seed,
            "game initialized"
        );

        Ok(Self {
            config,
            tank,
            terrain,
            obstacles,
            collision,
            projectiles,
            trigger: FireTrigger::new(),
            camera,
            camera_pose,
            state: GameState::default(),
            tick: 0,
            event_log,
        })
    }

    /// Run one frame. `dt` is the real frame delta in seconds; it drives
    /// projectile flight and charging, while tank speeds are per frame.
    pub fn frame(
        &mut self,
        input: &InputSnapshot,
        dt: f32,
        scene: &mut dyn SceneHandle,
    ) -> FrameReport {
        let _span = tracing::info_span!("frame", tick = self.tick).entered();

        if !self.state.is_playing {
            // Keep the fire edge in step with the keys, but a shot released
            // while paused is dropped along with its charge.
            if self.trigger.update(input) == TriggerSignal::Fire {
                self.projectiles.cancel_charge();
            }
            self.camera_pose = self.camera.follow(&self.tank.transform);
            return self.report(MoveOutcome::Stationary, StreamDelta::default(), None, Vec::new());
        }

        let signal = self.trigger.update(input);

        let movement = self.tank.update_movement(
            input,
            &self.collision,
            &self.terrain.current_terrain(),
        );
        if let MoveOutcome::Blocked(obstacle) = movement {
            self.event_log.push(GameEvent::TankBlocked(obstacle));
        }
        scene.set_transform(SceneNode::Tank(self.tank.id()), self.tank.transform);

        let stream = self
            .terrain
            .update_terrain(self.tank.position(), scene, &mut self.obstacles);
        self.event_log
            .extend(stream.evicted.iter().copied().map(GameEvent::TileEvicted));
        self.event_log
            .extend(stream.created.iter().copied().map(GameEvent::TileCreated));

        self.collision.update_obstacles(self.obstacles.obstacles());

        let fired = match signal {
            TriggerSignal::Charge => {
                self.projectiles.start_charging(dt);
                None
            }
            TriggerSignal::Fire => {
                let report = self.projectiles.fire(&self.tank, scene);
                if let Some(dropped) = report.dropped {
                    self.event_log.push(GameEvent::ProjectileFinished(dropped));
                }
                self.event_log.push(GameEvent::ProjectileFired(report));
                Some(report)
            }
            TriggerSignal::None => None,
        };

        let outcomes = self.projectiles.update(
            dt,
            scene,
            &self.collision,
            &self.terrain.current_terrain(),
        );
        for outcome in &outcomes {
            self.event_log.push(GameEvent::ProjectileFinished(*outcome));
            if outcome.scores() {
                self.state.score += 1;
                tracing::info!(score = self.state.score, "target hit");
                self.event_log.push(GameEvent::ScoreChanged {
                    score: self.state.score,
                });
            }
        }

        self.camera_pose = self.camera.follow(&self.tank.transform);
        self.tick += 1;

        tracing::trace!(
            pos = ?self.tank.position(),
            yaw = self.tank.yaw(),
            projectiles = self.projectiles.len(),
            obstacles = self.obstacles.len(),
            "frame complete"
        );

        self.report(movement, stream, fired, outcomes)
    }

    /// Pause or resume the simulation.
    ///
    /// Paused frames refresh the camera and track the fire key, nothing else.
    /// Releasing fire while paused never fires, before or after resuming.
    pub fn set_playing(&mut self, playing: bool) {
        if self.state.is_playing == playing {
            return;
        }
        self.state.is_playing = playing;
        self.event_log.push(if playing {
            GameEvent::Resumed
        } else {
            GameEvent::Paused
        });
        tracing::info!(playing, "play state changed");
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn tank(&self) -> &Tank {
        &self.tank
    }

    pub fn terrain(&self) -> &TerrainManager {
        &self.terrain
    }

    pub fn obstacles(&self) -> &ObstacleManager {
        &self.obstacles
    }

    pub fn collision(&self) -> &CollisionManager {
        &self.collision
    }

    pub fn projectiles(&self) -> &ProjectileManager {
        &self.projectiles
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera_pose
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    /// Frames simulated so far (paused frames don't count).
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Events logged since the last frame report.
    pub fn events(&self) -> &[GameEvent] {
        &self.event_log
    }

    /// Deterministic hash of the simulation state for replay comparisons.
    ///
    /// Entity ids are random and left out; everything else that evolves
    /// frame to frame is covered, in canonical order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        let mix_vec = |h: &mut u64, v: Vec3| {
            mix(h, &v.x.to_le_bytes());
            mix(h, &v.y.to_le_bytes());
            mix(h, &v.z.to_le_bytes());
        };

        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.state.score.to_le_bytes());
        mix_vec(&mut h, self.tank.position());
        mix(&mut h, &self.tank.yaw().to_le_bytes());
        mix(&mut h, &self.projectiles.charge().power().to_le_bytes());
        for coord in self.terrain.live_tiles() {
            mix(&mut h, &coord.x.to_le_bytes());
            mix(&mut h, &coord.z.to_le_bytes());
        }
        for o in self.obstacles.obstacles() {
            mix(&mut h, &o.id.index.to_le_bytes());
            mix_vec(&mut h, o.position);
        }
        for p in self.projectiles.projectiles() {
            mix_vec(&mut h, p.position);
            mix_vec(&mut h, p.velocity);
            mix(&mut h, &p.ttl.to_le_bytes());
        }
        h
    }

    fn report(
        &mut self,
        movement: MoveOutcome,
        stream: StreamDelta,
        fired: Option<FireReport>,
        outcomes: Vec<ProjectileOutcome>,
    ) -> FrameReport {
        FrameReport {
            tick: self.tick,
            tank: self.tank.transform,
            camera: self.camera_pose,
            movement,
            stream,
            fired,
            outcomes,
            score: self.state.score,
            events: std::mem::take(&mut self.event_log),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectileConfig;
    use crate::projectile::ProjectileFate;
    use tankfield_common::SceneGraph;
    use tankfield_input::{InputState, Key};
    use tankfield_stream::{ObstacleConfig, TerrainConfig};

    const DT: f32 = 1.0 / 60.0;

    fn open_field() -> GameConfig {
        GameConfig {
            terrain: TerrainConfig::flat(),
            obstacles: ObstacleConfig::none(),
            ..GameConfig::default()
        }
    }

    fn forward() -> InputSnapshot {
        InputSnapshot {
            forward: true,
            ..InputSnapshot::default()
        }
    }

    fn fire_held() -> InputSnapshot {
        InputSnapshot {
            charge_held: true,
            ..InputSnapshot::default()
        }
    }

    #[test]
    fn new_game_populates_the_scene() {
        let mut scene = SceneGraph::new();
        let game = Game::new(GameConfig::default(), &mut scene).unwrap();
        assert_eq!(game.terrain().live_count(), 25);
        assert!(scene.contains(SceneNode::Tank(game.tank().id())));
        assert_eq!(scene.len(), 25 + game.obstacles().len() + 1);
        assert_eq!(game.collision().len(), game.obstacles().len());
        assert_eq!(game.events().len(), 25);
        assert!(game.state().is_playing);
    }

    #[test]
    fn tank_starts_on_the_ground() {
        let mut scene = SceneGraph::new();
        let game = Game::new(GameConfig::default(), &mut scene).unwrap();
        let ground = tankfield_stream::sample_height(&game.config().terrain, 0.0, 0.0);
        assert!((game.tank().position().y - (ground + 0.5)).abs() < 1e-4);
    }

    #[test]
    fn forward_ten_frames_end_to_end() {
        let mut scene = SceneGraph::new();
        let mut game = Game::new(open_field(), &mut scene).unwrap();
        let start = game.tank().transform;

        for _ in 0..10 {
            game.frame(&forward(), DT, &mut scene);
        }
        let end = game.tank().transform;
        assert!((end.position.z - start.position.z - 1.0).abs() < 1e-5);
        assert_eq!(end.position.x, start.position.x);
        assert_eq!(end.yaw, start.yaw);
        assert_eq!(game.tick(), 10);
        assert_eq!(
            scene.get(SceneNode::Tank(game.tank().id())).unwrap().position,
            end.position
        );
    }

    #[test]
    fn idle_frames_change_nothing_but_the_tick() {
        let mut scene = SceneGraph::new();
        let mut game = Game::new(GameConfig::default(), &mut scene).unwrap();
        let start = game.tank().transform;
        let adds = scene.adds();
        for _ in 0..5 {
            let report = game.frame(&InputSnapshot::idle(), DT, &mut scene);
            assert!(report.stream.is_empty());
            assert_eq!(report.movement, MoveOutcome::Stationary);
        }
        assert_eq!(game.tank().transform, start);
        assert_eq!(scene.adds(), adds);
    }

    #[test]
    fn hold_and_release_fires_once() {
        let mut scene = SceneGraph::new();
        let mut game = Game::new(open_field(), &mut scene).unwrap();

        for _ in 0..30 {
            let report = game.frame(&fire_held(), DT, &mut scene);
            assert!(report.fired.is_none());
        }
        let release = game.frame(&InputSnapshot::idle(), DT, &mut scene);
        let fired = release.fired.expect("release should fire");
        assert!(fired.speed > ProjectileConfig::default().base_speed);
        assert_eq!(game.projectiles().len(), 1);

        for _ in 0..10 {
            let report = game.frame(&InputSnapshot::idle(), DT, &mut scene);
            assert!(report.fired.is_none());
        }
        assert_eq!(game.projectiles().len(), 1);
    }

    #[test]
    fn longer_charge_fires_faster() {
        fn speed_after(frames: usize) -> f32 {
            let mut scene = SceneGraph::new();
            let mut game = Game::new(open_field(), &mut scene).unwrap();
            for _ in 0..frames {
                game.frame(&fire_held(), DT, &mut scene);
            }
            game.frame(&InputSnapshot::idle(), DT, &mut scene)
                .fired
                .unwrap()
                .speed
        }
        let base = ProjectileConfig::default().base_speed;
        let short = speed_after(5);
        let long = speed_after(50);
        assert!(short >= base);
        assert!(long > short);
        assert_eq!(speed_after(400), speed_after(500));
    }

    #[test]
    fn tapped_fire_between_frames_fires_at_base_speed() {
        let mut scene = SceneGraph::new();
        let mut game = Game::new(open_field(), &mut scene).unwrap();
        let mut input = InputState::new();
        input.press(Key::Fire);
        input.release(Key::Fire);

        let report = game.frame(&input.snapshot(), DT, &mut scene);
        assert_eq!(report.fired.unwrap().speed, ProjectileConfig::default().base_speed);
        let report = game.frame(&input.snapshot(), DT, &mut scene);
        assert!(report.fired.is_none());
    }

    #[test]
    fn projectile_expires_without_scoring() {
        let mut config = open_field();
        config.projectiles.ttl = 0.5;
        let mut scene = SceneGraph::new();
        let mut game = Game::new(config, &mut scene).unwrap();

        game.frame(&fire_held(), DT, &mut scene);
        game.frame(&InputSnapshot::idle(), DT, &mut scene);
        assert_eq!(game.projectiles().len(), 1);

        let mut fates = Vec::new();
        for _ in 0..60 {
            let report = game.frame(&InputSnapshot::idle(), DT, &mut scene);
            fates.extend(report.outcomes.iter().map(|o| o.fate));
        }
        assert_eq!(fates, vec![ProjectileFate::Expired]);
        assert_eq!(game.score(), 0);
        assert!(game.projectiles().is_empty());
        assert_eq!(scene.count_where(|n| matches!(n, SceneNode::Projectile(_))), 0);
    }

    #[test]
    fn scoring_hit_increments_score() {
        // Dense crates everywhere except the spawn clearance.
        let config = GameConfig {
            terrain: TerrainConfig::flat(),
            obstacles: ObstacleConfig {
                min_per_tile: 8,
                max_per_tile: 8,
                spawn_clearance: 4.0,
                ..ObstacleConfig::default()
            },
            ..GameConfig::default()
        };
        let mut scene = SceneGraph::new();
        let mut game = Game::new(config, &mut scene).unwrap();

        let mut score_events = 0;
        let mut impacts = 0;
        // Fire in a slow circle so something is eventually in the line of fire.
        for i in 0..2000 {
            let input = InputSnapshot {
                turn_left: true,
                charge_held: i % 20 < 10,
                ..InputSnapshot::default()
            };
            let report = game.frame(&input, DT, &mut scene);
            impacts += report
                .outcomes
                .iter()
                .filter(|o| matches!(o.fate, ProjectileFate::Impact { .. }))
                .count();
            score_events += report
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::ScoreChanged { .. }))
                .count();
        }
        assert!(impacts > 0, "no projectile ever hit an obstacle");
        assert_eq!(game.score(), score_events as u64);
        assert!(game.score() <= impacts as u64);
    }

    #[test]
    fn driving_streams_terrain_and_keeps_obstacles_consistent() {
        let mut config = GameConfig::default();
        config.tank.move_speed = 2.0;
        let mut scene = SceneGraph::new();
        let mut game = Game::new(config, &mut scene).unwrap();

        let mut created = 0;
        for i in 0..300 {
            let input = InputSnapshot {
                forward: true,
                turn_left: i % 50 < 10,
                ..InputSnapshot::default()
            };
            let report = game.frame(&input, DT, &mut scene);
            created += report.stream.created.len();
            let terrain = game.terrain();
            assert!(game.obstacles().obstacles().all(|o| terrain.is_live(o.tile())));
            assert_eq!(game.collision().len(), game.obstacles().len());
        }
        assert_eq!(game.terrain().live_count(), 25);
        assert_eq!(
            scene.count_where(|n| matches!(n, SceneNode::Terrain(_))),
            game.terrain().live_count()
        );
        assert_eq!(
            scene.count_where(|n| matches!(n, SceneNode::Obstacle(_))),
            game.obstacles().len()
        );
        let moved = game.tank().position().length();
        assert!(created > 0 || moved < 20.0, "moved {moved} without streaming");
    }

    #[test]
    fn paused_game_ignores_input() {
        let mut scene = SceneGraph::new();
        let mut game = Game::new(open_field(), &mut scene).unwrap();
        game.set_playing(false);
        let start = game.tank().transform;

        let report = game.frame(&forward(), DT, &mut scene);
        assert_eq!(report.events.last(), Some(&GameEvent::Paused));
        assert_eq!(report.movement, MoveOutcome::Stationary);
        assert_eq!(game.tank().transform, start);
        assert_eq!(game.tick(), 0);

        game.set_playing(true);
        let report = game.frame(&forward(), DT, &mut scene);
        assert_eq!(report.events.first(), Some(&GameEvent::Resumed));
        assert_eq!(game.tick(), 1);
        assert_eq!(report.movement, MoveOutcome::Moved);
    }

    #[test]
    fn camera_tracks_the_tank() {
        let mut scene = SceneGraph::new();
        let mut game = Game::new(open_field(), &mut scene).unwrap();
        let report = game.frame(&forward(), DT, &mut scene);
        assert_eq!(report.camera.target, game.tank().position());
        assert_eq!(report.camera, ChaseCamera::default().follow(&game.tank().transform));
    }

    #[test]
    fn same_inputs_replay_to_the_same_state() {
        let script: Vec<InputSnapshot> = (0..240)
            .map(|i| InputSnapshot {
                forward: i % 3 != 0,
                turn_right: i % 40 < 15,
                charge_held: i % 30 < 12,
                ..InputSnapshot::default()
            })
            .collect();

        let run = || {
            let mut scene = SceneGraph::new();
            let mut game = Game::new(GameConfig::default(), &mut scene).unwrap();
            for input in &script {
                game.frame(input, DT, &mut scene);
            }
            (game.state_hash(), game.score())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn events_are_drained_into_reports() {
        let mut scene = SceneGraph::new();
        let mut game = Game::new(open_field(), &mut scene).unwrap();
        let first = game.frame(&InputSnapshot::idle(), DT, &mut scene);
        // Initial tile creation is reported with the first frame.
        assert_eq!(first.events.len(), 25);
        assert!(game.events().is_empty());
        let second = game.frame(&InputSnapshot::idle(), DT, &mut scene);
        assert!(second.events.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected_before_touching_the_scene() {
        let mut scene = SceneGraph::new();
        let mut config = open_field();
        config.projectiles.max_projectiles = 0;
        let err = Game::new(config, &mut scene).err().unwrap();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "projectiles.max_projectiles",
                ..
            }
        ));

        let mut config = open_field();
        config.terrain.tile_size = 0.0;
        assert!(Game::new(config, &mut scene).is_err());
        assert!(scene.is_empty());
        assert_eq!(scene.adds(), 0);
    }

    #[test]
    fn tap_during_pause_never_fires() {
        let mut scene = SceneGraph::new();
        let mut game = Game::new(open_field(), &mut scene).unwrap();
        let mut input = InputState::new();

        game.set_playing(false);
        input.press(Key::Fire);
        input.release(Key::Fire);
        let report = game.frame(&input.snapshot(), DT, &mut scene);
        assert!(report.fired.is_none());

        game.set_playing(true);
        for _ in 0..3 {
            let report = game.frame(&input.snapshot(), DT, &mut scene);
            assert!(report.fired.is_none());
        }
        assert!(game.projectiles().is_empty());
    }

    #[test]
    fn release_during_pause_drops_the_charge() {
        let mut scene = SceneGraph::new();
        let mut game = Game::new(open_field(), &mut scene).unwrap();
        for _ in 0..20 {
            game.frame(&fire_held(), DT, &mut scene);
        }
        assert!(game.projectiles().charge().is_charging());

        game.set_playing(false);
        game.frame(&fire_held(), DT, &mut scene);
        game.frame(&InputSnapshot::idle(), DT, &mut scene);
        assert!(!game.projectiles().charge().is_charging());

        game.set_playing(true);
        let report = game.frame(&InputSnapshot::idle(), DT, &mut scene);
        assert!(report.fired.is_none());
        assert!(game.projectiles().is_empty());

        // A fresh hold after resuming starts from zero charge.
        game.frame(&fire_held(), DT, &mut scene);
        let report = game.frame(&InputSnapshot::idle(), DT, &mut scene);
        let speed = report.fired.unwrap().speed;
        let base = ProjectileConfig::default().base_speed;
        assert!(speed > base && speed < base + 1.0);
    }
}
