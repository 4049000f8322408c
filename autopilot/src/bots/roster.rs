use super::*;
use fuelrun_core::tape::crc32;

#[derive(Clone, Copy, Serialize)]
struct FixedConfig {
    id: &'static str,
    description: &'static str,
    accelerate: bool,
}

/// Steers toward a look-ahead point on the centerline.
#[derive(Clone, Copy, Serialize)]
struct CenterlineConfig {
    id: &'static str,
    description: &'static str,
    lookahead: f32,
    /// Heading error (radians) tolerated before steering.
    steer_deadband: f32,
    /// Throttle is released above this speed.
    speed_cap: Option<f32>,
    /// Road bend (radians) between the car and the look-ahead point that
    /// counts as a sharp turn.
    sharp_turn: f32,
    /// Target speed through a sharp turn; `None` never brakes.
    corner_speed: Option<f32>,
}

struct FixedBot {
    cfg: FixedConfig,
}

struct CenterlineBot {
    cfg: CenterlineConfig,
}

fn fixed_bot_configs() -> &'static [FixedConfig] {
    &[
        FixedConfig {
            id: "idle",
            description: "Never touches the controls. Baseline for fuel and pickups.",
            accelerate: false,
        },
        FixedConfig {
            id: "cruise",
            description: "Full throttle, no steering.",
            accelerate: true,
        },
    ]
}

fn centerline_bot_configs() -> &'static [CenterlineConfig] {
    &[
        CenterlineConfig {
            id: "centerline",
            description: "Chases a look-ahead point on the road centerline at full throttle.",
            lookahead: 12.0,
            steer_deadband: 0.02,
            speed_cap: None,
            sharp_turn: core::f32::consts::PI,
            corner_speed: None,
        },
        CenterlineConfig {
            id: "cautious",
            description: "Centerline follower with a speed cap that brakes into sharp bends.",
            lookahead: 16.0,
            steer_deadband: 0.02,
            speed_cap: Some(28.0),
            sharp_turn: 0.3,
            corner_speed: Some(18.0),
        },
    ]
}

impl AutopilotBot for FixedBot {
    fn id(&self) -> &'static str {
        self.cfg.id
    }

    fn description(&self) -> &'static str {
        self.cfg.description
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, _session: &Session) -> FrameInput {
        FrameInput {
            accelerate: self.cfg.accelerate,
            ..no_input()
        }
    }
}

impl CenterlineBot {
    fn steer(&self, session: &Session) -> (bool, bool) {
        let vehicle = session.vehicle();
        let p = vehicle.position().truncate();
        let (target, _) = centerline_at(
            session.track_pair(),
            vehicle.distance() + self.cfg.lookahead,
        );
        let Some(wanted) = (target - p).try_normalize() else {
            return (false, false);
        };

        let error = signed_angle(vehicle.forward(), wanted);
        (
            error > self.cfg.steer_deadband,
            error < -self.cfg.steer_deadband,
        )
    }

    fn in_sharp_turn(&self, session: &Session) -> bool {
        let vehicle = session.vehicle();
        let (_, ahead) = centerline_at(
            session.track_pair(),
            vehicle.distance() + self.cfg.lookahead,
        );
        signed_angle(road_dir_under(session), ahead).abs() > self.cfg.sharp_turn
    }
}

impl AutopilotBot for CenterlineBot {
    fn id(&self) -> &'static str {
        self.cfg.id
    }

    fn description(&self) -> &'static str {
        self.cfg.description
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, session: &Session) -> FrameInput {
        let vehicle = session.vehicle();
        if !vehicle.is_alive() {
            return no_input();
        }

        let (left, right) = self.steer(session);
        let speed = vehicle.speed();
        let braking = match self.cfg.corner_speed {
            Some(corner) => speed > corner && self.in_sharp_turn(session),
            None => false,
        };
        let capped = self.cfg.speed_cap.is_some_and(|cap| speed >= cap);

        FrameInput {
            left,
            right,
            accelerate: !braking && !capped,
            decelerate: braking,
        }
    }
}

pub fn bot_ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = fixed_bot_configs().iter().map(|cfg| cfg.id).collect();
    ids.extend(centerline_bot_configs().iter().map(|cfg| cfg.id));
    ids
}

pub fn describe_bots() -> Vec<(&'static str, &'static str)> {
    let mut out: Vec<(&'static str, &'static str)> = fixed_bot_configs()
        .iter()
        .map(|cfg| (cfg.id, cfg.description))
        .collect();
    out.extend(
        centerline_bot_configs()
            .iter()
            .map(|cfg| (cfg.id, cfg.description)),
    );
    out
}

pub fn create_bot(id: &str) -> Option<Box<dyn AutopilotBot + Send>> {
    if let Some(cfg) = fixed_bot_configs().iter().find(|cfg| cfg.id == id) {
        return Some(Box::new(FixedBot { cfg: *cfg }));
    }
    if let Some(cfg) = centerline_bot_configs().iter().find(|cfg| cfg.id == id) {
        return Some(Box::new(CenterlineBot { cfg: *cfg }));
    }
    None
}

fn hash_json(value: &serde_json::Value) -> String {
    let encoded = serde_json::to_vec(value).unwrap_or_default();
    let digest = crc32(&encoded);
    format!("crc32:{digest:08x}:len:{}", encoded.len())
}

fn manifest_entry<T: Serialize>(
    id: &str,
    family: &str,
    description: &str,
    cfg: &T,
) -> BotManifestEntry {
    let config = serde_json::to_value(cfg).unwrap_or(serde_json::Value::Null);
    BotManifestEntry {
        id: id.to_string(),
        family: family.to_string(),
        description: description.to_string(),
        config_hash: hash_json(&config),
        config,
    }
}

pub fn bot_manifest_entries() -> Vec<BotManifestEntry> {
    let mut out = Vec::new();
    for cfg in fixed_bot_configs() {
        out.push(manifest_entry(cfg.id, "fixed", cfg.description, cfg));
    }
    for cfg in centerline_bot_configs() {
        out.push(manifest_entry(cfg.id, "centerline", cfg.description, cfg));
    }
    out
}

pub fn bot_fingerprint(id: &str) -> Option<String> {
    bot_manifest_entries()
        .into_iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.config_hash)
}
