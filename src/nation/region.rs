//! Region - named sub-territory with a polygon on the 0..100 map
//!
//! Shapes drift a little whenever a geometry tick fires. The drift is a pure
//! function of `(nation id, region id, issues resolved, era, option id)` plus
//! the current shape, so replaying a history reproduces the same map.

use geo::{Centroid, ConvexHull, MultiPoint, Point};
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::seed;
use crate::core::types::{Era, GameMode, MapPoint};
use crate::nation::stats::{effect, Effects, StatKey};

pub const MAP_MIN: f64 = 8.0;
pub const MAP_MAX: f64 = 92.0;

const SCALE_MIN: f64 = 0.94;
const SCALE_MAX: f64 = 1.08;
const TARGET_AMPLIFY: f64 = 1.8;
const OFF_TARGET_DAMPEN: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    pub name: String,
    pub terrain: Terrain,
    pub specialization: Specialization,
    pub shape: Vec<MapPoint>,
    pub development: i64,
    pub stability: i64,
    #[serde(default)]
    pub population_share: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Plains,
    Highlands,
    Coastal,
    Riverland,
    Industrial,
    Frontier,
}

impl Terrain {
    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Plains => "plains",
            Terrain::Highlands => "highlands",
            Terrain::Coastal => "coastal",
            Terrain::Riverland => "riverland",
            Terrain::Industrial => "industrial",
            Terrain::Frontier => "frontier",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialization {
    Agrarian,
    Industrial,
    Trade,
    Fortress,
    Scholarly,
}

impl Specialization {
    pub const ALL: [Specialization; 5] = [
        Specialization::Agrarian,
        Specialization::Industrial,
        Specialization::Trade,
        Specialization::Fortress,
        Specialization::Scholarly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Specialization::Agrarian => "agrarian",
            Specialization::Industrial => "industrial",
            Specialization::Trade => "trade",
            Specialization::Fortress => "fortress",
            Specialization::Scholarly => "scholarly",
        }
    }

    /// Option ids of the specialization project are `spec-{name}`
    pub fn option_id(&self) -> String {
        format!("spec-{}", self.name())
    }

    pub fn from_option_id(option_id: &str) -> Option<Specialization> {
        let name = option_id.strip_prefix("spec-")?;
        Specialization::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl Region {
    /// Mean of the shape's vertices
    pub fn centroid(&self) -> MapPoint {
        centroid(&self.shape)
    }

    /// Bring a possibly malformed region back inside its invariants
    pub fn normalize(&mut self, fallback_shape: &[MapPoint]) {
        if self.shape.len() < 3 {
            self.shape = fallback_shape.to_vec();
        }
        for point in &mut self.shape {
            *point = point.clamped(MAP_MIN, MAP_MAX);
        }
        self.development = self.development.clamp(0, 100);
        self.stability = self.stability.clamp(0, 100);
        if !self.population_share.is_finite() || self.population_share < 0.0 {
            self.population_share = 0.0;
        }
    }
}

fn region(
    id: &str,
    name: &str,
    terrain: Terrain,
    specialization: Specialization,
    shape: &[(f64, f64)],
    development: i64,
    stability: i64,
    population_share: f64,
) -> Region {
    Region {
        id: id.into(),
        name: name.into(),
        terrain,
        specialization,
        shape: shape.iter().map(|(x, y)| MapPoint::new(*x, *y)).collect(),
        development,
        stability,
        population_share,
    }
}

/// The four regions every nation starts with
pub fn default_regions() -> Vec<Region> {
    vec![
        region(
            "north",
            "Northreach",
            Terrain::Highlands,
            Specialization::Fortress,
            &[(10.0, 10.0), (48.0, 10.0), (46.0, 46.0), (12.0, 44.0)],
            45,
            60,
            0.2,
        ),
        region(
            "east",
            "Eastmarch",
            Terrain::Industrial,
            Specialization::Industrial,
            &[(52.0, 10.0), (90.0, 12.0), (88.0, 46.0), (54.0, 44.0)],
            55,
            50,
            0.3,
        ),
        region(
            "river",
            "Riverlands",
            Terrain::Riverland,
            Specialization::Agrarian,
            &[(12.0, 50.0), (46.0, 50.0), (48.0, 90.0), (10.0, 88.0)],
            50,
            60,
            0.3,
        ),
        region(
            "coast",
            "Saltcoast",
            Terrain::Coastal,
            Specialization::Trade,
            &[(54.0, 50.0), (88.0, 52.0), (90.0, 90.0), (52.0, 88.0)],
            55,
            55,
            0.2,
        ),
    ]
}

/// Seed defaults when empty, then normalize every region
pub fn normalize_regions(regions: &mut Vec<Region>) {
    let defaults = default_regions();
    if regions.is_empty() {
        *regions = defaults;
        return;
    }
    for (i, region) in regions.iter_mut().enumerate() {
        region.normalize(&defaults[i % defaults.len()].shape);
    }
}

pub fn centroid(points: &[MapPoint]) -> MapPoint {
    let multi: MultiPoint<f64> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
    multi
        .centroid()
        .map(|c| MapPoint::new(c.x(), c.y()))
        .unwrap_or(MapPoint::new(50.0, 50.0))
}

/// Outline of the whole nation: convex hull of every region vertex
pub fn compute_borders(regions: &[Region]) -> Vec<MapPoint> {
    let multi: MultiPoint<f64> = regions
        .iter()
        .flat_map(|r| r.shape.iter())
        .map(|p| Point::new(p.x, p.y))
        .collect();
    if multi.0.len() < 3 {
        return Vec::new();
    }
    let hull = multi.convex_hull();
    let mut points: Vec<MapPoint> = hull
        .exterior()
        .points()
        .map(|p| MapPoint::new(p.x(), p.y()))
        .collect();
    // exterior rings are closed
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Inputs that drive one geometry tick
#[derive(Debug, Clone)]
pub struct ShapeContext<'a> {
    pub nation_id: &'a str,
    pub issues_resolved: u32,
    pub era: Era,
    pub option_id: &'a str,
    pub effects: &'a Effects,
    pub target_region: Option<&'a str>,
}

/// Whether the decision just taken moves region borders
pub fn geometry_tick_due(
    issues_resolved: u32,
    mode: GameMode,
    option_id: &str,
    config: &EngineConfig,
) -> bool {
    let cadence = match mode {
        GameMode::Eras => config.geometry_cadence_eras,
        GameMode::Eternal => config.geometry_cadence_eternal,
    };
    issues_resolved % cadence.max(1) == 0 || option_id.starts_with("spec-")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeBias {
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
}

fn sign(value: i64) -> f64 {
    match value.signum() {
        1 => 1.0,
        -1 => -1.0,
        _ => 0.0,
    }
}

/// Directional and scale pull for a region, from its role and the policy taken
pub fn policy_shape_bias(region: &Region, ctx: &ShapeContext) -> ShapeBias {
    let mut dx = 0.0;
    let mut dy = 0.0;
    let mut scale_offset = 0.0;

    match region.specialization {
        Specialization::Trade => dx += 0.8,
        Specialization::Industrial => dy += 0.8,
        Specialization::Scholarly => dy -= 0.8,
        Specialization::Fortress => scale_offset += 0.02,
        Specialization::Agrarian => {}
    }

    dx += 0.6 * sign(effect(ctx.effects, StatKey::Economy));
    dy += 0.6 * sign(-effect(ctx.effects, StatKey::Environment));
    scale_offset += 0.02
        * sign(effect(ctx.effects, StatKey::Technology) + effect(ctx.effects, StatKey::Education));

    let factor = if ctx.target_region == Some(region.id.as_str()) {
        TARGET_AMPLIFY
    } else {
        OFF_TARGET_DAMPEN
    };

    ShapeBias {
        dx: dx * factor,
        dy: dy * factor,
        scale: (1.0 + scale_offset * factor).clamp(SCALE_MIN, SCALE_MAX),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the next shape of a region for one geometry tick
pub fn evolve_shape(region: &Region, ctx: &ShapeContext) -> Vec<MapPoint> {
    let amplitude = ((ctx.era.index() / 3) as f64 + 1.0).clamp(1.0, 4.0);
    let seed_key = format!(
        "{}:{}:{}:{}:{}",
        ctx.nation_id,
        region.id,
        ctx.issues_resolved,
        ctx.era.name(),
        ctx.option_id
    );

    let jittered: Vec<MapPoint> = region
        .shape
        .iter()
        .enumerate()
        .map(|(i, p)| {
            MapPoint::new(
                p.x + amplitude * seed::unit(&seed_key, &format!("x{}", i)),
                p.y + amplitude * seed::unit(&seed_key, &format!("y{}", i)),
            )
        })
        .collect();

    let bias = policy_shape_bias(region, ctx);
    let center = centroid(&jittered);

    jittered
        .iter()
        .map(|p| {
            let x = center.x + (p.x - center.x) * bias.scale + bias.dx;
            let y = center.y + (p.y - center.y) * bias.scale + bias.dy;
            MapPoint::new(round2(x), round2(y)).clamped(MAP_MIN, MAP_MAX)
        })
        .collect()
}

/// Evolve every region in place
pub fn evolve_regions(regions: &mut [Region], ctx: &ShapeContext) {
    for region in regions.iter_mut() {
        region.shape = evolve_shape(region, ctx);
    }
}

/// Shift region stability/development from a decision's effects
pub fn apply_decision_to_regions(regions: &mut [Region], effects: &Effects, target: Option<&str>) {
    let d = |stat: StatKey| effect(effects, stat) as f64;
    let stability = (0.4 * d(StatKey::Happiness) + 0.2 * d(StatKey::Economy)
        - 0.4 * d(StatKey::Crime))
    .round() as i64;
    let development = (0.4 * d(StatKey::Economy)
        + 0.3 * d(StatKey::Education)
        + 0.3 * d(StatKey::Technology))
    .round() as i64;

    for region in regions.iter_mut() {
        let targeted = target == Some(region.id.as_str());
        let (stability_bonus, development_bonus) = if targeted { (3, 2) } else { (0, 0) };
        region.stability = (region.stability + stability + stability_bonus).clamp(0, 100);
        region.development = (region.development + development + development_bonus).clamp(0, 100);
    }
}
