mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use forces::{ChargeParams, repulsion_on, resolve_collisions};
use quadtree::Quadtree;

const BARNES_HUT_THETA: f32 = 0.72;
const ALPHA_MIN: f32 = 0.001;
/// Cools alpha from 1 to `ALPHA_MIN` in 300 ticks.
const ALPHA_DECAY: f32 = 0.022_762_78;
const VELOCITY_DECAY: f32 = 0.4;
const CENTER_STRENGTH: f32 = 0.05;
const CHARGE_STRENGTH_MIN: f32 = 10.0;
const CHARGE_STRENGTH_MAX: f32 = 15.0;
const COLLISION_STRENGTH: f32 = 1.0;
const COLLISION_ITERATIONS: usize = 2;
const COLLISION_PAD_MIN: f32 = 1.0;
const COLLISION_PAD_SPREAD: f32 = 2.0;
const ENTRY_SPREAD: f32 = 1.5;

pub(in crate::app) const RESTART_ALPHA: f32 = 0.5;

/// What the layout needs to know about a visible record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct NodeInit {
    pub(in crate::app) rank: u32,
    pub(in crate::app) radius: f32,
}

#[derive(Clone, Debug)]
pub(in crate::app) struct SimNode {
    pub(in crate::app) rank: u32,
    pub(in crate::app) position: Vec2,
    pub(in crate::app) velocity: Vec2,
    pub(in crate::app) radius: f32,
    collision_radius: f32,
}

#[derive(Default)]
struct PhysicsScratch {
    impulses: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
}

/// Cooling force simulation laying bubbles out inside a viewport. Positions
/// are in viewport-local pixels with the origin at the top-left corner.
pub(in crate::app) struct Simulation {
    nodes: Vec<SimNode>,
    viewport: Vec2,
    center: Vec2,
    alpha: f32,
    charge_strength: f32,
    rng: SmallRng,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub(in crate::app) fn new(viewport: Vec2, inits: &[NodeInit], seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let charge_strength = rng.gen_range(CHARGE_STRENGTH_MIN..CHARGE_STRENGTH_MAX);
        debug!(charge_strength, nodes = inits.len(), "layout simulation created");

        let mut simulation = Self {
            nodes: Vec::with_capacity(inits.len()),
            viewport,
            center: viewport * 0.5,
            alpha: 1.0,
            charge_strength,
            rng,
            scratch: PhysicsScratch::default(),
        };
        for init in inits {
            let node = simulation.spawn_node(*init);
            simulation.nodes.push(node);
        }
        simulation
    }

    fn spawn_node(&mut self, init: NodeInit) -> SimNode {
        let x = self.rng.gen_range(0.0_f32..1.0) * self.viewport.x * ENTRY_SPREAD;
        let y = self.rng.gen_range(0.0_f32..1.0) * self.viewport.y * ENTRY_SPREAD;
        let pad = COLLISION_PAD_MIN + self.rng.gen_range(0.0_f32..1.0) * COLLISION_PAD_SPREAD;

        SimNode {
            rank: init.rank,
            position: vec2(x, y),
            velocity: Vec2::ZERO,
            radius: init.radius,
            collision_radius: init.radius + pad,
        }
    }

    pub(in crate::app) fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    #[cfg(test)]
    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    #[cfg(test)]
    pub(in crate::app) fn center(&self) -> Vec2 {
        self.center
    }

    pub(in crate::app) fn is_running(&self) -> bool {
        self.alpha >= ALPHA_MIN
    }

    pub(in crate::app) fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha);
    }

    /// Moves the attraction point to the new viewport center and restarts at
    /// partial energy so bubbles redistribute without replaying the entrance.
    pub(in crate::app) fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.center = viewport * 0.5;
        self.alpha = RESTART_ALPHA;
    }

    /// Replaces the node set: surviving ranks keep their position and
    /// velocity, new ranks enter at random positions. Returns whether the set
    /// changed; a change restarts the simulation.
    pub(in crate::app) fn sync_nodes(&mut self, inits: &[NodeInit]) -> bool {
        let mut prior = self
            .nodes
            .drain(..)
            .map(|node| (node.rank, node))
            .collect::<HashMap<_, _>>();
        let prior_count = prior.len();

        let mut kept = 0usize;
        let mut next = Vec::with_capacity(inits.len());
        for init in inits {
            if let Some(mut node) = prior.remove(&init.rank) {
                let pad = node.collision_radius - node.radius;
                node.radius = init.radius;
                node.collision_radius = init.radius + pad;
                next.push(node);
                kept += 1;
            } else {
                next.push(self.spawn_node(*init));
            }
        }
        self.nodes = next;

        let changed = kept != prior_count || kept != inits.len();
        if changed {
            self.reheat(RESTART_ALPHA);
        }
        changed
    }

    /// Advances one step. Returns whether the simulation is still running.
    pub(in crate::app) fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        self.alpha += (0.0 - self.alpha) * ALPHA_DECAY;
        let node_count = self.nodes.len();
        if node_count == 0 {
            return self.is_running();
        }

        let alpha = self.alpha;
        let center = self.center;
        let scratch = &mut self.scratch;
        scratch.impulses.clear();
        scratch.impulses.resize(node_count, Vec2::ZERO);
        scratch.positions.clear();
        scratch.positions.extend(self.nodes.iter().map(|node| node.position));
        scratch.radii.clear();
        scratch
            .radii
            .extend(self.nodes.iter().map(|node| node.collision_radius));

        for (impulse, node) in scratch.impulses.iter_mut().zip(&self.nodes) {
            *impulse += (center - node.position) * (CENTER_STRENGTH * alpha);
        }

        if node_count > 1
            && let Some(tree) = Quadtree::build(&scratch.positions, &scratch.radii)
        {
            let params = ChargeParams {
                strength: self.charge_strength * alpha,
                theta: BARNES_HUT_THETA,
            };
            for (index, impulse) in scratch.impulses.iter_mut().enumerate() {
                *impulse += repulsion_on(&tree, index, &scratch.positions, params);
            }
        }

        for (node, impulse) in self.nodes.iter_mut().zip(&scratch.impulses) {
            node.velocity += *impulse;
        }

        if node_count > 1 {
            for _ in 0..COLLISION_ITERATIONS {
                scratch.positions.clear();
                scratch
                    .positions
                    .extend(self.nodes.iter().map(|node| node.position + node.velocity));
                scratch.impulses.fill(Vec2::ZERO);

                let Some(tree) = Quadtree::build(&scratch.positions, &scratch.radii) else {
                    break;
                };
                resolve_collisions(
                    &tree,
                    &scratch.positions,
                    &scratch.radii,
                    COLLISION_STRENGTH,
                    &mut scratch.impulses,
                );

                for (node, impulse) in self.nodes.iter_mut().zip(&scratch.impulses) {
                    node.velocity += *impulse;
                }
            }
        }

        for node in &mut self.nodes {
            node.velocity *= 1.0 - VELOCITY_DECAY;
            node.position += node.velocity;
        }

        self.is_running()
    }

    #[cfg(test)]
    pub(in crate::app) fn position(&self, rank: u32) -> Option<Vec2> {
        self.nodes
            .iter()
            .find(|node| node.rank == rank)
            .map(|node| node.position)
    }
}
