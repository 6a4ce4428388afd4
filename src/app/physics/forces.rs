use eframe::egui::{Vec2, vec2};

use super::quadtree::Quadtree;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Repulsion strength already scaled by the current alpha.
    pub(super) strength: f32,
    pub(super) theta: f32,
}

/// Deterministic unit vector for coincident points.
fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Inverse-distance push on `point` away from `source`, scaled by `weight`.
/// Squared distances under one are replaced by their root.
fn push_from(point: Vec2, source: Vec2, weight: f32, strength: f32, fallback: Vec2) -> Vec2 {
    let delta = point - source;
    let distance_sq = delta.length_sq();
    if distance_sq <= f32::EPSILON {
        return fallback * (strength * weight);
    }

    let falloff = if distance_sq < 1.0 {
        distance_sq.sqrt()
    } else {
        distance_sq
    };
    delta * (strength * weight / falloff)
}

/// Barnes–Hut repulsion felt by point `index`. Distant cells act as a single
/// body at their centroid.
pub(super) fn repulsion_on(
    tree: &Quadtree,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
) -> Vec2 {
    let point = positions[index];
    let mut total = Vec2::ZERO;
    let mut pending = vec![Quadtree::ROOT];

    while let Some(id) = pending.pop() {
        let cell = tree.cell(id);
        if cell.weight <= 0.0 {
            continue;
        }

        if cell.is_leaf() {
            for &other in cell.members.iter().filter(|&&other| other != index) {
                total += push_from(
                    point,
                    positions[other],
                    1.0,
                    params.strength,
                    jiggle(index, other),
                );
            }
            continue;
        }

        let distance = (point - cell.centroid).length().max(0.01);
        let far_enough = !cell.square.contains(point)
            && cell.square.size / distance < params.theta
            && cell.weight > 1.0;
        if far_enough {
            total += push_from(
                point,
                cell.centroid,
                cell.weight,
                params.strength,
                jiggle(index, id),
            );
        } else {
            pending.extend(cell.child_ids());
        }
    }

    total
}

/// Splits the overlap of one pair between both points, the smaller circle
/// taking the larger share.
fn separate(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    impulses: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    if !min_distance.is_finite() {
        return;
    }

    let delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let (direction, distance) = if distance > 0.0001 {
        (delta / distance, distance)
    } else {
        (jiggle(from, to), 0.0)
    };

    let push = direction * ((min_distance - distance) * strength);
    let from_area = radii[from] * radii[from];
    let to_area = radii[to] * radii[to];
    let share = if from_area + to_area > 0.0 {
        to_area / (from_area + to_area)
    } else {
        0.5
    };

    impulses[from] += push * share;
    impulses[to] -= push * (1.0 - share);
}

/// One collision pass over every overlapping pair. Pairs of cells further
/// apart than their combined reach are skipped without visiting their points.
pub(super) fn resolve_collisions(
    tree: &Quadtree,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    impulses: &mut [Vec2],
) {
    let mut pending = vec![(Quadtree::ROOT, Quadtree::ROOT)];

    while let Some((a_id, b_id)) = pending.pop() {
        let a = tree.cell(a_id);
        let b = tree.cell(b_id);
        let reach = a.reach + b.reach;
        if a.square.gap_sq(b.square) > reach * reach {
            continue;
        }

        if a.is_leaf() && b.is_leaf() {
            if a_id == b_id {
                for (offset, &from) in a.members.iter().enumerate() {
                    for &to in &a.members[offset + 1..] {
                        separate(from, to, positions, radii, strength, impulses);
                    }
                }
            } else {
                for &from in &a.members {
                    for &to in &b.members {
                        separate(from, to, positions, radii, strength, impulses);
                    }
                }
            }
        } else if a_id == b_id {
            let children = a.child_ids().collect::<Vec<_>>();
            for (offset, &first) in children.iter().enumerate() {
                pending.push((first, first));
                pending.extend(children[offset + 1..].iter().map(|&second| (first, second)));
            }
        } else if !a.is_leaf() && (b.is_leaf() || a.square.size >= b.square.size) {
            pending.extend(a.child_ids().map(|child| (child, b_id)));
        } else {
            pending.extend(b.child_ids().map(|child| (a_id, child)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collide(positions: &[Vec2], radii: &[f32]) -> Vec<Vec2> {
        let tree = Quadtree::build(positions, radii).expect("tree");
        let mut impulses = vec![Vec2::ZERO; positions.len()];
        resolve_collisions(&tree, positions, radii, 1.0, &mut impulses);
        impulses
    }

    #[test]
    fn overlapping_pair_is_pushed_apart_evenly() {
        let impulses = collide(&[vec2(0.0, 0.0), vec2(10.0, 0.0)], &[10.0, 10.0]);
        assert!((impulses[0].x + 5.0).abs() < 1e-4);
        assert!((impulses[1].x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn smaller_circle_moves_further() {
        let impulses = collide(&[vec2(0.0, 0.0), vec2(20.0, 0.0)], &[20.0, 10.0]);
        assert!(impulses[1].x > impulses[0].x.abs());
        assert!((impulses[1].x - impulses[0].x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn distant_pair_is_untouched() {
        let impulses = collide(&[vec2(0.0, 0.0), vec2(100.0, 0.0)], &[10.0, 10.0]);
        assert_eq!(impulses, vec![Vec2::ZERO; 2]);
    }

    #[test]
    fn collisions_are_found_across_cells() {
        let positions = (0..40)
            .map(|index| vec2(index as f32 * 15.0, 0.0))
            .collect::<Vec<_>>();
        let radii = vec![10.0; positions.len()];
        let impulses = collide(&positions, &radii);

        assert!(impulses[0].x < 0.0);
        assert!(impulses[39].x > 0.0);
        for impulse in &impulses[1..39] {
            assert!(impulse.x.abs() < 1e-3);
        }
    }

    #[test]
    fn charge_pushes_nodes_away_from_each_other() {
        let positions = vec![vec2(0.0, 0.0), vec2(20.0, 0.0)];
        let tree = Quadtree::build(&positions, &[1.0, 1.0]).expect("tree");
        let params = ChargeParams {
            strength: 10.0,
            theta: 0.72,
        };

        let left = repulsion_on(&tree, 0, &positions, params);
        let right = repulsion_on(&tree, 1, &positions, params);

        assert!(left.x < 0.0);
        assert!(right.x > 0.0);
        assert!((left.x + right.x).abs() < 1e-5);
    }
}
