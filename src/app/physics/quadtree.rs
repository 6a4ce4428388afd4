use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: u8 = 12;

/// Axis-aligned square given by its top-left corner and side length.
#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) min: Vec2,
    pub(super) size: f32,
}

impl Square {
    /// Smallest padded square around `points`. `None` when there are no points
    /// or any coordinate is not finite.
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let (lo, hi) = points.iter().try_fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), point| {
                (point.x.is_finite() && point.y.is_finite())
                    .then(|| (lo.min(*point), hi.max(*point)))
            },
        )?;

        Some(Self {
            min: lo - Vec2::splat(1.0),
            size: (hi - lo).max_elem().max(1.0) + 2.0,
        })
    }

    fn mid(self) -> Vec2 {
        self.min + Vec2::splat(self.size * 0.5)
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let max = self.min + Vec2::splat(self.size);
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }

    /// Quadrant index: bit 0 set for the right half, bit 1 for the bottom half.
    fn quadrant_of(self, point: Vec2) -> usize {
        let mid = self.mid();
        usize::from(point.x >= mid.x) | (usize::from(point.y >= mid.y) << 1)
    }

    fn quadrant(self, index: usize) -> Self {
        let half = self.size * 0.5;
        let offset = vec2(
            if index & 1 == 0 { 0.0 } else { half },
            if index & 2 == 0 { 0.0 } else { half },
        );
        Self {
            min: self.min + offset,
            size: half,
        }
    }

    /// Squared gap between two squares, zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let gap = |a_min: f32, b_min: f32| {
            (b_min - (a_min + self.size))
                .max(a_min - (b_min + other.size))
                .max(0.0)
        };
        let dx = gap(self.min.x, other.min.x);
        let dy = gap(self.min.y, other.min.y);
        dx * dx + dy * dy
    }
}

pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) centroid: Vec2,
    /// Number of points below this cell.
    pub(super) weight: f32,
    /// Largest collision radius below this cell.
    pub(super) reach: f32,
    /// Point indices, only filled on leaves.
    pub(super) members: Vec<usize>,
    children: [Option<usize>; 4],
}

impl Cell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn child_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.children.iter().flatten().copied()
    }
}

/// Region quadtree over bubble centers stored as a flat arena. The root is
/// always cell 0.
pub(super) struct Quadtree {
    cells: Vec<Cell>,
}

impl Quadtree {
    pub(super) const ROOT: usize = 0;

    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        let mut tree = Self {
            cells: Vec::with_capacity(positions.len() / LEAF_CAPACITY * 2 + 1),
        };
        tree.insert_cell(square, (0..positions.len()).collect(), positions, radii, 0);
        Some(tree)
    }

    pub(super) fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    fn insert_cell(
        &mut self,
        square: Square,
        members: Vec<usize>,
        positions: &[Vec2],
        radii: &[f32],
        depth: u8,
    ) -> usize {
        let weight = members.len() as f32;
        let centroid = if members.is_empty() {
            square.mid()
        } else {
            members
                .iter()
                .fold(Vec2::ZERO, |sum, &index| sum + positions[index])
                / weight
        };
        let reach = members
            .iter()
            .map(|&index| radii.get(index).copied().unwrap_or(0.0))
            .fold(0.0_f32, f32::max);

        let id = self.cells.len();
        self.cells.push(Cell {
            square,
            centroid,
            weight,
            reach,
            members: Vec::new(),
            children: [None; 4],
        });

        if depth >= MAX_DEPTH || members.len() <= LEAF_CAPACITY {
            self.cells[id].members = members;
            return id;
        }

        let mut quadrants: [Vec<usize>; 4] = Default::default();
        for &index in &members {
            quadrants[square.quadrant_of(positions[index])].push(index);
        }
        if quadrants.iter().filter(|quadrant| !quadrant.is_empty()).count() < 2 {
            self.cells[id].members = members;
            return id;
        }

        for (index, quadrant) in quadrants.into_iter().enumerate() {
            if quadrant.is_empty() {
                continue;
            }
            let child = self.insert_cell(square.quadrant(index), quadrant, positions, radii, depth + 1);
            self.cells[id].children[index] = Some(child);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_members(tree: &Quadtree) -> Vec<usize> {
        let mut found = Vec::new();
        let mut pending = vec![Quadtree::ROOT];
        while let Some(id) = pending.pop() {
            let cell = tree.cell(id);
            found.extend_from_slice(&cell.members);
            pending.extend(cell.child_ids());
        }
        found.sort_unstable();
        found
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let positions = (0..100)
            .map(|index| vec2((index % 10) as f32 * 13.0, (index / 10) as f32 * 7.0))
            .collect::<Vec<_>>();
        let radii = vec![4.0; positions.len()];

        let tree = Quadtree::build(&positions, &radii).expect("finite points");
        let root = tree.cell(Quadtree::ROOT);
        assert!(!root.is_leaf());
        assert_eq!(root.weight, 100.0);
        assert_eq!(root.reach, 4.0);
        assert_eq!(leaf_members(&tree), (0..100).collect::<Vec<_>>());
        for point in &positions {
            assert!(root.square.contains(*point));
        }
    }

    #[test]
    fn non_finite_points_have_no_tree() {
        let positions = vec![vec2(0.0, 0.0), vec2(f32::NAN, 1.0)];
        assert!(Quadtree::build(&positions, &[1.0, 1.0]).is_none());
        assert!(Quadtree::build(&[], &[]).is_none());
    }

    #[test]
    fn square_gap_is_zero_when_touching() {
        let left = Square {
            min: vec2(0.0, 0.0),
            size: 10.0,
        };
        let right = Square {
            min: vec2(10.0, 0.0),
            size: 10.0,
        };
        let far = Square {
            min: vec2(13.0, 14.0),
            size: 2.0,
        };
        assert_eq!(left.gap_sq(right), 0.0);
        assert_eq!(left.gap_sq(far), 25.0);
        assert_eq!(far.gap_sq(left), 25.0);
    }
}
