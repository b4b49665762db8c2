use std::cmp::Ordering;

use crowd_wave_core::{RandomSource, SectionId, WaveDirection};
use serde::{Deserialize, Serialize};

/// How a wave path treats the ends of the bowl.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathTopology {
    /// The wave stops at the last section in its direction.
    Linear,
    /// The wave wraps around and visits every section once.
    #[default]
    Wrap,
}

impl PathTopology {
    /// Lowercase name used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Wrap => "wrap",
        }
    }
}

/// Ordered sections a wave starting at `origin` visits, origin first.
///
/// Returns an empty path when `origin` is not in `sections`. A section never
/// appears twice.
#[must_use]
pub fn compute_path(
    sections: &[SectionId],
    origin: SectionId,
    direction: WaveDirection,
    topology: PathTopology,
) -> Vec<SectionId> {
    let Some(start) = sections.iter().position(|section| *section == origin) else {
        return Vec::new();
    };
    match (topology, direction) {
        (PathTopology::Linear, WaveDirection::Forward) => sections[start..].to_vec(),
        (PathTopology::Linear, WaveDirection::Backward) => {
            sections[..=start].iter().rev().copied().collect()
        }
        (PathTopology::Wrap, _) => {
            let count = sections.len();
            (0..count)
                .map(|step| match direction {
                    WaveDirection::Forward => sections[(start + step) % count],
                    WaveDirection::Backward => sections[(start + count - step) % count],
                })
                .collect()
        }
    }
}

/// Direction of a wave starting at layout index `index` of `count` sections.
///
/// Edge origins travel away from their edge without consuming a draw.
pub(crate) fn choose_direction(
    index: usize,
    count: usize,
    rng: &mut dyn RandomSource,
) -> WaveDirection {
    if count <= 1 || index == 0 {
        return WaveDirection::Forward;
    }
    if index + 1 == count {
        return WaveDirection::Backward;
    }
    if rng.next_unit() < 0.5 {
        WaveDirection::Forward
    } else {
        WaveDirection::Backward
    }
}

/// Ordering weight of layout index `index`; edges reach `1 + edge_bonus`.
pub(crate) fn edge_weight(index: usize, count: usize, edge_bonus: f32) -> f32 {
    if count <= 1 {
        return 1.0;
    }
    let normalized = 2.0 * index as f32 / (count - 1) as f32 - 1.0;
    1.0 + edge_bonus * normalized.abs()
}

/// Weighted random ordering of `(layout index, value)` candidates.
///
/// Each candidate draws one key `u^(1/w)`; higher keys come first. A single
/// candidate consumes no draw.
pub(crate) fn weighted_order<T>(
    candidates: Vec<(usize, T)>,
    count: usize,
    edge_bonus: f32,
    rng: &mut dyn RandomSource,
) -> Vec<T> {
    if candidates.len() <= 1 {
        return candidates.into_iter().map(|(_, value)| value).collect();
    }
    let mut keyed: Vec<(f32, usize, T)> = candidates
        .into_iter()
        .map(|(index, value)| {
            let weight = edge_weight(index, count, edge_bonus).max(f32::EPSILON);
            let key = rng.next_unit().clamp(0.0, 1.0).powf(1.0 / weight);
            (key, index, value)
        })
        .collect();
    keyed.sort_by(|a, b| match b.0.total_cmp(&a.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });
    keyed.into_iter().map(|(_, _, value)| value).collect()
}

#[cfg(test)]
mod tests {
    use crowd_wave_core::ScriptedDraws;

    use super::*;

    fn ids(raw: &[u32]) -> Vec<SectionId> {
        raw.iter().copied().map(SectionId::new).collect()
    }

    #[test]
    fn edges_outweigh_the_centre() {
        assert_eq!(edge_weight(0, 5, 1.0), 2.0);
        assert_eq!(edge_weight(4, 5, 1.0), 2.0);
        assert_eq!(edge_weight(2, 5, 1.0), 1.0);
        assert_eq!(edge_weight(0, 1, 1.0), 1.0);
    }

    #[test]
    fn edge_origins_move_inward_without_drawing() {
        let mut draws = ScriptedDraws::new(vec![0.9]);
        assert_eq!(choose_direction(0, 4, &mut draws), WaveDirection::Forward);
        assert_eq!(choose_direction(3, 4, &mut draws), WaveDirection::Backward);
        assert_eq!(draws.consumed(), 0);
        assert_eq!(choose_direction(1, 4, &mut draws), WaveDirection::Backward);
        assert_eq!(draws.consumed(), 1);
    }

    #[test]
    fn ordering_prefers_higher_keys() {
        let mut draws = ScriptedDraws::new(vec![0.1, 0.9, 0.5]);
        let order = weighted_order(vec![(0, 'a'), (1, 'b'), (2, 'c')], 3, 0.0, &mut draws);
        assert_eq!(order, vec!['b', 'c', 'a']);
    }

    #[test]
    fn single_candidate_consumes_no_draw() {
        let mut draws = ScriptedDraws::new(vec![0.3]);
        let order = weighted_order(vec![(4, 'x')], 9, 1.0, &mut draws);
        assert_eq!(order, vec!['x']);
        assert_eq!(draws.consumed(), 0);
    }

    #[test]
    fn wrap_visits_every_section_once() {
        let all = ids(&[0, 1, 2, 3]);
        assert_eq!(
            compute_path(&all, SectionId::new(2), WaveDirection::Forward, PathTopology::Wrap),
            ids(&[2, 3, 0, 1])
        );
        assert_eq!(
            compute_path(&all, SectionId::new(1), WaveDirection::Backward, PathTopology::Wrap),
            ids(&[1, 0, 3, 2])
        );
    }

    #[test]
    fn unknown_origin_yields_empty_path() {
        let all = ids(&[0, 1]);
        assert!(compute_path(&all, SectionId::new(5), WaveDirection::Forward, PathTopology::Linear)
            .is_empty());
    }
}
