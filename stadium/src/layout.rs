use crowd_wave_core::{
    venue::SpatialMapping, ColumnBoundary, SectionBounds, SectionId, WaveDirection,
};
use serde::Deserialize;

/// Geometry parameters for a left-to-right bowl of sections.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// World width of one seat column.
    pub column_pitch: f32,
    /// World height of one seat row.
    pub row_pitch: f32,
    /// Empty aisle between neighbouring sections.
    pub section_gap: f32,
    /// World x of the left edge of the first section.
    pub origin_x: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_pitch: 1.0,
            row_pitch: 1.0,
            section_gap: 0.5,
            origin_x: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SectionGeometry {
    id: SectionId,
    left: f32,
    columns: u32,
    rows: u32,
}

/// Grid placement of every section, resolved once at build time.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    config: LayoutConfig,
    sections: Vec<SectionGeometry>,
    loop_span: f32,
}

impl GridLayout {
    pub(crate) fn new(config: LayoutConfig, sections: &[(SectionId, u32, u32)]) -> Self {
        let mut placed = Vec::with_capacity(sections.len());
        let mut cursor = config.origin_x;
        for &(id, rows, columns) in sections {
            placed.push(SectionGeometry {
                id,
                left: cursor,
                columns,
                rows,
            });
            cursor += columns as f32 * config.column_pitch + config.section_gap;
        }
        Self {
            config,
            sections: placed,
            loop_span: cursor - config.origin_x,
        }
    }

    /// Parameters the layout was built with.
    #[must_use]
    pub fn config(&self) -> LayoutConfig {
        self.config
    }

    /// Width of one full lap including the trailing aisle.
    #[must_use]
    pub fn loop_span(&self) -> f32 {
        self.loop_span
    }

    /// Column pitch of a section, if it exists.
    #[must_use]
    pub fn column_pitch_of(&self, section: SectionId) -> Option<f32> {
        self.geometry(section).map(|_| self.config.column_pitch)
    }

    fn geometry(&self, section: SectionId) -> Option<&SectionGeometry> {
        self.sections.iter().find(|geometry| geometry.id == section)
    }
}

impl SpatialMapping for GridLayout {
    fn column_sequence_for_path(
        &self,
        path: &[SectionId],
        direction: WaveDirection,
    ) -> Vec<ColumnBoundary> {
        let pitch = self.config.column_pitch;
        let mut sequence = Vec::new();
        let mut offset = 0.0;
        let mut previous_left: Option<f32> = None;

        for &section in path {
            let Some(geometry) = self.geometry(section) else {
                continue;
            };
            if let Some(previous) = previous_left {
                // Wrapping past either end keeps coordinates monotonic.
                match direction {
                    WaveDirection::Forward if geometry.left < previous => offset += self.loop_span,
                    WaveDirection::Backward if geometry.left > previous => {
                        offset -= self.loop_span
                    }
                    _ => {}
                }
            }
            previous_left = Some(geometry.left);

            let left = geometry.left + offset;
            let boundary = |column: u32| ColumnBoundary {
                section,
                column_index: column,
                world_x: left + (column as f32 + 0.5) * pitch,
            };
            match direction {
                WaveDirection::Forward => sequence.extend((0..geometry.columns).map(boundary)),
                WaveDirection::Backward => {
                    sequence.extend((0..geometry.columns).rev().map(boundary))
                }
            }
        }
        sequence
    }

    fn bounds_of(&self, section: SectionId) -> Option<SectionBounds> {
        self.geometry(section).map(|geometry| SectionBounds {
            left: geometry.left,
            right: geometry.left + geometry.columns as f32 * self.config.column_pitch,
            top: 0.0,
            bottom: geometry.rows as f32 * self.config.row_pitch,
        })
    }
}
