use std::f64::consts::TAU;

/// Radial position of the image inset, as a fraction of the wheel radius
pub const INSET_OFFSET_RATIO: f64 = 0.65;
/// Radius of the image inset, as a fraction of the wheel radius
pub const INSET_RADIUS_RATIO: f64 = 0.14;
/// Extra ring of backdrop around the inset, as a fraction of the wheel radius
pub const INSET_RING_RATIO: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Club palette, assigned to sectors in order and wrapping around
pub const PALETTE: [Rgb; 15] = [
    Rgb(0xE3, 0x06, 0x13),
    Rgb(0xFF, 0xFF, 0xFF),
    Rgb(0x8A, 0x00, 0x00),
    Rgb(0xBD, 0xC3, 0xC7),
    Rgb(0xC0, 0x39, 0x2B),
    Rgb(0xEC, 0xF0, 0xF1),
    Rgb(0x7B, 0x24, 0x1C),
    Rgb(0x95, 0xA5, 0xA6),
    Rgb(0xFF, 0x4D, 0x4D),
    Rgb(0xF4, 0xF6, 0xF7),
    Rgb(0x64, 0x1E, 0x16),
    Rgb(0xD0, 0xD3, 0xD4),
    Rgb(0xE7, 0x4C, 0x3C),
    Rgb(0x2C, 0x3E, 0x50),
    Rgb(0xFD, 0xED, 0xEC),
];

/// Disc drawn behind every image so it stands out on any palette colour
pub const INSET_BACKDROP: Rgb = Rgb(0xFF, 0xFF, 0xFF);

/// An image that was successfully resolved at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub reference: String,
    pub byte_len: usize,
}

/// A wheel entry whose image resolved; only these take part in slicing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub image: ImageHandle,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub index: usize,
    pub label: String,
    pub image: ImageHandle,
    pub color_key: usize,
    /// radians, clockwise from 3 o'clock
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Sector {
    pub fn color(&self) -> Rgb {
        PALETTE[self.color_key]
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

/// Image inset placement for one wedge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInset {
    pub angle: f64,
    pub radial_offset: f64,
    pub radius: f64,
    pub backdrop_radius: f64,
    pub backdrop: Rgb,
}

/// "Draw this wedge" instruction handed to the render adapter
#[derive(Debug, Clone, PartialEq)]
pub struct WedgeInstruction {
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub color: Rgb,
    pub inset: ImageInset,
}

/// Immutable angular partition of the wheel. Empty means the wheel is inert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorModel {
    sectors: Vec<Sector>,
}

impl SectorModel {
    pub fn build(entries: Vec<ResolvedEntry>) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let arc_size = TAU / entries.len() as f64;
        let sectors = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| Sector {
                index: i,
                label: entry.label,
                image: entry.image,
                color_key: i % PALETTE.len(),
                start_angle: i as f64 * arc_size,
                end_angle: (i + 1) as f64 * arc_size,
            })
            .collect();

        Self { sectors }
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sector> {
        self.sectors.iter()
    }

    /// Angular width of each sector in degrees
    pub fn degrees_per_sector(&self) -> Option<f64> {
        if self.sectors.is_empty() {
            None
        } else {
            Some(360.0 / self.sectors.len() as f64)
        }
    }

    pub fn draw_plan(&self, radius: f64) -> Vec<WedgeInstruction> {
        self.sectors
            .iter()
            .map(|sector| WedgeInstruction {
                index: sector.index,
                start_angle: sector.start_angle,
                end_angle: sector.end_angle,
                color: sector.color(),
                inset: ImageInset {
                    angle: sector.mid_angle(),
                    radial_offset: INSET_OFFSET_RATIO * radius,
                    radius: INSET_RADIUS_RATIO * radius,
                    backdrop_radius: (INSET_RADIUS_RATIO + INSET_RING_RATIO) * radius,
                    backdrop: INSET_BACKDROP,
                },
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a SectorModel {
    type Item = &'a Sector;
    type IntoIter = std::slice::Iter<'a, Sector>;

    fn into_iter(self) -> Self::IntoIter {
        self.sectors.iter()
    }
}

#[cfg(test)]
pub(crate) fn resolved(labels: &[&str]) -> Vec<ResolvedEntry> {
    labels
        .iter()
        .map(|label| ResolvedEntry {
            image: ImageHandle {
                reference: format!("wheel_images/{label}.png"),
                byte_len: 128,
            },
            label: label.to_string(),
        })
        .collect()
}
