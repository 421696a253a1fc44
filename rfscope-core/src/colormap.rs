//! 256-entry colormap lookup tables for the waterfall and the spectrum
//! gradient fill.
//!
//! Each table is built once from a short list of control points by linear
//! interpolation in RGB. Index 0 is the coldest colour (at or below
//! `min_db`), index 255 the hottest.

/// A 256 → RGB lookup table.
pub struct Colormap {
    pub name: &'static str,
    lut: Vec<[u8; 3]>,
}

impl Colormap {
    #[inline]
    pub fn apply(&self, index: u8) -> [u8; 3] {
        self.lut[index as usize]
    }

    pub fn len(&self) -> usize {
        self.lut.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lut.is_empty()
    }

    /// Gradient stops for a vertical fill under the spectrum trace, top to
    /// bottom: offset `i / 256` takes colour `255 - i`, so the hottest colour
    /// sits at the top of the pane.
    pub fn gradient_stops(&self) -> Vec<(f64, [u8; 3])> {
        let n = self.lut.len();
        (0..n)
            .map(|i| (i as f64 / n as f64, self.lut[n - 1 - i]))
            .collect()
    }
}

fn build(name: &'static str, stops: &[(f32, [u8; 3])]) -> Colormap {
    let mut lut = Vec::with_capacity(256);
    for i in 0..256 {
        let t = i as f32 / 255.0;
        let hi = stops
            .iter()
            .position(|&(p, _)| p >= t)
            .unwrap_or(stops.len() - 1);
        let rgb = if hi == 0 {
            stops[0].1
        } else {
            let (p0, c0) = stops[hi - 1];
            let (p1, c1) = stops[hi];
            let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 1.0 };
            let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f).round() as u8;
            [lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])]
        };
        lut.push(rgb);
    }
    Colormap { name, lut }
}

const TURBO: &[(f32, [u8; 3])] = &[
    (0.00, [48, 18, 59]),
    (0.13, [70, 107, 227]),
    (0.25, [40, 187, 236]),
    (0.38, [49, 242, 153]),
    (0.50, [162, 252, 60]),
    (0.63, [237, 208, 58]),
    (0.75, [251, 128, 34]),
    (0.88, [213, 54, 7]),
    (1.00, [122, 4, 3]),
];

const VIRIDIS: &[(f32, [u8; 3])] = &[
    (0.00, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.50, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.00, [253, 231, 37]),
];

const INFERNO: &[(f32, [u8; 3])] = &[
    (0.00, [0, 0, 4]),
    (0.25, [87, 16, 110]),
    (0.50, [188, 55, 84]),
    (0.75, [249, 142, 9]),
    (1.00, [252, 255, 164]),
];

const GREYSCALE: &[(f32, [u8; 3])] = &[(0.0, [0, 0, 0]), (1.0, [255, 255, 255])];

/// All selectable colormaps, in the order `toggle_color` cycles through them.
pub fn builtin() -> Vec<Colormap> {
    vec![
        build("turbo", TURBO),
        build("viridis", VIRIDIS),
        build("inferno", INFERNO),
        build("greyscale", GREYSCALE),
    ]
}
