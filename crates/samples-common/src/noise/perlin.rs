use crate::geometry::Vec3;

/// Combined permutation table of five sub-tables with coprime-ish lengths 11, 13, 16, 17, 19.
/// Summing the per-table hashes gives a hash of period lcm(11, 13, 16, 17, 19) = 739,024,
/// see "Long-Period Hash Functions for Procedural Texturing".
pub const PERMUTATION_TABLE: [u8; 76] = [
    // 11
    0, 10, 2, 7, 3, 5, 6, 4, 8, 1, 9,
    // 13
    5, 11, 6, 8, 1, 10, 12, 9, 3, 7, 0, 4, 2,
    // 16, the range Perlin noise needs out of the hash
    13, 10, 11, 5, 6, 9, 4, 3, 8, 7, 14, 2, 0, 1, 15, 12,
    // 17
    1, 13, 5, 14, 12, 3, 6, 16, 0, 8, 9, 2, 11, 4, 15, 7, 10,
    // 19
    10, 6, 5, 8, 15, 0, 17, 7, 14, 18, 13, 16, 2, 9, 12, 1, 11, 4, 3,
];

// (offset into PERMUTATION_TABLE, sub-table length)
const SUB_TABLES: [(usize, i32); 5] = [(0, 11), (11, 13), (24, 16), (40, 17), (57, 19)];

/// Improved Perlin noise over a 3D lattice, optionally tiling with period `repeat`.
///
/// Evaluation is a pure function of the point, the frequency and `repeat`; the generator holds no
/// other state, so a single instance can be shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerlinNoise3D {
    repeat: i32,
}

impl PerlinNoise3D {
    /// `repeat == 0` disables tiling.
    pub const fn new(repeat: i32) -> Self {
        Self { repeat }
    }

    pub fn repeat(&self) -> i32 {
        self.repeat
    }

    fn hash(x: i32, y: i32, z: i32) -> u8 {
        let sum: u32 = SUB_TABLES
            .iter()
            .map(|&(offset, period)| {
                let permute =
                    |i: i32| PERMUTATION_TABLE[offset + i.rem_euclid(period) as usize] as i32;
                permute(permute(permute(x).wrapping_add(y)).wrapping_add(z)) as u32
            })
            .sum();
        (sum % 16) as u8
    }

    /// Dot product of the gradient picked by `hash` with the offset `(xu, yu, zu)`.
    fn gradient(hash: u8, xu: f32, yu: f32, zu: f32) -> f32 {
        match hash & 0xF {
            // the 12 cube-center-to-edge directions
            0x0 => xu + yu, // ( 1,  1,  0)
            0x1 => -xu + yu, // (-1,  1,  0)
            0x2 => xu - yu, // ( 1, -1,  0)
            0x3 => -xu - yu, // (-1, -1,  0)
            0x4 => xu + zu, // ( 1,  0,  1)
            0x5 => -xu + zu, // (-1,  0,  1)
            0x6 => xu - zu, // ( 1,  0, -1)
            0x7 => -xu - zu, // (-1,  0, -1)
            0x8 => yu + zu, // ( 0,  1,  1)
            0x9 => -yu + zu, // ( 0, -1,  1)
            0xA => yu - zu, // ( 0,  1, -1)
            0xB => -yu - zu, // ( 0, -1, -1)

            // padding up to 16 so the hash never needs a division by 12; these four form a
            // regular tetrahedron and don't bias the result
            0xC => xu + yu, // ( 1,  1,  0)
            0xD => -yu + zu, // ( 0, -1,  1)
            0xE => -xu + yu, // (-1,  1,  0)
            0xF => -yu - zu, // ( 0, -1, -1)

            _ => unreachable!(),
        }
    }

    pub fn evaluate(&self, p: Vec3, frequency: f32) -> f32 {
        let Vec3(mut x, mut y, mut z) = p * frequency;
        let repeat = (self.repeat as f32 * frequency) as u32;

        // move the point into the first tile
        if repeat > 0 {
            let period = repeat as f32;
            let wrap = |v: f32| {
                let v = v % period;
                if v < 0.0 { v + period } else { v }
            };
            x = wrap(x);
            y = wrap(y);
            z = wrap(z);
        }

        let xi = x.floor() as i32;
        let yi = y.floor() as i32;
        let zi = z.floor() as i32;

        // 6t^5 - 15t^4 + 10t^3
        let fade = |t: f32| t * t * t * (t * (t * 6.0 - 15.0) + 10.0);

        let xu = x - xi as f32;
        let yu = y - yi as f32;
        let zu = z - zi as f32;
        let u = fade(xu);
        let v = fade(yu);
        let w = fade(zu);

        let inc = |num: i32| {
            let num = num.wrapping_add(1);
            if repeat > 0 {
                num.rem_euclid(repeat as i32)
            } else {
                num
            }
        };

        let lll = Self::hash(xi, yi, zi);
        let ull = Self::hash(inc(xi), yi, zi);
        let lul = Self::hash(xi, inc(yi), zi);
        let uul = Self::hash(inc(xi), inc(yi), zi);
        let llu = Self::hash(xi, yi, inc(zi));
        let ulu = Self::hash(inc(xi), yi, inc(zi));
        let luu = Self::hash(xi, inc(yi), inc(zi));
        let uuu = Self::hash(inc(xi), inc(yi), inc(zi));

        let lerp = |v0: f32, v1: f32, t: f32| v0 * (1.0 - t) + v1 * t;

        let ll = lerp(
            Self::gradient(lll, xu, yu, zu),
            Self::gradient(ull, xu - 1.0, yu, zu),
            u,
        );
        let ul = lerp(
            Self::gradient(lul, xu, yu - 1.0, zu),
            Self::gradient(uul, xu - 1.0, yu - 1.0, zu),
            u,
        );
        let lower = lerp(ll, ul, v);

        let lu = lerp(
            Self::gradient(llu, xu, yu, zu - 1.0),
            Self::gradient(ulu, xu - 1.0, yu, zu - 1.0),
            u,
        );
        let uu = lerp(
            Self::gradient(luu, xu, yu - 1.0, zu - 1.0),
            Self::gradient(uuu, xu - 1.0, yu - 1.0, zu - 1.0),
            u,
        );
        let upper = lerp(lu, uu, v);

        lerp(lower, upper, w)
    }
}
