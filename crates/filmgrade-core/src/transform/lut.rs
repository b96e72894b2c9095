//! 3D LUT sampling and `.cube` file I/O.

use std::path::Path;

use crate::error::{GradeError, GradeResult};

/// Largest grid size accepted per axis.
pub const MAX_LUT_SIZE: usize = 256;

/// Number of floats a `size`³ table holds, or `LutSize` when the size is
/// zero, above `MAX_LUT_SIZE`, or overflows.
fn table_len(size: usize) -> GradeResult<usize> {
    if size == 0 || size > MAX_LUT_SIZE {
        return Err(GradeError::LutSize(size));
    }
    size.checked_mul(size)
        .and_then(|n| n.checked_mul(size))
        .and_then(|n| n.checked_mul(3))
        .ok_or(GradeError::LutSize(size))
}

/// A 3D lookup table for fast color transform application.
///
/// Entries are stored flat, three floats per grid point, with red varying
/// fastest: index `(b·size² + g·size + r)·3 + channel`. This is the same
/// order `.cube` files list their rows in.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    size: usize,
    data: Vec<f32>,
    /// Minimum domain values per channel.
    pub domain_min: [f32; 3],
    /// Maximum domain values per channel.
    pub domain_max: [f32; 3],
    pub title: Option<String>,
}

impl Lut3D {
    /// Wrap flat table data, checking it holds exactly `size³·3` values.
    pub fn new(size: usize, data: Vec<f32>) -> GradeResult<Self> {
        let expected = table_len(size)?;
        if data.len() != expected {
            return Err(GradeError::LutDataLength {
                size,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            size,
            data,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            title: None,
        })
    }

    /// A LUT that maps every grid point to its own coordinate.
    pub fn identity(size: usize) -> GradeResult<Self> {
        if size < 2 {
            return Err(GradeError::LutSize(size));
        }
        let n = (size - 1) as f32;
        let mut data = Vec::with_capacity(table_len(size)?);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.extend_from_slice(&[r as f32 / n, g as f32 / n, b as f32 / n]);
                }
            }
        }
        Self::new(size, data)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Grid size per axis.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    fn entry(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        let i = ((b * self.size + g) * self.size + r) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Bilinear red/green lookup within one blue slice.
    fn sample_slice(&self, b: usize, r: f32, g: f32) -> [f32; 3] {
        let last = self.size - 1;
        let r0 = (r.floor() as usize).min(last);
        let g0 = (g.floor() as usize).min(last);
        let r1 = (r0 + 1).min(last);
        let g1 = (g0 + 1).min(last);
        let fr = r - r0 as f32;
        let fg = g - g0 as f32;

        let c00 = self.entry(r0, g0, b);
        let c10 = self.entry(r1, g0, b);
        let c01 = self.entry(r0, g1, b);
        let c11 = self.entry(r1, g1, b);

        let mut out = [0.0f32; 3];
        for c in 0..3 {
            let lo = c00[c] + (c10[c] - c00[c]) * fr;
            let hi = c01[c] + (c11[c] - c01[c]) * fr;
            out[c] = lo + (hi - lo) * fg;
        }
        out
    }

    /// Trilinear lookup: two bilinear slice samples blended along blue.
    ///
    /// Input is mapped through the domain and clamped to [0, 1] first.
    /// A size-1 table is a constant colour.
    pub fn sample(&self, rgb: [f32; 3]) -> [f32; 3] {
        if self.size == 1 {
            return self.entry(0, 0, 0);
        }
        let n = (self.size - 1) as f32;
        let mut coords = [0.0f32; 3];
        for c in 0..3 {
            let range = self.domain_max[c] - self.domain_min[c];
            let t = if range.abs() < 1e-10 {
                0.0
            } else {
                (rgb[c] - self.domain_min[c]) / range
            };
            // NaN compares false against both bounds; route it to 0.
            coords[c] = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) } * n;
        }

        let last = self.size - 1;
        let b0 = (coords[2].floor() as usize).min(last);
        let b1 = (b0 + 1).min(last);
        let fb = coords[2] - b0 as f32;

        let lo = self.sample_slice(b0, coords[0], coords[1]);
        let hi = self.sample_slice(b1, coords[0], coords[1]);
        [
            lo[0] + (hi[0] - lo[0]) * fb,
            lo[1] + (hi[1] - lo[1]) * fb,
            lo[2] + (hi[2] - lo[2]) * fb,
        ]
    }

    /// Parse `.cube` text.
    ///
    /// Accepts `LUT_3D_SIZE N` (or bare `SIZE N`), `TITLE`, `DOMAIN_MIN`,
    /// `DOMAIN_MAX`, `#` comments and blank lines. The number of data
    /// values must be exactly `N³·3`.
    pub fn parse_cube(content: &str) -> GradeResult<Self> {
        let mut size: Option<usize> = None;
        let mut title = None;
        let mut domain_min = [0.0f32; 3];
        let mut domain_max = [1.0f32; 3];
        let mut data = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };
            match keyword {
                "TITLE" => {
                    let rest = line["TITLE".len()..].trim().trim_matches('"');
                    title = Some(rest.to_string());
                }
                "LUT_3D_SIZE" | "SIZE" => {
                    let value = tokens.next().unwrap_or_default();
                    let parsed: usize = value.parse().map_err(|_| GradeError::CubeParse {
                        line: line_no,
                        message: format!("bad {keyword} value '{value}'"),
                    })?;
                    table_len(parsed)?;
                    size = Some(parsed);
                }
                "LUT_1D_SIZE" => {
                    return Err(GradeError::CubeParse {
                        line: line_no,
                        message: "expected a 3D LUT, found LUT_1D_SIZE".into(),
                    });
                }
                "DOMAIN_MIN" => domain_min = parse_triple(tokens, line_no)?,
                "DOMAIN_MAX" => domain_max = parse_triple(tokens, line_no)?,
                _ if keyword.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                    tracing::debug!(line = line_no, keyword, "skipping unknown cube keyword");
                }
                _ => {
                    let row = parse_triple(line.split_whitespace(), line_no)?;
                    data.extend_from_slice(&row);
                }
            }
        }

        let size = size.ok_or(GradeError::CubeParse {
            line: 0,
            message: "missing LUT_3D_SIZE".into(),
        })?;
        let mut lut = Self::new(size, data)?;
        lut.title = title;
        lut.domain_min = domain_min;
        lut.domain_max = domain_max;
        Ok(lut)
    }

    /// Load a 3D LUT from a `.cube` file.
    pub fn load_cube(path: &Path) -> GradeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let lut = Self::parse_cube(&content)?;
        tracing::debug!(path = %path.display(), size = lut.size, "loaded cube LUT");
        Ok(lut)
    }

    /// Render as `.cube` text.
    pub fn write_cube(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("TITLE \"{title}\"\n"));
        }
        out.push_str(&format!("LUT_3D_SIZE {}\n", self.size));
        if self.domain_min != [0.0; 3] || self.domain_max != [1.0; 3] {
            let [a, b, c] = self.domain_min;
            out.push_str(&format!("DOMAIN_MIN {a} {b} {c}\n"));
            let [a, b, c] = self.domain_max;
            out.push_str(&format!("DOMAIN_MAX {a} {b} {c}\n"));
        }
        for rgb in self.data.chunks_exact(3) {
            out.push_str(&format!("{:.6} {:.6} {:.6}\n", rgb[0], rgb[1], rgb[2]));
        }
        out
    }

    /// Save this 3D LUT to a `.cube` file.
    pub fn save_cube(&self, path: &Path) -> GradeResult<()> {
        std::fs::write(path, self.write_cube())?;
        Ok(())
    }
}

fn parse_triple<'a>(mut tokens: impl Iterator<Item = &'a str>, line: usize) -> GradeResult<[f32; 3]> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        let token = tokens.next().ok_or_else(|| GradeError::CubeParse {
            line,
            message: "expected three values".into(),
        })?;
        *slot = token.parse().map_err(|_| GradeError::CubeParse {
            line,
            message: format!("'{token}' is not a number"),
        })?;
    }
    if tokens.next().is_some() {
        return Err(GradeError::CubeParse {
            line,
            message: "more than three values on one row".into(),
        });
    }
    Ok(out)
}
