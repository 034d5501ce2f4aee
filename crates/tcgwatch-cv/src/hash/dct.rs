//! 2-D discrete cosine transform (DCT-II, orthonormal).
//!
//! The hash engine only transforms buffers up to 64x64, so the separable
//! naive transform is plenty; no need for an FFT-backed implementation.

use crate::utils::GrayImageF32;

/// Orthonormal 1-D DCT-II of `input` into `output` (same length).
fn dct_1d(input: &[f32], output: &mut [f32]) {
    let n = input.len();
    debug_assert_eq!(n, output.len());
    let scale0 = (1.0 / n as f64).sqrt();
    let scale = (2.0 / n as f64).sqrt();
    for (k, out) in output.iter_mut().enumerate() {
        let mut sum = 0.0f64;
        for (m, &x) in input.iter().enumerate() {
            sum += f64::from(x)
                * (std::f64::consts::PI * (2.0 * m as f64 + 1.0) * k as f64 / (2.0 * n as f64))
                    .cos();
        }
        *out = (sum * if k == 0 { scale0 } else { scale }) as f32;
    }
}

/// Orthonormal 2-D DCT-II: rows first, then columns.
pub fn dct2(input: &GrayImageF32) -> GrayImageF32 {
    let (w, h) = (input.width(), input.height());
    let mut rows = GrayImageF32::new(w, h);

    let mut row_in = vec![0.0f32; w];
    let mut row_out = vec![0.0f32; w];
    for y in 0..h {
        for x in 0..w {
            row_in[x] = input.get(x, y);
        }
        dct_1d(&row_in, &mut row_out);
        for x in 0..w {
            rows.set(x, y, row_out[x]);
        }
    }

    let mut out = GrayImageF32::new(w, h);
    let mut col_in = vec![0.0f32; h];
    let mut col_out = vec![0.0f32; h];
    for x in 0..w {
        for y in 0..h {
            col_in[y] = rows.get(x, y);
        }
        dct_1d(&col_in, &mut col_out);
        for y in 0..h {
            out.set(x, y, col_out[y]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_image_has_dc_only() {
        let src = GrayImageF32::from_raw(8, 8, vec![0.5; 64]);
        let spectrum = dct2(&src);
        // DC = mean * sqrt(w * h)
        assert!((spectrum.get(0, 0) - 0.5 * 8.0).abs() < 1e-4);
        for y in 0..8 {
            for x in 0..8 {
                if (x, y) != (0, 0) {
                    assert!(spectrum.get(x, y).abs() < 1e-4, "AC({}, {}) nonzero", x, y);
                }
            }
        }
    }

    #[test]
    fn test_parseval_energy_preserved() {
        let data: Vec<f32> = (0..32).map(|i| ((i * 37 + 11) % 101) as f32 / 101.0).collect();
        let src = GrayImageF32::from_raw(8, 4, data.clone());
        let spectrum = dct2(&src);
        let energy_in: f64 = data.iter().map(|&v| f64::from(v) * f64::from(v)).sum();
        let energy_out: f64 = spectrum
            .as_slice()
            .iter()
            .map(|&v| f64::from(v) * f64::from(v))
            .sum();
        assert!((energy_in - energy_out).abs() < 1e-3);
    }
}
