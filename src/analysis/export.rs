//! Writing a binned flux map to disk.

// std
use std::convert::TryFrom;
use std::io::Write;
use std::path::Path;
// others
use log::{info, warn};
// solar
use crate::analysis::flux::{FluxAnalysis, FluxGrid};
use crate::core::error::AnalysisError;
use crate::core::solar::{clamp_t, lerp, Float};

fn binned(analysis: &FluxAnalysis) -> Result<(&FluxGrid, Vec<Vec<Float>>), AnalysisError> {
    match (analysis.grid(), analysis.flux_matrix()) {
        (Some(grid), Some(flux)) => Ok((grid, flux)),
        _ => {
            warn!("nothing available to export");
            Err(AnalysisError::NothingToExport)
        }
    }
}

/// Writes the flux map as text. Without coordinates every line is one
/// row of the grid (one `y` division) with tab separated values; with
/// coordinates every line is `x\ty\tflux` for one cell centre.
pub fn export_ascii<W: Write>(
    analysis: &FluxAnalysis,
    writer: &mut W,
    with_coords: bool,
) -> Result<(), AnalysisError> {
    let (grid, flux) = binned(analysis)?;
    for (iy, row) in flux.iter().enumerate() {
        if with_coords {
            for (ix, value) in row.iter().enumerate() {
                let c = grid.cell_center(ix, iy);
                writeln!(writer, "{}\t{}\t{}", c.x, c.y, value)?;
            }
        } else {
            let line: Vec<String> = row.iter().map(|value| value.to_string()).collect();
            writeln!(writer, "{}", line.join("\t"))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Blue, cyan, green, yellow, red.
const THERMAL: [[Float; 3]; 5] = [
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
];

/// Maps a value in [0, 1] onto the thermal gradient.
pub fn thermal_color(t: Float) -> [u8; 3] {
    let t: Float = clamp_t(t, 0.0, 1.0) * (THERMAL.len() - 1) as Float;
    let i: usize = (t.floor() as usize).min(THERMAL.len() - 2);
    let f: Float = t - i as Float;
    let mut rgb: [u8; 3] = [0_u8; 3];
    for (c, value) in rgb.iter_mut().enumerate() {
        *value = clamp_t(
            255.0 as Float * lerp(f, THERMAL[i][c], THERMAL[i + 1][c]) + 0.5,
            0.0 as Float,
            255.0 as Float,
        ) as u8;
    }
    rgb
}

/// Pixel width, pixel height and RGB buffer length of a flux image, or
/// `None` if they do not fit.
fn image_size(
    width_divisions: usize,
    height_divisions: usize,
    pixels_per_cell: u32,
) -> Option<(u32, u32, usize)> {
    let ppc: usize = pixels_per_cell as usize;
    let width: usize = width_divisions.checked_mul(ppc)?;
    let height: usize = height_divisions.checked_mul(ppc)?;
    let buffer_len: usize = width.checked_mul(height)?.checked_mul(3)?;
    let width: u32 = u32::try_from(width).ok()?;
    let height: u32 = u32::try_from(height).ok()?;
    Some((width, height, buffer_len))
}

/// Writes the flux map as an image, each cell a square of
/// `pixels_per_cell` pixels, scaled from zero to the peak flux. The
/// image format follows the file extension. Rows are flipped so that
/// `y` grows upwards.
pub fn export_image(
    analysis: &FluxAnalysis,
    path: &Path,
    pixels_per_cell: u32,
) -> Result<(), AnalysisError> {
    let (grid, flux) = binned(analysis)?;
    let pixels_per_cell: u32 = pixels_per_cell.max(1);
    let (width, height, buffer_len) = image_size(
        grid.width_divisions,
        grid.height_divisions,
        pixels_per_cell,
    )
    .ok_or(AnalysisError::ImageTooLarge {
        width: grid.width_divisions,
        height: grid.height_divisions,
        pixels_per_cell,
    })?;
    let ppc: usize = pixels_per_cell as usize;
    let peak: Float = analysis.statistics().maximum_flux;
    let mut buffer: Vec<u8> = vec![0_u8; buffer_len];
    for y in 0..height as usize {
        let iy: usize = grid.height_divisions - 1 - y / ppc;
        for x in 0..width as usize {
            let ix: usize = x / ppc;
            let t: Float = if peak > 0.0 {
                flux[iy][ix] / peak
            } else {
                0.0
            };
            let index: usize = 3 * (y * width as usize + x);
            buffer[index..index + 3].copy_from_slice(&thermal_color(t));
        }
    }
    info!("Writing flux map {:?} ({} x {})", path, width, height);
    image::save_buffer(path, &buffer, width, height, image::ColorType::Rgb8)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::Point3f;
    use crate::core::photon::Photon;
    use crate::core::primitive::SurfaceNode;
    use crate::core::shape::{ActiveSide, ShapeId, SurfaceSide};
    use crate::core::transform::Transform;
    use crate::shapes::plane::Plane;
    use std::sync::Arc;

    fn binned_analysis() -> FluxAnalysis {
        let node = SurfaceNode::new(
            ShapeId(0),
            "receiver",
            Arc::new(Plane::new(2.0, 1.0, ActiveSide::Both)),
            None,
            Transform::identity(),
        )
        .expect("valid plane");
        let mut analysis = FluxAnalysis::new();
        analysis.select_surface(Arc::new(node));
        let photons = vec![
            Photon::new(0, Point3f::new(0.5, -0.25, 0.0), SurfaceSide::Front, Some(ShapeId(0))),
            Photon::new(1, Point3f::new(0.5, 0.25, 0.0), SurfaceSide::Front, Some(ShapeId(0))),
            Photon::new(2, Point3f::new(0.5, 0.25, 0.0), SurfaceSide::Front, Some(ShapeId(0))),
        ];
        analysis.load_photons(&photons, 1.0, false);
        analysis.update_photon_counts(2, 2).expect("valid");
        analysis
    }

    #[test]
    fn ascii_rows() {
        let mut out: Vec<u8> = Vec::new();
        export_ascii(&binned_analysis(), &mut out, false).expect("export");
        // cells are 1 x 0.5 m
        assert_eq!(String::from_utf8(out).expect("utf8"), "0\t2\n0\t4\n");
    }

    #[test]
    fn ascii_with_coordinates() {
        let mut out: Vec<u8> = Vec::new();
        export_ascii(&binned_analysis(), &mut out, true).expect("export");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "-0.5\t-0.25\t0",
                "0.5\t-0.25\t2",
                "-0.5\t0.25\t0",
                "0.5\t0.25\t4"
            ]
        );
    }

    #[test]
    fn nothing_to_export() {
        let mut out: Vec<u8> = Vec::new();
        let analysis = FluxAnalysis::new();
        assert!(matches!(
            export_ascii(&analysis, &mut out, false),
            Err(AnalysisError::NothingToExport)
        ));
        assert!(matches!(
            export_image(&analysis, Path::new("unused.png"), 4),
            Err(AnalysisError::NothingToExport)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn oversized_image_is_rejected() {
        assert_eq!(image_size(20, 10, 8), Some((160, 80, 3 * 160 * 80)));
        assert!(image_size(usize::MAX / 2, 4, 4).is_none());
        // fits in usize but not in the u32 image dimensions
        assert!(image_size(1 << 20, 1, 1 << 20).is_none());
        assert!(matches!(
            export_image(&binned_analysis(), Path::new("unused.png"), u32::MAX),
            Err(AnalysisError::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn thermal_gradient_ends() {
        assert_eq!(thermal_color(0.0), [0, 0, 255]);
        assert_eq!(thermal_color(1.0), [255, 0, 0]);
        assert_eq!(thermal_color(0.5), [0, 255, 0]);
        assert_eq!(thermal_color(7.0), [255, 0, 0]);
    }
}
