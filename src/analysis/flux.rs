//! Flux analysis of one surface.
//!
//! A [FluxAnalysis](struct.FluxAnalysis.html) session owns the photons
//! that hit the selected side of the selected surface. Their positions
//! are converted once into the surface's 2D analysis coordinates and
//! cached, so that changing the grid resolution only re-bins and never
//! re-traces.

// std
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
// others
use log::{debug, info};
use rayon::prelude::*;
use strum_macros::Display;
// solar
use crate::core::error::{AnalysisError, ConfigError};
use crate::core::geometry::{Bounds2f, Point2f};
use crate::core::photon::{Photon, PhotonMap};
use crate::core::primitive::SurfaceNode;
use crate::core::shape::SurfaceSide;
use crate::core::solar::{clamp_t, Float};
use crate::lights::sun::SunSource;
use crate::tracer::{trace_photons, TraceResult, TraceSettings};

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    /// no photons for the current selection
    Empty,
    /// photons recorded but not binned yet
    Collected,
    /// counts exist for the current resolution
    Binned,
}

/// Photon counts over a regular grid laid on the analysis extent.
/// Counts are stored row by row, `y` major.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxGrid {
    pub width_divisions: usize,
    pub height_divisions: usize,
    pub extent: Bounds2f,
    counts: Vec<u64>,
}

impl FluxGrid {
    pub fn new(
        width_divisions: usize,
        height_divisions: usize,
        extent: Bounds2f,
    ) -> Result<Self, ConfigError> {
        if width_divisions < 1 || height_divisions < 1 {
            return Err(ConfigError::InvalidDivisions {
                width: width_divisions,
                height: height_divisions,
            });
        }
        if extent.is_degenerate() {
            return Err(ConfigError::DegenerateExtent);
        }
        Ok(FluxGrid {
            width_divisions,
            height_divisions,
            extent,
            counts: vec![0_u64; width_divisions * height_divisions],
        })
    }
    /// Cell index along one axis. The lower clamp only catches
    /// round-off, the upper one puts `c == max` into the last cell.
    fn bin(c: Float, min: Float, max: Float, divisions: usize) -> usize {
        let index: Float = ((c - min) / (max - min) * divisions as Float).floor();
        clamp_t(index, 0.0, (divisions - 1) as Float) as usize
    }
    pub fn bin_index(&self, p: &Point2f) -> (usize, usize) {
        (
            FluxGrid::bin(
                p.x,
                self.extent.p_min.x,
                self.extent.p_max.x,
                self.width_divisions,
            ),
            FluxGrid::bin(
                p.y,
                self.extent.p_min.y,
                self.extent.p_max.y,
                self.height_divisions,
            ),
        )
    }
    pub fn add(&mut self, p: &Point2f) {
        let (ix, iy) = self.bin_index(p);
        self.counts[iy * self.width_divisions + ix] += 1;
    }
    /// Adds the counts of a grid with the same layout.
    pub fn merge(&mut self, other: &FluxGrid) {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (c, o) in self.counts.iter_mut().zip(other.counts.iter()) {
            *c += *o;
        }
    }
    pub fn count(&self, ix: usize, iy: usize) -> u64 {
        self.counts[iy * self.width_divisions + ix]
    }
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
    /// Largest count and its cell. On ties the first cell in row order
    /// wins.
    pub fn max_cell(&self) -> (u64, usize, usize) {
        let mut best: (u64, usize, usize) = (0, 0, 0);
        for iy in 0..self.height_divisions {
            for ix in 0..self.width_divisions {
                let c: u64 = self.count(ix, iy);
                if c > best.0 {
                    best = (c, ix, iy);
                }
            }
        }
        best
    }
    pub fn cell_width(&self) -> Float {
        self.extent.width() / self.width_divisions as Float
    }
    pub fn cell_height(&self) -> Float {
        self.extent.height() / self.height_divisions as Float
    }
    pub fn cell_area(&self) -> Float {
        self.cell_width() * self.cell_height()
    }
    pub fn cell_center(&self, ix: usize, iy: usize) -> Point2f {
        Point2f::new(
            self.extent.p_min.x + (ix as Float + 0.5) * self.cell_width(),
            self.extent.p_min.y + (iy as Float + 0.5) * self.cell_height(),
        )
    }
}

/// Bins the coordinates in parallel. Each rayon job folds into its own
/// grid, the partial grids are merged afterwards on this thread.
fn bin_coordinates(template: &FluxGrid, coords: &[Point2f]) -> FluxGrid {
    let partials: Vec<FluxGrid> = coords
        .par_iter()
        .fold(
            || template.clone(),
            |mut grid, p| {
                grid.add(p);
                grid
            },
        )
        .collect();
    let mut grid: FluxGrid = template.clone();
    for partial in partials.iter() {
        grid.merge(partial);
    }
    grid
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FluxStatistics {
    pub total_power: Float,
    pub minimum_flux: Float,
    pub average_flux: Float,
    pub maximum_flux: Float,
    /// centre of the cell holding the peak
    pub max_coordinates: Point2f,
    /// relative change of the peak on a grid with one division less in
    /// each direction
    pub max_flux_error: Float,
    pub centroid: Point2f,
    pub uniformity: Float,
}

/// Flux along the row and the column through a cursor position, as
/// `(cell centre, flux)` pairs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SectorProfiles {
    /// along x, at the row through the cursor
    pub horizontal: Vec<(Float, Float)>,
    /// along y, at the column through the cursor
    pub vertical: Vec<(Float, Float)>,
}

pub struct FluxAnalysis {
    surface: Option<Arc<SurfaceNode>>,
    side: SurfaceSide,
    photons: PhotonMap,
    /// analysis coordinates of the photons, in photon map order
    coordinates: Vec<Point2f>,
    rays_traced: u64,
    photon_power: Float,
    grid: Option<FluxGrid>,
    coarse_grid: Option<FluxGrid>,
}

impl Default for FluxAnalysis {
    fn default() -> Self {
        FluxAnalysis {
            surface: None,
            side: SurfaceSide::Front,
            photons: PhotonMap::new(),
            coordinates: Vec::new(),
            rays_traced: 0,
            photon_power: 0.0,
            grid: None,
            coarse_grid: None,
        }
    }
}

impl FluxAnalysis {
    pub fn new() -> Self {
        FluxAnalysis::default()
    }
    pub fn state(&self) -> AnalysisState {
        if self.photons.is_empty() {
            AnalysisState::Empty
        } else if self.grid.is_none() {
            AnalysisState::Collected
        } else {
            AnalysisState::Binned
        }
    }
    pub fn surface(&self) -> Option<&Arc<SurfaceNode>> {
        self.surface.as_ref()
    }
    pub fn side(&self) -> SurfaceSide {
        self.side
    }
    /// Selects the surface to analyse. Any previous result is dropped.
    pub fn select_surface(&mut self, surface: Arc<SurfaceNode>) {
        self.surface = Some(surface);
        self.clear_photon_map();
    }
    /// Selects the side to analyse. Any previous result is dropped.
    pub fn set_side(&mut self, side: SurfaceSide) {
        self.side = side;
        self.clear_photon_map();
    }
    pub fn clear_photon_map(&mut self) {
        self.photons.clear();
        self.coordinates.clear();
        self.rays_traced = 0;
        self.photon_power = 0.0;
        self.grid = None;
        self.coarse_grid = None;
    }
    pub fn photons(&self) -> &PhotonMap {
        &self.photons
    }
    pub fn photon_count(&self) -> usize {
        self.photons.len()
    }
    pub fn photon_power(&self) -> Float {
        self.photon_power
    }
    pub fn rays_traced(&self) -> u64 {
        self.rays_traced
    }
    pub fn grid(&self) -> Option<&FluxGrid> {
        self.grid.as_ref()
    }
    /// Traces the sun against the selected surface. With `append` the
    /// new photons are added to the ones from earlier runs and the power
    /// per photon is recomputed over all rays traced so far.
    pub fn run(
        &mut self,
        sun: &SunSource,
        settings: &TraceSettings,
        append: bool,
        cancel: &AtomicBool,
    ) -> Result<TraceResult, AnalysisError> {
        let surface: Arc<SurfaceNode> = self
            .surface
            .clone()
            .ok_or(ConfigError::NoSurfaceSelected)?;
        // continued runs number their rays after the ones already traced
        let settings = TraceSettings {
            first_ray: if append {
                settings.first_ray + self.rays_traced
            } else {
                settings.first_ray
            },
            ..*settings
        };
        let result: TraceResult = trace_photons(sun, &surface, &settings, cancel)?;
        let rays_traced: u64 = if append {
            self.rays_traced + result.rays_traced
        } else {
            result.rays_traced
        };
        // power through the sun aperture, shared by every ray traced
        let aperture_power: Float = if result.rays_traced > 0 {
            result.photon_power * result.rays_traced as Float
        } else {
            self.photon_power * self.rays_traced as Float
        };
        let photon_power: Float = if rays_traced > 0 {
            aperture_power / rays_traced as Float
        } else {
            0.0
        };
        self.load_photons(result.photons.photons(), photon_power, append);
        self.rays_traced = rays_traced;
        Ok(result)
    }
    /// Takes photons from an external source. Only the photons on the
    /// selected side of the selected surface are kept; without a
    /// selected surface the side filter alone applies.
    pub fn load_photons(&mut self, photons: &[Photon], photon_power: Float, append: bool) {
        if !append {
            self.clear_photon_map();
        }
        let surface_id = self.surface.as_ref().map(|s| s.id);
        let side: SurfaceSide = self.side;
        let mut kept: Vec<Photon> = photons
            .iter()
            .filter(|p| p.side == side && (surface_id.is_none() || p.surface == surface_id))
            .copied()
            .collect();
        match self.surface.as_ref() {
            Some(surface) => self
                .coordinates
                .extend(kept.iter().map(|p| surface.analysis_coordinates(&p.pos))),
            None => self
                .coordinates
                .extend(kept.iter().map(|p| Point2f::new(p.pos.x, p.pos.y))),
        }
        debug!(
            "kept {} of {} photons on the {} side",
            kept.len(),
            photons.len(),
            side
        );
        self.photons.append(&mut kept);
        self.photon_power = photon_power;
        self.grid = None;
        self.coarse_grid = None;
    }
    /// Extent the photons are binned over: the surface's analysis
    /// rectangle, or the bounding rectangle of the photons when no
    /// surface is selected.
    fn extent(&self) -> Bounds2f {
        match self.surface.as_ref() {
            Some(surface) => surface.shape.analysis_extent(),
            None => self
                .coordinates
                .iter()
                .fold(Bounds2f::default(), |b, p| Bounds2f {
                    p_min: Point2f::new(b.p_min.x.min(p.x), b.p_min.y.min(p.y)),
                    p_max: Point2f::new(b.p_max.x.max(p.x), b.p_max.y.max(p.y)),
                }),
        }
    }
    /// (Re-)bins the cached photon coordinates into a grid of
    /// `width_divisions` by `height_divisions` cells.
    pub fn update_photon_counts(
        &mut self,
        width_divisions: usize,
        height_divisions: usize,
    ) -> Result<(), ConfigError> {
        if width_divisions < 1 || height_divisions < 1 {
            return Err(ConfigError::InvalidDivisions {
                width: width_divisions,
                height: height_divisions,
            });
        }
        if self.photons.is_empty() {
            debug!("no photons to bin");
            self.grid = None;
            self.coarse_grid = None;
            return Ok(());
        }
        let extent: Bounds2f = self.extent();
        let template = FluxGrid::new(width_divisions, height_divisions, extent)?;
        let grid: FluxGrid = bin_coordinates(&template, &self.coordinates);
        self.coarse_grid = if width_divisions > 1 && height_divisions > 1 {
            let coarse = FluxGrid::new(width_divisions - 1, height_divisions - 1, extent)?;
            Some(bin_coordinates(&coarse, &self.coordinates))
        } else {
            None
        };
        debug!(
            "binned {} photons into {} x {} cells over {:?}",
            grid.total(),
            width_divisions,
            height_divisions,
            extent
        );
        self.grid = Some(grid);
        Ok(())
    }
    fn cell_flux(&self, grid: &FluxGrid, ix: usize, iy: usize) -> Float {
        grid.count(ix, iy) as Float * self.photon_power / grid.cell_area()
    }
    /// All zero unless the analysis is binned.
    pub fn statistics(&self) -> FluxStatistics {
        let grid: &FluxGrid = match self.grid.as_ref() {
            Some(grid) => grid,
            None => return FluxStatistics::default(),
        };
        let n_cells: Float = (grid.width_divisions * grid.height_divisions) as Float;
        let total_power: Float = self.coordinates.len() as Float * self.photon_power;
        let total_flux: Float = total_power / grid.cell_area();
        let average_flux: Float = total_flux / n_cells;
        let (max_count, max_x, max_y) = grid.max_cell();
        let maximum_flux: Float = max_count as Float * self.photon_power / grid.cell_area();
        let max_flux_error: Float = match self.coarse_grid.as_ref() {
            Some(coarse) if maximum_flux > 0.0 => {
                let coarse_max: Float =
                    coarse.max_cell().0 as Float * self.photon_power / coarse.cell_area();
                (maximum_flux - coarse_max).abs() / maximum_flux
            }
            _ => 0.0,
        };
        let mut minimum_flux: Float = Float::INFINITY;
        let mut centroid: Point2f = Point2f::default();
        let mut e: Float = 0.0;
        for iy in 0..grid.height_divisions {
            for ix in 0..grid.width_divisions {
                let flux: Float = self.cell_flux(grid, ix, iy);
                minimum_flux = minimum_flux.min(flux);
                let c: Point2f = grid.cell_center(ix, iy);
                centroid.x += flux * c.x;
                centroid.y += flux * c.y;
                e += (flux - average_flux) * (flux - average_flux);
            }
        }
        if total_flux > 0.0 {
            centroid.x /= total_flux;
            centroid.y /= total_flux;
        } else {
            centroid = Point2f::default();
        }
        let uniformity: Float = if average_flux > 0.0 {
            (e / n_cells).sqrt() / average_flux
        } else {
            0.0
        };
        FluxStatistics {
            total_power,
            minimum_flux,
            average_flux,
            maximum_flux,
            max_coordinates: grid.cell_center(max_x, max_y),
            max_flux_error,
            centroid,
            uniformity,
        }
    }
    /// Flux per cell, one row per `y` division.
    pub fn flux_matrix(&self) -> Option<Vec<Vec<Float>>> {
        let grid: &FluxGrid = self.grid.as_ref()?;
        Some(
            (0..grid.height_divisions)
                .map(|iy| {
                    (0..grid.width_divisions)
                        .map(|ix| self.cell_flux(grid, ix, iy))
                        .collect()
                })
                .collect(),
        )
    }
    /// Profiles through the cell containing `(x, y)`; positions outside
    /// the extent are clamped to the border cells.
    pub fn sector(&self, x: Float, y: Float) -> Option<SectorProfiles> {
        let grid: &FluxGrid = self.grid.as_ref()?;
        let (xbin, ybin) = grid.bin_index(&Point2f::new(x, y));
        let vertical: Vec<(Float, Float)> = (0..grid.height_divisions)
            .map(|iy| (grid.cell_center(xbin, iy).y, self.cell_flux(grid, xbin, iy)))
            .collect();
        let horizontal: Vec<(Float, Float)> = (0..grid.width_divisions)
            .map(|ix| (grid.cell_center(ix, ybin).x, self.cell_flux(grid, ix, ybin)))
            .collect();
        Some(SectorProfiles {
            horizontal,
            vertical,
        })
    }
    pub fn log_summary(&self) {
        let stats: FluxStatistics = self.statistics();
        info!(
            "{} photons, total power {} W, peak flux {} W/m^2",
            self.photon_count(),
            stats.total_power,
            stats.maximum_flux
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::Point3f;
    use crate::core::shape::{ActiveSide, ShapeId};
    use crate::core::transform::Transform;
    use crate::lights::sun::SunPillbox;
    use crate::shapes::plane::Plane;
    use approx::assert_abs_diff_eq;

    fn receiver() -> Arc<SurfaceNode> {
        Arc::new(
            SurfaceNode::new(
                ShapeId(3),
                "receiver",
                Arc::new(Plane::new(2.0, 2.0, ActiveSide::Both)),
                None,
                Transform::identity(),
            )
            .expect("valid plane"),
        )
    }

    fn photon(id: u64, x: Float, y: Float) -> Photon {
        Photon::new(
            id,
            Point3f::new(x, y, 0.0),
            SurfaceSide::Front,
            Some(ShapeId(3)),
        )
    }

    /// One photon in the centre of every cell of a 4 x 4 grid.
    fn uniform_photons() -> Vec<Photon> {
        let mut photons: Vec<Photon> = Vec::new();
        for iy in 0..4 {
            for ix in 0..4 {
                let x: Float = -1.0 + (ix as Float + 0.5) * 0.5;
                let y: Float = -1.0 + (iy as Float + 0.5) * 0.5;
                photons.push(photon((iy * 4 + ix) as u64, x, y));
            }
        }
        photons
    }

    fn analysis_with(photons: &[Photon], w: Float) -> FluxAnalysis {
        let mut analysis = FluxAnalysis::new();
        analysis.select_surface(receiver());
        analysis.load_photons(photons, w, false);
        analysis
    }

    #[test]
    fn counts_add_up_to_photons() {
        let photons: Vec<Photon> = (0..1000)
            .map(|i| {
                let x: Float = -1.0 + 2.0 * ((i * 37) % 1000) as Float / 1000.0;
                let y: Float = -1.0 + 2.0 * ((i * 91) % 1000) as Float / 1000.0;
                photon(i, x, y)
            })
            .collect();
        let mut analysis = analysis_with(&photons, 0.5);
        analysis.update_photon_counts(7, 5).expect("valid");
        let grid = analysis.grid().expect("binned");
        assert_eq!(grid.total(), 1000);
        assert_abs_diff_eq!(analysis.statistics().total_power, 500.0, epsilon = 1e-9);
        let flux_sum: Float = analysis
            .flux_matrix()
            .expect("binned")
            .iter()
            .flatten()
            .sum();
        assert_abs_diff_eq!(flux_sum * grid.cell_area(), 500.0, epsilon = 1e-9);
    }

    #[test]
    fn border_coordinates_are_clamped() {
        let photons = vec![photon(0, 1.0, 1.0), photon(1, -1.0, -1.0)];
        let mut analysis = analysis_with(&photons, 1.0);
        analysis.update_photon_counts(4, 4).expect("valid");
        let grid = analysis.grid().expect("binned");
        assert_eq!(grid.count(3, 3), 1);
        assert_eq!(grid.count(0, 0), 1);
        assert_eq!(grid.bin_index(&Point2f::new(-1.0 - 1e-12, 0.0)), (0, 2));
    }

    #[test]
    fn uniform_flux_statistics() {
        let mut analysis = analysis_with(&uniform_photons(), 2.0);
        analysis.update_photon_counts(4, 4).expect("valid");
        let stats = analysis.statistics();
        // 2 W in every 0.25 m^2 cell
        assert_abs_diff_eq!(stats.total_power, 32.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.average_flux, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.minimum_flux, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.maximum_flux, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.uniformity, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.centroid.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.centroid.y, 0.0, epsilon = 1e-9);
        // first cell in row order holds the peak
        assert_abs_diff_eq!(stats.max_coordinates.x, -0.75, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.max_coordinates.y, -0.75, epsilon = 1e-9);
    }

    #[test]
    fn hot_spot_statistics() {
        let mut photons = uniform_photons();
        photons.push(photon(100, 0.3, 0.6));
        photons.push(photon(101, 0.3, 0.6));
        let mut analysis = analysis_with(&photons, 1.0);
        analysis.update_photon_counts(4, 4).expect("valid");
        let stats = analysis.statistics();
        assert_abs_diff_eq!(stats.maximum_flux, 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.minimum_flux, 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.max_coordinates.x, 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.max_coordinates.y, 0.75, epsilon = 1e-9);
        assert!(stats.uniformity > 0.0);
        assert!(stats.centroid.x > 0.0 && stats.centroid.y > 0.0);
        // coarse 3 x 3 grid: cells of 4/9 m^2, the peak cell holds two
        // fine cell centres plus the two extra photons
        let coarse_peak: Float = 4.0 / (4.0 / 9.0);
        assert_abs_diff_eq!(
            stats.max_flux_error,
            (12.0 - coarse_peak).abs() / 12.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn single_division_has_no_error_estimate() {
        let mut analysis = analysis_with(&uniform_photons(), 1.0);
        analysis.update_photon_counts(1, 6).expect("valid");
        assert_eq!(analysis.statistics().max_flux_error, 0.0);
    }

    #[test]
    fn resize_rebins_without_retracing() {
        let mut analysis = analysis_with(&uniform_photons(), 1.0);
        assert_eq!(analysis.state(), AnalysisState::Collected);
        analysis.update_photon_counts(4, 4).expect("valid");
        assert_eq!(analysis.state(), AnalysisState::Binned);
        let first: FluxGrid = analysis.grid().cloned().expect("binned");
        analysis.update_photon_counts(7, 3).expect("valid");
        assert_eq!(analysis.grid().map(|g| g.total()), Some(16));
        analysis.update_photon_counts(4, 4).expect("valid");
        assert_eq!(analysis.grid(), Some(&first));
        assert_eq!(analysis.photon_count(), 16);
    }

    #[test]
    fn invalid_divisions_are_rejected() {
        let mut analysis = analysis_with(&uniform_photons(), 1.0);
        assert!(matches!(
            analysis.update_photon_counts(0, 4),
            Err(ConfigError::InvalidDivisions { width: 0, height: 4 })
        ));
        assert_eq!(analysis.state(), AnalysisState::Collected);
    }

    #[test]
    fn changing_selection_clears_the_session() {
        let mut analysis = analysis_with(&uniform_photons(), 1.0);
        analysis.update_photon_counts(4, 4).expect("valid");
        analysis.set_side(SurfaceSide::Back);
        assert_eq!(analysis.state(), AnalysisState::Empty);
        assert_eq!(analysis.statistics(), FluxStatistics::default());
        assert!(analysis.flux_matrix().is_none());
        assert!(analysis.sector(0.0, 0.0).is_none());
        // front side photons are filtered out now
        analysis.load_photons(&uniform_photons(), 1.0, false);
        assert_eq!(analysis.state(), AnalysisState::Empty);
        analysis.select_surface(receiver());
        assert_eq!(analysis.side(), SurfaceSide::Back);
        assert_eq!(analysis.photon_count(), 0);
    }

    #[test]
    fn sector_profiles_follow_the_cursor() {
        let mut photons = uniform_photons();
        photons.push(photon(100, 0.3, 0.6));
        let mut analysis = analysis_with(&photons, 1.0);
        analysis.update_photon_counts(4, 4).expect("valid");
        let sector = analysis.sector(0.3, 0.6).expect("binned");
        assert_eq!(sector.horizontal.len(), 4);
        assert_eq!(sector.vertical.len(), 4);
        assert_abs_diff_eq!(sector.horizontal[2].0, 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(sector.horizontal[2].1, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sector.horizontal[0].1, 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sector.vertical[3].0, 0.75, epsilon = 1e-9);
        assert_abs_diff_eq!(sector.vertical[3].1, 8.0, epsilon = 1e-9);
        // beyond the extent the border row is used
        let clamped = analysis.sector(5.0, 5.0).expect("binned");
        assert_abs_diff_eq!(clamped.horizontal[3].1, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn run_without_surface_fails() {
        let mut analysis = FluxAnalysis::new();
        let cancel = AtomicBool::new(false);
        let result = analysis.run(
            &SunSource::default(),
            &TraceSettings::default(),
            false,
            &cancel,
        );
        assert!(matches!(
            result,
            Err(AnalysisError::Config(ConfigError::NoSurfaceSelected))
        ));
    }

    #[test]
    fn run_and_append_keep_total_power() {
        let mut analysis = FluxAnalysis::new();
        analysis.select_surface(receiver());
        let sun = SunSource::new(
            SunPillbox::new(1000.0, 0.0).expect("valid"),
            0.0,
            0.5 * crate::core::solar::PI,
        );
        let settings = TraceSettings {
            n_rays: 2000,
            batch_size: 256,
            n_threads: 2,
            ..TraceSettings::default()
        };
        let cancel = AtomicBool::new(false);
        analysis.run(&sun, &settings, false, &cancel).expect("trace");
        analysis.update_photon_counts(5, 5).expect("valid");
        assert_abs_diff_eq!(analysis.statistics().total_power, 4000.0, epsilon = 1e-6);
        let first: Vec<Photon> = analysis.photons().photons().to_vec();
        // same settings again: the appended photons must come from new rays
        analysis.run(&sun, &settings, true, &cancel).expect("trace");
        assert_eq!(analysis.state(), AnalysisState::Collected);
        assert_eq!(analysis.photon_count(), 4000);
        assert_eq!(analysis.rays_traced(), 4000);
        let appended: &[Photon] = &analysis.photons().photons()[2000..];
        assert!(appended.iter().all(|p| p.id >= 2000 && p.id < 4000));
        let mut ids: Vec<u64> = analysis.photons().iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4000);
        let repeated = appended
            .iter()
            .filter(|p| first.iter().any(|q| q.pos == p.pos))
            .count();
        assert_eq!(repeated, 0);
        analysis.update_photon_counts(5, 5).expect("valid");
        assert_abs_diff_eq!(analysis.statistics().total_power, 4000.0, epsilon = 1e-6);
    }
}
