//! The photon tracer shoots sun rays at one target surface and records
//! a [Photon](../core/photon/struct.Photon.html) for every hit.
//!
//! The rays are split into batches handed out by a
//! [BlockQueue](../blockqueue/struct.BlockQueue.html). A fixed pool of
//! worker threads fills a local buffer per batch and sends it over a
//! channel; the calling thread is the only one writing to the photon
//! map. The seed selects one random sequence and every ray draws a
//! fixed slice of it, found by its id, so the result depends neither on
//! the number of threads nor on the batch size. A run that continues an
//! earlier one starts at a later ray id and therefore traces new rays.
//!
//! A run can be abandoned through an `AtomicBool`. The flag is checked
//! between batches, never per ray.

// std
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
// others
use log::{debug, info, warn};
// solar
use crate::blockqueue::{Batch, BlockQueue};
use crate::core::error::AnalysisError;
use crate::core::photon::{Photon, PhotonMap};
use crate::core::primitive::SurfaceNode;
use crate::core::rng::Rng;
use crate::core::shape::SurfaceSide;
use crate::core::solar::Float;
use crate::lights::sun::{SunAperture, SunSource};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TraceSettings {
    pub n_rays: u64,
    pub batch_size: u64,
    /// 0 uses one thread per CPU
    pub n_threads: u8,
    pub seed: u64,
    /// id of the first ray; a continued run starts after the rays
    /// already traced
    pub first_ray: u64,
    pub show_progress: bool,
}

impl Default for TraceSettings {
    fn default() -> Self {
        TraceSettings {
            n_rays: 100_000,
            batch_size: 4096,
            n_threads: 0,
            seed: 0,
            first_ray: 0,
            show_progress: false,
        }
    }
}

impl TraceSettings {
    pub fn num_cores(&self) -> usize {
        if self.n_threads == 0_u8 {
            num_cpus::get()
        } else {
            self.n_threads as usize
        }
    }
}

#[derive(Debug, Default)]
pub struct TraceResult {
    pub photons: PhotonMap,
    pub rays_traced: u64,
    /// power carried by each traced ray
    pub photon_power: Float,
    pub cancelled: bool,
}

/// Random values consumed by one sun ray: two for the start point on
/// the aperture, two for the direction.
pub const DRAWS_PER_RAY: u64 = 4;

/// Traces one batch of rays against the target.
fn trace_batch(
    batch: &Batch,
    seed: u64,
    first_ray: u64,
    sun: &SunSource,
    aperture: &SunAperture,
    target: &SurfaceNode,
) -> Vec<Photon> {
    let first_id: u64 = first_ray + batch.first;
    let mut rng: Rng = Rng::with_sequence(seed);
    rng.advance(first_id.wrapping_mul(DRAWS_PER_RAY));
    let mut photons: Vec<Photon> = Vec::new();
    for i in 0..batch.len {
        let ray = aperture.generate_ray(&sun.shape, &mut rng);
        if let Some((dg, _t_hit)) = target.intersect(&ray) {
            photons.push(Photon::new(
                first_id + i,
                dg.p,
                SurfaceSide::from(dg.is_front),
                dg.shape,
            ));
        }
    }
    photons
}

pub fn trace_photons(
    sun: &SunSource,
    target: &SurfaceNode,
    settings: &TraceSettings,
    cancel: &AtomicBool,
) -> Result<TraceResult, AnalysisError> {
    let aperture: SunAperture = sun.aperture_for(&target.world_bound())?;
    let num_cores: usize = settings.num_cores();
    info!(
        "Tracing {} rays at {:?} with {} thread(s) ...",
        settings.n_rays, target.name, num_cores
    );
    let block_queue = BlockQueue::new(settings.n_rays, settings.batch_size);
    let rays_traced = AtomicU64::new(0);
    let mut photons: PhotonMap = PhotonMap::new();
    {
        let bq = &block_queue;
        let aperture = &aperture;
        let rays_traced = &rays_traced;
        let photons = &mut photons;
        let seed: u64 = settings.seed;
        let first_ray: u64 = settings.first_ray;
        let show_progress: bool = settings.show_progress;
        crossbeam::scope(|scope| {
            let (batch_tx, batch_rx) = crossbeam_channel::bounded(num_cores);
            // spawn worker threads
            for _ in 0..num_cores {
                let batch_tx = batch_tx.clone();
                scope.spawn(move |_| {
                    while !cancel.load(Ordering::Acquire) {
                        let batch: Batch = match bq.next() {
                            Some(batch) => batch,
                            None => break,
                        };
                        let hits: Vec<Photon> =
                            trace_batch(&batch, seed, first_ray, sun, aperture, target);
                        rays_traced.fetch_add(batch.len, Ordering::AcqRel);
                        // send the batch through the channel to the collecting thread
                        if batch_tx.send(hits).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(batch_tx);
            // merge batches as they arrive
            let mut pb = if show_progress {
                Some(pbr::ProgressBar::new(bq.len() as u64))
            } else {
                None
            };
            for mut hits in batch_rx.iter() {
                photons.append(&mut hits);
                if let Some(pb) = pb.as_mut() {
                    pb.inc();
                }
            }
            if let Some(pb) = pb.as_mut() {
                pb.finish();
            }
        })
        .map_err(|_| AnalysisError::WorkerPanicked)?;
    }
    photons.sort_by_id();
    let rays_traced: u64 = rays_traced.load(Ordering::Acquire);
    let cancelled: bool = rays_traced < settings.n_rays;
    if cancelled {
        warn!(
            "Tracing cancelled after {} of {} rays",
            rays_traced, settings.n_rays
        );
    }
    let photon_power: Float = aperture.photon_power(&sun.shape, rays_traced);
    info!(
        "{} photons on {:?}, {} W per photon",
        photons.len(),
        target.name,
        photon_power
    );
    debug!("sun aperture {:?}", aperture);
    Ok(TraceResult {
        photons,
        rays_traced,
        photon_power,
        cancelled,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::shape::{ActiveSide, ShapeId};
    use crate::core::transform::Transform;
    use crate::lights::sun::SunPillbox;
    use crate::shapes::plane::Plane;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    fn target() -> SurfaceNode {
        SurfaceNode::new(
            ShapeId(0),
            "receiver",
            Arc::new(Plane::new(2.0, 1.0, ActiveSide::Both)),
            None,
            Transform::identity(),
        )
        .expect("valid plane")
    }

    fn zenith_sun() -> SunSource {
        SunSource::new(
            SunPillbox::new(1000.0, 0.0).expect("valid"),
            0.0,
            0.5 * crate::core::solar::PI,
        )
    }

    #[test]
    fn plane_under_zenith_sun_catches_every_ray() {
        let settings = TraceSettings {
            n_rays: 5000,
            batch_size: 512,
            n_threads: 2,
            ..TraceSettings::default()
        };
        let cancel = AtomicBool::new(false);
        let result = trace_photons(&zenith_sun(), &target(), &settings, &cancel).expect("trace");
        assert!(!result.cancelled);
        assert_eq!(result.rays_traced, 5000);
        assert_eq!(result.photons.len(), 5000);
        // total power equals irradiance times the plane area
        let total: Float = result.photons.len() as Float * result.photon_power;
        assert_abs_diff_eq!(total, 2000.0, epsilon = 1e-6);
        assert!(result
            .photons
            .iter()
            .all(|p| p.side == SurfaceSide::Front && p.surface == Some(ShapeId(0))));
    }

    #[test]
    fn results_do_not_depend_on_thread_count() {
        let sun = SunSource::new(SunPillbox::default(), 0.3, 0.9);
        let node = target();
        let cancel = AtomicBool::new(false);
        let mut settings = TraceSettings {
            n_rays: 3000,
            batch_size: 100,
            n_threads: 1,
            seed: 42,
            ..TraceSettings::default()
        };
        let single = trace_photons(&sun, &node, &settings, &cancel).expect("trace");
        settings.n_threads = 4;
        let multi = trace_photons(&sun, &node, &settings, &cancel).expect("trace");
        assert_eq!(single.photons.photons(), multi.photons.photons());
    }

    #[test]
    fn results_do_not_depend_on_batch_size() {
        let sun = SunSource::new(SunPillbox::default(), 1.0, 0.7);
        let node = target();
        let cancel = AtomicBool::new(false);
        let mut settings = TraceSettings {
            n_rays: 2000,
            batch_size: 64,
            n_threads: 2,
            seed: 9,
            ..TraceSettings::default()
        };
        let small = trace_photons(&sun, &node, &settings, &cancel).expect("trace");
        settings.batch_size = 1500;
        let large = trace_photons(&sun, &node, &settings, &cancel).expect("trace");
        assert_eq!(small.photons.photons(), large.photons.photons());
    }

    #[test]
    fn continued_run_traces_new_rays() {
        let sun = SunSource::new(SunPillbox::default(), 0.3, 0.9);
        let node = target();
        let cancel = AtomicBool::new(false);
        let settings = TraceSettings {
            n_rays: 1000,
            batch_size: 128,
            n_threads: 2,
            ..TraceSettings::default()
        };
        let first = trace_photons(&sun, &node, &settings, &cancel).expect("trace");
        let continued = TraceSettings {
            first_ray: 1000,
            ..settings
        };
        let second = trace_photons(&sun, &node, &continued, &cancel).expect("trace");
        assert!(!second.photons.is_empty());
        assert!(second.photons.iter().all(|p| p.id >= 1000 && p.id < 2000));
        let repeated = second
            .photons
            .iter()
            .filter(|p| first.photons.iter().any(|q| q.pos == p.pos))
            .count();
        assert_eq!(repeated, 0);
        // the continuation equals the second half of one long run
        let long = TraceSettings {
            n_rays: 2000,
            ..settings
        };
        let whole = trace_photons(&sun, &node, &long, &cancel).expect("trace");
        let tail: Vec<Photon> = whole.photons.iter().filter(|p| p.id >= 1000).copied().collect();
        assert_eq!(tail.as_slice(), second.photons.photons());
    }

    #[test]
    fn neighbouring_seeds_are_independent() {
        let sun = SunSource::new(SunPillbox::default(), 0.3, 0.9);
        let node = target();
        let cancel = AtomicBool::new(false);
        let settings = TraceSettings {
            n_rays: 1000,
            batch_size: 100,
            n_threads: 2,
            ..TraceSettings::default()
        };
        let a = trace_photons(&sun, &node, &settings, &cancel).expect("trace");
        let b = trace_photons(&sun, &node, &TraceSettings { seed: 1, ..settings }, &cancel)
            .expect("trace");
        let shared = b
            .photons
            .iter()
            .filter(|p| a.photons.iter().any(|q| q.pos == p.pos))
            .count();
        assert_eq!(shared, 0);
    }

    #[test]
    fn cancelled_run_reports_rays_traced_so_far() {
        let cancel = AtomicBool::new(true);
        let result =
            trace_photons(&zenith_sun(), &target(), &TraceSettings::default(), &cancel)
                .expect("trace");
        assert!(result.cancelled);
        assert_eq!(result.rays_traced, 0);
        assert!(result.photons.is_empty());
        assert_eq!(result.photon_power, 0.0);
    }
}
