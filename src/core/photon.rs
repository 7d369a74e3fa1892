//! Photons are the hit records of a tracing run: one per ray that
//! struck a surface. A **PhotonMap** collects them for one analysis
//! session.

// std
use std::slice::Iter;
// solar
use crate::core::geometry::Point3f;
use crate::core::shape::{ShapeId, SurfaceSide};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Photon {
    /// index of the ray that produced this photon
    pub id: u64,
    /// world space hit position
    pub pos: Point3f,
    pub side: SurfaceSide,
    pub surface: Option<ShapeId>,
}

impl Photon {
    pub fn new(id: u64, pos: Point3f, side: SurfaceSide, surface: Option<ShapeId>) -> Self {
        Photon {
            id,
            pos,
            side,
            surface,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct PhotonMap {
    photons: Vec<Photon>,
}

impl PhotonMap {
    pub fn new() -> Self {
        PhotonMap::default()
    }
    /// Moves a batch of photons into the map.
    pub fn append(&mut self, batch: &mut Vec<Photon>) {
        self.photons.append(batch);
    }
    pub fn clear(&mut self) {
        self.photons.clear();
    }
    pub fn len(&self) -> usize {
        self.photons.len()
    }
    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }
    pub fn iter(&self) -> Iter<Photon> {
        self.photons.iter()
    }
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }
    /// Restores ray order after batches arrived out of order.
    pub fn sort_by_id(&mut self) {
        self.photons.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn batches_merge_in_ray_order() {
        let mut map = PhotonMap::new();
        let mut late: Vec<Photon> = (10..13)
            .map(|id| Photon::new(id, Point3f::default(), SurfaceSide::Front, Some(ShapeId(0))))
            .collect();
        let mut early: Vec<Photon> = (0..2)
            .map(|id| Photon::new(id, Point3f::default(), SurfaceSide::Back, None))
            .collect();
        map.append(&mut late);
        map.append(&mut early);
        assert!(late.is_empty());
        assert_eq!(map.len(), 5);
        map.sort_by_id();
        let ids: Vec<u64> = map.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 10, 11, 12]);
        map.clear();
        assert!(map.is_empty());
    }
}
