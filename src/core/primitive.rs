//! A **SurfaceNode** is the bridge between a shape, which only knows
//! its own local frame, and the world the sun rays travel in. It pairs
//! a shape with its object-to-world transform and an optional aperture.
//! Nodes live in a **SurfaceRegistry** and are referenced elsewhere by
//! their [ShapeId](../shape/struct.ShapeId.html).

// std
use std::sync::Arc;
// solar
use crate::core::aperture::Aperture;
use crate::core::error::ConfigError;
use crate::core::geometry::{Bounds3f, Point2f, Point3f, Ray};
use crate::core::interaction::DifferentialGeometry;
use crate::core::shape::{Shape, ShapeId};
use crate::core::solar::Float;
use crate::core::transform::Transform;

pub struct SurfaceNode {
    pub id: ShapeId,
    pub name: String,
    pub shape: Arc<dyn Shape>,
    pub aperture: Option<Arc<dyn Aperture>>,
    pub object_to_world: Transform,
    pub world_to_object: Transform,
}

impl SurfaceNode {
    /// Validates the shape parameters once; a node is never built
    /// around an invalid shape.
    pub fn new(
        id: ShapeId,
        name: &str,
        shape: Arc<dyn Shape>,
        aperture: Option<Arc<dyn Aperture>>,
        object_to_world: Transform,
    ) -> Result<Self, ConfigError> {
        shape.validate()?;
        let world_to_object: Transform = object_to_world.inverse();
        Ok(SurfaceNode {
            id,
            name: name.to_string(),
            shape,
            aperture,
            object_to_world,
            world_to_object,
        })
    }
    pub fn world_bound(&self) -> Bounds3f {
        self.object_to_world
            .transform_bounds(&self.shape.object_bound())
    }
    /// Intersects a world space ray. The returned record is in world
    /// space, tagged with this node's id; the ray parameter is the same
    /// in both frames.
    pub fn intersect(&self, r: &Ray) -> Option<(DifferentialGeometry, Float)> {
        let ray: Ray = self.world_to_object.transform_ray(r);
        let (dg, t_hit) = self.shape.intersect(&ray, self.aperture.as_deref())?;
        let mut dg: DifferentialGeometry = self.object_to_world.transform_differential_geometry(&dg);
        dg.shape = Some(self.id);
        Some((dg, t_hit))
    }
    pub fn intersect_p(&self, r: &Ray) -> bool {
        let ray: Ray = self.world_to_object.transform_ray(r);
        self.shape.intersect_p(&ray, self.aperture.as_deref())
    }
    /// Flux binning coordinates of a world space point on the surface.
    pub fn analysis_coordinates(&self, p: &Point3f) -> Point2f {
        self.shape
            .analysis_coordinates(&self.world_to_object.transform_point(p))
    }
}

#[derive(Default)]
pub struct SurfaceRegistry {
    nodes: Vec<Arc<SurfaceNode>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        SurfaceRegistry::default()
    }
    /// Registers a surface and hands out its id.
    pub fn add(
        &mut self,
        name: &str,
        shape: Arc<dyn Shape>,
        aperture: Option<Arc<dyn Aperture>>,
        object_to_world: Transform,
    ) -> Result<ShapeId, ConfigError> {
        let id: ShapeId = ShapeId(self.nodes.len());
        let node = SurfaceNode::new(id, name, shape, aperture, object_to_world)?;
        self.nodes.push(Arc::new(node));
        Ok(id)
    }
    pub fn get(&self, id: ShapeId) -> Result<Arc<SurfaceNode>, ConfigError> {
        self.nodes
            .get(id.0)
            .cloned()
            .ok_or(ConfigError::UnknownShape(id))
    }
    pub fn find(&self, name: &str) -> Option<Arc<SurfaceNode>> {
        self.nodes.iter().find(|n| n.name == name).cloned()
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SurfaceNode>> {
        self.nodes.iter()
    }
    /// Nearest hit over all registered surfaces. Shrinks the ray's
    /// `t_max` to the hit found.
    pub fn intersect(&self, r: &Ray) -> Option<(DifferentialGeometry, Float)> {
        let mut nearest: Option<(DifferentialGeometry, Float)> = None;
        for node in self.nodes.iter() {
            if let Some((dg, t_hit)) = node.intersect(r) {
                // later candidates must be closer
                r.t_max.set(t_hit);
                nearest = Some((dg, t_hit));
            }
        }
        nearest
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::{Normal3f, Vector3f};
    use crate::core::shape::ActiveSide;
    use crate::core::solar::PI;
    use crate::shapes::plane::Plane;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hit_record_comes_back_in_world_space() {
        let mut registry = SurfaceRegistry::new();
        // plane facing +x, centred at (2, 0, 1)
        let object_to_world = Transform::translate(&Vector3f::new(2.0, 0.0, 1.0))
            * Transform::rotate_y(PI / 2.0);
        let id = registry
            .add(
                "target",
                Arc::new(Plane::new(1.0, 1.0, ActiveSide::Front)),
                None,
                object_to_world,
            )
            .expect("valid plane");
        let node = registry.get(id).expect("registered");
        let ray = Ray::new(Point3f::new(5.0, 0.1, 1.0), Vector3f::new(-1.0, 0.0, 0.0));
        let (dg, t) = node.intersect(&ray).expect("hit");
        assert_abs_diff_eq!(t, 3.0, epsilon = 1e-12);
        assert!(dg.p.approx_eq(&Point3f::new(2.0, 0.1, 1.0)));
        assert!(dg.n.approx_eq(&Normal3f::new(1.0, 0.0, 0.0)));
        assert_eq!(dg.shape, Some(id));
        assert!(dg.is_front);
        let coords = node.analysis_coordinates(&dg.p);
        assert_abs_diff_eq!(coords.y, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn invalid_shapes_and_ids_are_configuration_errors() {
        let mut registry = SurfaceRegistry::new();
        let bad = registry.add(
            "bad",
            Arc::new(Plane::new(-1.0, 1.0, ActiveSide::Both)),
            None,
            Transform::identity(),
        );
        assert!(matches!(
            bad,
            Err(ConfigError::InvalidShapeParameter { .. })
        ));
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get(ShapeId(3)),
            Err(ConfigError::UnknownShape(ShapeId(3)))
        ));
    }

    #[test]
    fn registry_reports_the_nearest_surface() {
        let mut registry = SurfaceRegistry::new();
        let far = registry
            .add(
                "far",
                Arc::new(Plane::default()),
                None,
                Transform::identity(),
            )
            .expect("valid");
        let near = registry
            .add(
                "near",
                Arc::new(Plane::default()),
                None,
                Transform::translate(&Vector3f::new(0.0, 0.0, 1.0)),
            )
            .expect("valid");
        let ray = Ray::new(Point3f::new(0.0, 0.0, 3.0), Vector3f::new(0.0, 0.0, -1.0));
        let (dg, t) = registry.intersect(&ray).expect("hit");
        assert_eq!(dg.shape, Some(near));
        assert_abs_diff_eq!(t, 2.0);
        assert_ne!(dg.shape, Some(far));
        assert!(registry.find("far").is_some());
    }
}
