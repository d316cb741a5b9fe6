use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::bodies::Body;
use crate::collision::{
    is_valid_cell_size, order_shapes, Arbiter, CollisionFilter, ContactSolver, GroupLayerFilter,
    NarrowPhase, SequentialImpulseSolver, ShapePair, SpaceHash,
};
use crate::core::{
    BodyHandle, BodyStorage, CollisionEvent, CollisionEventType, EventQueue, ShapeHandle,
    ShapeStorage, SpaceConfig,
};
use crate::error::PhysicsError;
use crate::integration::{Integrator, SymplecticEulerIntegrator};
use crate::math::Vector2;
use crate::shapes::Shape;
use crate::Result;

/// Candidate pair found by the broad-phase: an active shape and a shape from
/// either partition
#[derive(Debug, Clone, Copy)]
struct Candidate {
    active: ShapeHandle,
    other: ShapeHandle,
    other_is_static: bool,
}

/// The simulation container: bodies, shapes, both broad-phase partitions and
/// the persistent contact sets between shapes
pub struct Space {
    /// Simulation parameters
    config: SpaceConfig,

    /// All bodies, including the space's own static body
    bodies: BodyStorage<Body>,

    /// Shapes that move with their bodies, rehashed every step
    shapes: ShapeStorage<Shape>,

    /// Shapes assumed never to move
    static_shapes: ShapeStorage<Shape>,

    /// Broad-phase partition for `shapes`
    active_hash: SpaceHash<ShapeHandle>,

    /// Broad-phase partition for `static_shapes`
    static_hash: SpaceHash<ShapeHandle>,

    /// Contact sets keyed by shape pair
    arbiters: BTreeMap<ShapePair, Arbiter>,

    /// Infinite-mass body that static geometry is usually attached to
    static_body: BodyHandle,

    /// Advances velocities and positions
    integrator: Box<dyn Integrator>,

    /// Rejects pairs before the narrow-phase
    filter: Box<dyn CollisionFilter>,

    /// Replaces the built-in solver when set
    solver: Option<Box<dyn ContactSolver>>,

    /// Collision events from the last step
    events: EventQueue,

    /// Step counter used to age contact sets
    stamp: u64,

    /// The total elapsed simulation time
    time: f32,
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl Space {
    /// Creates a new space with default settings
    pub fn new() -> Self {
        Self::with_config(SpaceConfig::default())
    }

    /// Creates a new space with the given configuration
    pub fn with_config(mut config: SpaceConfig) -> Self {
        let mut bodies = BodyStorage::new();
        let static_body = bodies.add(Body::new_static());

        let active_hash = SpaceHash::new(config.active_hash.cell_size, config.active_hash.cell_count);
        let static_hash = SpaceHash::new(config.static_hash.cell_size, config.static_hash.cell_count);
        config.active_hash.cell_size = active_hash.cell_size();
        config.static_hash.cell_size = static_hash.cell_size();

        Self {
            active_hash,
            static_hash,
            config,
            bodies,
            shapes: ShapeStorage::new(),
            static_shapes: ShapeStorage::new(),
            arbiters: BTreeMap::new(),
            static_body,
            integrator: Box::new(SymplecticEulerIntegrator::new()),
            filter: Box::new(GroupLayerFilter::new()),
            solver: None,
            events: EventQueue::new(),
            stamp: 0,
            time: 0.0,
        }
    }

    /// Returns the current simulation time
    pub fn get_time(&self) -> f32 {
        self.time
    }

    /// Returns a reference to the configuration
    pub fn get_config(&self) -> &SpaceConfig {
        &self.config
    }

    /// Returns a mutable reference to the configuration.
    ///
    /// Hash sizing changes only take effect through
    /// [`Space::resize_static_hash`] and [`Space::resize_active_hash`].
    pub fn get_config_mut(&mut self) -> &mut SpaceConfig {
        &mut self.config
    }

    /// Sets the gravity for the simulation
    pub fn set_gravity(&mut self, gravity: Vector2) {
        self.config.gravity = gravity;
    }

    /// Gets the current gravity
    pub fn get_gravity(&self) -> Vector2 {
        self.config.gravity
    }

    /// Returns the handle of the space's built-in static body
    pub fn static_body(&self) -> BodyHandle {
        self.static_body
    }

    /// Replaces the integrator
    pub fn set_integrator(&mut self, integrator: Box<dyn Integrator>) {
        self.integrator = integrator;
    }

    /// Replaces the broad-phase pair filter
    pub fn set_collision_filter(&mut self, filter: Box<dyn CollisionFilter>) {
        self.filter = filter;
    }

    /// Replaces the contact solver. By default a [`SequentialImpulseSolver`]
    /// built from the current configuration is used.
    pub fn set_contact_solver(&mut self, solver: Box<dyn ContactSolver>) {
        self.solver = Some(solver);
    }

    /// Adds a body and returns its handle
    pub fn add_body(&mut self, body: Body) -> Result<BodyHandle> {
        if body.is_dynamic() && !body.has_valid_mass_properties() {
            warn!(
                mass = body.get_mass(),
                moment = body.get_moment(),
                "rejected dynamic body with invalid mass properties"
            );
            return Err(PhysicsError::InvalidParameter(format!(
                "dynamic body needs positive finite mass and moment (got mass {}, moment {})",
                body.get_mass(),
                body.get_moment()
            )));
        }

        let handle = self.bodies.add(body);
        debug!(body = handle.id(), "added body");
        Ok(handle)
    }

    /// Removes a body together with every shape attached to it
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<Body> {
        if handle == self.static_body {
            return Err(PhysicsError::InvalidParameter(
                "the space's static body cannot be removed".to_string(),
            ));
        }
        self.bodies.get_or_err(handle)?;

        let attached: Vec<ShapeHandle> = self
            .shapes
            .iter()
            .filter(|(_, shape)| shape.get_body() == handle)
            .map(|(shape_handle, _)| shape_handle)
            .collect();
        for shape_handle in attached {
            self.remove_shape(shape_handle)?;
        }

        let attached_static: Vec<ShapeHandle> = self
            .static_shapes
            .iter()
            .filter(|(_, shape)| shape.get_body() == handle)
            .map(|(shape_handle, _)| shape_handle)
            .collect();
        for shape_handle in attached_static {
            self.remove_static_shape(shape_handle)?;
        }

        debug!(body = handle.id(), "removed body");
        self.bodies.remove(handle).ok_or_else(|| {
            PhysicsError::InternalError(format!("body {} vanished during removal", handle.id()))
        })
    }

    /// Gets a reference to a body by its handle
    pub fn get_body(&self, handle: BodyHandle) -> Result<&Body> {
        self.bodies.get_or_err(handle)
    }

    /// Gets a mutable reference to a body by its handle
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body> {
        self.bodies.get_mut_or_err(handle)
    }

    fn prepare_shape(&self, shape: &mut Shape) -> Result<ShapeHandle> {
        let handle = shape.handle();
        if self.shapes.contains(handle) || self.static_shapes.contains(handle) {
            return Err(PhysicsError::InvalidParameter(format!(
                "shape {} is already in the space",
                handle.id()
            )));
        }

        let body = self.bodies.get_or_err(shape.get_body())?;
        shape.update(body);
        Ok(handle)
    }

    /// Adds a shape that moves with its body
    pub fn add_shape(&mut self, mut shape: Shape) -> Result<ShapeHandle> {
        let handle = self.prepare_shape(&mut shape)?;
        let bb = shape.get_bb();

        self.shapes.insert(handle, shape)?;
        self.active_hash.insert(handle, bb);
        debug!(shape = handle.id(), "added active shape");
        Ok(handle)
    }

    /// Adds a shape that never moves. Its bounding box is computed once here
    /// and again only on [`Space::rehash_static`].
    pub fn add_static_shape(&mut self, mut shape: Shape) -> Result<ShapeHandle> {
        let handle = self.prepare_shape(&mut shape)?;
        let bb = shape.get_bb();

        self.static_shapes.insert(handle, shape)?;
        self.static_hash.insert(handle, bb);
        debug!(shape = handle.id(), "added static shape");
        Ok(handle)
    }

    fn drop_arbiters_for(&mut self, handle: ShapeHandle) {
        self.arbiters.retain(|pair, _| !pair.contains(handle));
    }

    /// Removes an active shape
    pub fn remove_shape(&mut self, handle: ShapeHandle) -> Result<Shape> {
        let shape = self.shapes.remove(handle).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("active shape {} not found", handle.id()))
        })?;

        self.active_hash.remove(handle);
        self.drop_arbiters_for(handle);
        debug!(shape = handle.id(), "removed active shape");
        Ok(shape)
    }

    /// Removes a static shape
    pub fn remove_static_shape(&mut self, handle: ShapeHandle) -> Result<Shape> {
        let shape = self.static_shapes.remove(handle).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("static shape {} not found", handle.id()))
        })?;

        self.static_hash.remove(handle);
        self.drop_arbiters_for(handle);
        debug!(shape = handle.id(), "removed static shape");
        Ok(shape)
    }

    /// Gets a shape from either partition
    pub fn get_shape(&self, handle: ShapeHandle) -> Result<&Shape> {
        self.shapes
            .get(handle)
            .or_else(|| self.static_shapes.get(handle))
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("shape {} not found", handle.id())))
    }

    /// Gets a mutable reference to a shape from either partition
    pub fn get_shape_mut(&mut self, handle: ShapeHandle) -> Result<&mut Shape> {
        if self.shapes.contains(handle) {
            return self.shapes.get_mut_or_err(handle);
        }
        self.static_shapes.get_mut_or_err(handle)
    }

    /// Returns true if the shape lives in the static partition
    pub fn is_static_shape(&self, handle: ShapeHandle) -> bool {
        self.static_shapes.contains(handle)
    }

    /// Recomputes static shape geometry from their bodies and rebuilds the
    /// static partition. Call after moving a body that static shapes hang off.
    pub fn rehash_static(&mut self) {
        for (handle, shape) in self.static_shapes.iter_mut() {
            if let Some(body) = self.bodies.get(shape.get_body()) {
                let bb = shape.update(body);
                self.static_hash.set_bb(handle, bb);
            }
        }
        self.static_hash.rehash();
        debug!(shapes = self.static_shapes.len(), "rehashed static shapes");
    }

    /// Changes the grid of the static partition.
    ///
    /// Fails without touching the partition if `cell_size` is not positive
    /// and finite.
    pub fn resize_static_hash(&mut self, cell_size: f32, cell_count: usize) -> Result<()> {
        check_cell_size(cell_size)?;
        self.config.static_hash.cell_size = cell_size;
        self.config.static_hash.cell_count = cell_count;
        self.static_hash.resize(cell_size, cell_count);
        Ok(())
    }

    /// Changes the grid of the active partition. See [`Space::resize_static_hash`].
    pub fn resize_active_hash(&mut self, cell_size: f32, cell_count: usize) -> Result<()> {
        check_cell_size(cell_size)?;
        self.config.active_hash.cell_size = cell_size;
        self.config.active_hash.cell_count = cell_count;
        self.active_hash.resize(cell_size, cell_count);
        Ok(())
    }

    /// Advances the simulation by `dt`. A zero step does nothing.
    pub fn step(&mut self, dt: f32) {
        if dt == 0.0 {
            return;
        }

        self.events.clear();
        self.stamp += 1;

        self.integrate(dt);
        self.update_active_shapes();

        let candidates = self.find_candidates();
        self.collide_candidates(&candidates);
        self.expire_arbiters();

        self.solve(1.0 / dt);

        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces();
        }
        self.time += dt;

        trace!(
            bodies = self.bodies.len(),
            shapes = self.shapes.len(),
            candidates = candidates.len(),
            arbiters = self.arbiters().count(),
            contacts = self.arbiters().map(|arb| arb.contacts.len()).sum::<usize>(),
            "step complete"
        );
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        let damping = self.config.damping.powf(dt);

        for (_, body) in self.bodies.iter_mut() {
            self.integrator.integrate(body, gravity, damping, dt);
        }
    }

    fn update_active_shapes(&mut self) {
        for (handle, shape) in self.shapes.iter_mut() {
            if let Some(body) = self.bodies.get(shape.get_body()) {
                let bb = shape.update(body);
                self.active_hash.set_bb(handle, bb);
            }
        }
    }

    fn find_candidates(&mut self) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (active, shape) in self.shapes.iter() {
            self.static_hash.query(shape.get_bb(), |other| {
                candidates.push(Candidate {
                    active,
                    other,
                    other_is_static: true,
                });
            });
        }

        self.active_hash.query_rehash(|active, other| {
            candidates.push(Candidate {
                active,
                other,
                other_is_static: false,
            });
        });

        candidates
    }

    fn collide_candidates(&mut self, candidates: &[Candidate]) {
        let narrow_phase = NarrowPhase::new(self.config.collision_slop);
        let stamp = self.stamp;

        for candidate in candidates {
            let Some(a) = self.shapes.get(candidate.active) else {
                continue;
            };
            let b = if candidate.other_is_static {
                self.static_shapes.get(candidate.other)
            } else {
                self.shapes.get(candidate.other)
            };
            let Some(b) = b else {
                continue;
            };

            if !self.filter.should_collide(a, b) {
                continue;
            }

            let (first, second) = order_shapes(a, b);
            let contacts = narrow_phase.collide(first, second);
            if contacts.is_empty() {
                continue;
            }

            let pair = ShapePair::new(first.handle(), second.handle());
            let arbiter = self.arbiters.entry(pair).or_insert_with(|| {
                Arbiter::new(
                    first.handle(),
                    second.handle(),
                    first.get_body(),
                    second.get_body(),
                    &first.material,
                    &second.material,
                )
            });
            arbiter.set_materials(&first.material, &second.material);

            let event_type = if arbiter.touching {
                CollisionEventType::Persist
            } else {
                CollisionEventType::Begin
            };
            arbiter.inject(contacts, stamp);

            self.events.add_collision_event(CollisionEvent {
                event_type,
                shape_a: arbiter.shape_a,
                shape_b: arbiter.shape_b,
                body_a: arbiter.body_a,
                body_b: arbiter.body_b,
                contacts: arbiter.contacts.clone(),
            });
        }
    }

    /// Ends contact sets that were not refreshed this step and drops the ones
    /// older than the persistence window
    fn expire_arbiters(&mut self) {
        let stamp = self.stamp;
        let persistence = u64::from(self.config.contact_persistence);

        for arbiter in self.arbiters.values_mut() {
            if arbiter.stamp != stamp && arbiter.touching {
                arbiter.touching = false;
                self.events.add_collision_event(CollisionEvent {
                    event_type: CollisionEventType::End,
                    shape_a: arbiter.shape_a,
                    shape_b: arbiter.shape_b,
                    body_a: arbiter.body_a,
                    body_b: arbiter.body_b,
                    contacts: Vec::new(),
                });
            }
        }

        self.arbiters
            .retain(|_, arbiter| stamp - arbiter.stamp <= persistence);
    }

    fn solve(&mut self, dt_inv: f32) {
        let default_solver;
        let solver: &dyn ContactSolver = match &self.solver {
            Some(solver) => solver.as_ref(),
            None => {
                default_solver =
                    SequentialImpulseSolver::new(self.config.bias_coef, self.config.collision_slop);
                &default_solver
            }
        };

        let stamp = self.stamp;
        let mut active: Vec<&mut Arbiter> = self
            .arbiters
            .values_mut()
            .filter(|arbiter| arbiter.stamp == stamp)
            .collect();

        solver.pre_step(&mut active, &self.bodies, dt_inv);
        solver.apply_cached_impulses(&mut active, &mut self.bodies);

        let elastic_iterations = self.config.elastic_iterations;
        for _ in 0..elastic_iterations {
            solver.apply_impulses(&mut active, &mut self.bodies, 1.0);
        }

        let e_coef = if elastic_iterations > 0 { 0.0 } else { 1.0 };
        for _ in 0..self.config.iterations {
            solver.apply_impulses(&mut active, &mut self.bodies, e_coef);
        }
    }

    /// Iterates over the contact sets refreshed by the last step
    pub fn arbiters(&self) -> impl Iterator<Item = &Arbiter> + '_ {
        let stamp = self.stamp;
        self.arbiters
            .values()
            .filter(move |arbiter| arbiter.stamp == stamp)
    }

    /// Returns the collision events produced by the last step
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Returns the collision events for draining
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Calls `f` for every body, including the space's static body
    pub fn each_body(&self, mut f: impl FnMut(BodyHandle, &Body)) {
        for (handle, body) in self.bodies.iter() {
            f(handle, body);
        }
    }

    /// Calls `f` for every active shape
    pub fn each_shape(&self, mut f: impl FnMut(&Shape)) {
        self.active_hash.each(|handle, _| {
            if let Some(shape) = self.shapes.get(handle) {
                f(shape);
            }
        });
    }

    /// Calls `f` for every static shape
    pub fn each_static_shape(&self, mut f: impl FnMut(&Shape)) {
        self.static_hash.each(|handle, _| {
            if let Some(shape) = self.static_shapes.get(handle) {
                f(shape);
            }
        });
    }

    /// Calls `f` for every shape, active or static, that contains `point`
    pub fn point_query(&self, point: Vector2, mut f: impl FnMut(&Shape)) {
        let mut hits = Vec::new();
        self.active_hash.point_query(point, |handle| hits.push((handle, false)));
        self.static_hash.point_query(point, |handle| hits.push((handle, true)));

        for (handle, is_static) in hits {
            let storage = if is_static { &self.static_shapes } else { &self.shapes };
            if let Some(shape) = storage.get(handle) {
                if shape.point_query(point) {
                    f(shape);
                }
            }
        }
    }

    /// Returns the number of bodies, including the space's static body
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Returns the number of active shapes
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Returns the number of static shapes
    pub fn static_shape_count(&self) -> usize {
        self.static_shapes.len()
    }
}

fn check_cell_size(cell_size: f32) -> Result<()> {
    if is_valid_cell_size(cell_size) {
        Ok(())
    } else {
        warn!(cell_size, "rejected spatial hash cell size");
        Err(PhysicsError::InvalidParameter(format!(
            "cell size must be positive and finite (got {})",
            cell_size
        )))
    }
}
