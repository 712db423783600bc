//! Multidirect-forcing coupling between rigid spheres and the Eulerian field

use crate::body::{BodyRecord, RigidBody};
use crate::config::{ForcingParams, IbConfig};
use crate::diagnostics::BodyReport;
use crate::error::{IbError, IbResult};
use crate::field::{EulerField, ForceAccumulator};
use crate::geometry::Geometry;
use crate::integrator::{self, BodyLoad};
use crate::sampler::marker_positions;
use crate::transfer::{check_stencils, interpolate_velocity, spread_forces};
use glam::DVec3;
use rayon::prelude::*;
use tracing::{debug, info, trace};

/// Snapshot of one marker, for output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerState {
    pub position: DVec3,
    pub velocity: DVec3,
    pub force: DVec3,
}

/// The coupling engine: owns the rigid bodies and their marker attributes
/// and corrects a field's velocity block once per macro step.
pub struct ImmersedBoundary {
    config: IbConfig,
    geom: Geometry,
    bodies: Vec<RigidBody>,
    accumulator: Option<ForceAccumulator>,
}

impl ImmersedBoundary {
    pub fn new(config: IbConfig, geom: Geometry) -> IbResult<Self> {
        config.validate()?;
        geom.validate()?;
        Ok(Self {
            config,
            geom,
            bodies: Vec::new(),
            accumulator: None,
        })
    }

    pub fn config(&self) -> &IbConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geom
    }

    /// Seed one sphere per `(xs[i], ys[i], zs[i])`, all sharing `radius`
    /// and `body_density`.
    pub fn init_bodies(
        &mut self,
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
        radius: f64,
        body_density: f64,
    ) -> IbResult<()> {
        if xs.len() != ys.len() || xs.len() != zs.len() {
            return Err(IbError::config(format!(
                "seed positions differ in length: x {}, y {}, z {}",
                xs.len(),
                ys.len(),
                zs.len()
            )));
        }
        self.check_contrast(body_density)?;
        let h = self.geom.cell_size();
        let seeded = xs
            .iter()
            .zip(ys)
            .zip(zs)
            .map(|((x, y), z)| RigidBody::new(DVec3::new(*x, *y, *z), radius, body_density, h))
            .collect::<IbResult<Vec<_>>>()?;
        if let Some(first) = seeded.first() {
            info!(
                count = seeded.len(),
                radius,
                markers = first.marker_count(),
                dv = first.dv(),
                "seeded immersed bodies"
            );
        }
        self.bodies.extend(seeded);
        Ok(())
    }

    fn check_contrast(&self, body_density: f64) -> IbResult<()> {
        if body_density == self.config.fluid_density {
            return Err(IbError::config(format!(
                "body density {body_density} equals fluid density; the rigid update needs a density contrast"
            )));
        }
        Ok(())
    }

    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> Option<&RigidBody> {
        self.bodies.get(index)
    }

    pub fn center(&self, index: usize) -> Option<DVec3> {
        self.body(index).map(|b| b.center)
    }

    pub fn velocity(&self, index: usize) -> Option<DVec3> {
        self.body(index).map(|b| b.velocity)
    }

    pub fn angular_velocity(&self, index: usize) -> Option<DVec3> {
        self.body(index).map(|b| b.omega)
    }

    pub fn orientation_increment(&self, index: usize) -> Option<DVec3> {
        self.body(index).map(|b| b.varphi)
    }

    /// Persisted state of every body.
    pub fn records(&self) -> Vec<BodyRecord> {
        self.bodies.iter().map(RigidBody::record).collect()
    }

    /// Replace all bodies with the given records.
    pub fn restore(&mut self, records: &[BodyRecord]) -> IbResult<()> {
        let bodies = records
            .iter()
            .map(|r| {
                self.check_contrast(r.density)?;
                RigidBody::from_record(r)
            })
            .collect::<IbResult<Vec<_>>>()?;
        info!(count = bodies.len(), "restored immersed bodies");
        self.bodies = bodies;
        Ok(())
    }

    pub fn marker_snapshot(&self, index: usize) -> Option<Vec<MarkerState>> {
        let body = self.body(index)?;
        let positions = marker_positions(body);
        Some(
            positions
                .into_iter()
                .zip(&body.markers.velocity)
                .zip(&body.markers.force)
                .map(|((position, velocity), force)| MarkerState {
                    position,
                    velocity: *velocity,
                    force: *force,
                })
                .collect(),
        )
    }

    /// One macro step with the configured forcing parameters.
    pub fn advance(&mut self, field: &mut EulerField, dt: f64) -> IbResult<Vec<BodyReport>> {
        let params = self.config.forcing;
        self.advance_with(field, dt, &params)
    }

    /// One macro step: rigid pre-update of every body, then
    /// `params.sub_iterations` correction cycles per body on the field.
    ///
    /// On error neither the bodies nor the field have been modified.
    pub fn advance_with(
        &mut self,
        field: &mut EulerField,
        dt: f64,
        params: &ForcingParams,
    ) -> IbResult<Vec<BodyReport>> {
        params.validate()?;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(IbError::degenerate(format!(
                "time step must be positive, got {dt}"
            )));
        }
        self.config.check_field(field)?;

        // pre-update and check every body before anything is written
        let prepared = self
            .bodies
            .iter()
            .enumerate()
            .map(|(index, body)| self.prepare_body(index, body, field, dt, params))
            .collect::<IbResult<Vec<_>>>()?;

        let acc = match self.accumulator.take() {
            Some(acc) if acc.n_points() == field.n_points() => acc,
            _ => ForceAccumulator::for_field(field),
        };

        let mut reports = Vec::with_capacity(prepared.len());
        for (index, (body, positions, load)) in prepared.into_iter().enumerate() {
            self.bodies[index] = body;
            reports.push(self.correct_body(index, &positions, load, field, dt, params, &acc));
        }
        self.accumulator = Some(acc);
        Ok(reports)
    }

    /// Rigid pre-update of a copy of `body`, with its new marker positions
    /// checked against the field.
    fn prepare_body(
        &self,
        index: usize,
        body: &RigidBody,
        field: &EulerField,
        dt: f64,
        params: &ForcingParams,
    ) -> IbResult<(RigidBody, Vec<DVec3>, BodyLoad)> {
        let mut next = body.clone();
        let sampled = marker_positions(&next);
        let load = integrator::step(
            &mut next,
            &sampled,
            self.config.fluid_density,
            dt,
            params.relaxation,
        );
        let positions = marker_positions(&next);
        check_stencils(index, &positions, field, &self.geom)?;
        Ok((next, positions, load))
    }

    fn correct_body(
        &mut self,
        index: usize,
        positions: &[DVec3],
        load: BodyLoad,
        field: &mut EulerField,
        dt: f64,
        params: &ForcingParams,
        acc: &ForceAccumulator,
    ) -> BodyReport {
        let geom = self.geom;
        let force_comp = self.config.force_component;
        let vel_comp = self.config.velocity_component;
        let body = &mut self.bodies[index];

        let target = body.velocity;
        for k in 0..params.sub_iterations {
            field.fill_components(force_comp, 3, 0.0);

            body.markers.velocity =
                interpolate_velocity(positions, field, vel_comp, &geom, params.kernel);

            let markers = &mut body.markers;
            markers
                .force
                .par_iter_mut()
                .zip(markers.velocity.par_iter())
                .for_each(|(f, u)| *f = (target - *u) / dt);

            acc.reset();
            spread_forces(positions, &body.markers.force, field, acc, &geom, params.kernel);
            field.add_accumulated(force_comp, acc);

            field.saxpy(vel_comp, dt, force_comp, 3);
            trace!(body = index, iteration = k + 1, "direct-forcing correction");
        }

        let report = BodyReport::new(index, body, load);
        debug!(
            body = index,
            center = ?body.center,
            velocity = ?body.velocity,
            max_slip = report.max_slip,
            "advanced immersed body"
        );
        report
    }
}
