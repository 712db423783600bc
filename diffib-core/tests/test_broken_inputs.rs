//! Invalid configurations and states must be rejected, not simulated

use diffib_core::tests::test_helpers::{
    cube_field, fill_velocity, single_body_engine, unit_geometry,
};
use diffib_core::{
    EulerField, ForcingParams, Geometry, IbConfig, IbError, ImmersedBoundary, RigidBody,
};
use glam::{DVec3, IVec3};

fn engine() -> ImmersedBoundary {
    ImmersedBoundary::new(IbConfig::default(), unit_geometry()).unwrap()
}

#[test]
fn test_matched_density_rejected_at_seeding() {
    let mut ib = engine();
    let err = ib.init_bodies(&[12.0], &[12.0], &[12.0], 4.0, 1.0);
    assert!(matches!(err, Err(IbError::Config { .. })));
    assert!(ib.bodies().is_empty());
}

#[test]
fn test_matched_density_rejected_on_restore() {
    let donor = single_body_engine(IbConfig::default(), DVec3::splat(12.0), 4.0, 2.0);
    let mut records = donor.records();
    records[0].density = 1.0;

    let mut ib = single_body_engine(IbConfig::default(), DVec3::splat(10.0), 4.0, 2.0);
    assert!(ib.restore(&records).is_err());
    // failed restore leaves the previous bodies in place
    assert_eq!(ib.center(0), Some(DVec3::splat(10.0)));
}

#[test]
fn test_mismatched_seed_lengths() {
    let mut ib = engine();
    assert!(ib
        .init_bodies(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], &[1.0], 4.0, 2.0)
        .is_err());
}

#[test]
fn test_radius_below_one_cell() {
    let mut ib = engine();
    let err = ib.init_bodies(&[12.0], &[12.0], &[12.0], 0.5, 2.0).unwrap_err();
    assert!(matches!(err, IbError::Degenerate { .. }), "{err}");
    assert!(RigidBody::new(DVec3::ZERO, 1.0, 2.0, 1.0).is_ok());
}

#[test]
fn test_zero_spacing_rejected() {
    assert!(Geometry::new(DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0)).is_err());
    let bad = Geometry {
        dx: DVec3::new(f64::NAN, 1.0, 1.0),
        ..unit_geometry()
    };
    assert!(ImmersedBoundary::new(IbConfig::default(), bad).is_err());
}

#[test]
fn test_relaxation_out_of_range() {
    let config = IbConfig {
        forcing: ForcingParams {
            relaxation: 1.5,
            ..ForcingParams::default()
        },
        ..IbConfig::default()
    };
    assert!(ImmersedBoundary::new(config, unit_geometry()).is_err());
}

#[test]
fn test_zero_sub_iterations_on_advance() {
    let mut ib = single_body_engine(IbConfig::default(), DVec3::splat(12.0), 4.0, 2.0);
    let mut field = cube_field(24);
    let params = ForcingParams {
        sub_iterations: 0,
        ..ForcingParams::default()
    };
    assert!(matches!(
        ib.advance_with(&mut field, 0.1, &params),
        Err(IbError::Config { .. })
    ));
}

#[test]
fn test_field_without_force_block() {
    let mut ib = single_body_engine(IbConfig::default(), DVec3::splat(12.0), 4.0, 2.0);
    let mut field = EulerField::new(IVec3::ZERO, IVec3::splat(23), 2, 3).unwrap();
    assert!(ib.advance(&mut field, 0.1).is_err());
    // nothing moved
    assert_eq!(ib.center(0), Some(DVec3::splat(12.0)));
}

#[test]
fn test_negative_dt_rejected() {
    let mut ib = single_body_engine(IbConfig::default(), DVec3::splat(12.0), 4.0, 2.0);
    let mut field = cube_field(24);
    assert!(ib.advance(&mut field, -0.1).is_err());
    assert!(ib.advance(&mut field, f64::NAN).is_err());
}

#[test]
fn test_corrupt_record_rejected() {
    let ib = single_body_engine(IbConfig::default(), DVec3::splat(12.0), 4.0, 2.0);
    let mut records = ib.records();
    records[0].marker_count = 1;
    let mut target = engine();
    assert!(target.restore(&records).is_err());
}

#[test]
fn test_malformed_config_json() {
    let err = serde_json::from_str::<IbConfig>(r#"{"forcing": {"kernel": "five_point"}}"#);
    assert!(err.is_err());
}

#[test]
fn test_failed_advance_keeps_body_state() {
    let mut ib = single_body_engine(IbConfig::default(), DVec3::splat(12.0), 4.0, 2.0);
    let mut field = cube_field(24);
    fill_velocity(&mut field, 0, DVec3::X);
    ib.advance(&mut field, 0.05).unwrap();
    let settled = ib.body(0).unwrap().clone();
    assert!(settled.markers.force.iter().any(|f| f.x != 0.0));

    let mut small = cube_field(14);
    fill_velocity(&mut small, 0, DVec3::X);
    let untouched = small.clone();
    let err = ib.advance(&mut small, 0.05).unwrap_err();
    assert!(matches!(err, IbError::StencilOutOfBounds { body: 0, .. }), "{err}");

    let body = ib.body(0).unwrap();
    assert_eq!(body.center, settled.center);
    assert_eq!(body.velocity, settled.velocity);
    assert_eq!(body.omega, settled.omega);
    assert_eq!(body.varphi, settled.varphi);
    assert_eq!(body.markers, settled.markers);
    assert_eq!(small, untouched);

    // the retry on the full field integrates from the retained forces
    let mut reference = single_body_engine(IbConfig::default(), DVec3::splat(12.0), 4.0, 2.0);
    let mut ref_field = cube_field(24);
    fill_velocity(&mut ref_field, 0, DVec3::X);
    reference.advance(&mut ref_field, 0.05).unwrap();
    reference.advance(&mut ref_field, 0.05).unwrap();
    ib.advance(&mut field, 0.05).unwrap();
    let (a, b) = (ib.velocity(0).unwrap(), reference.velocity(0).unwrap());
    assert!((a - b).length() < 1e-9, "{a:?} vs {b:?}");
}

#[test]
fn test_non_finite_record_rejected() {
    let ib = single_body_engine(IbConfig::default(), DVec3::splat(12.0), 4.0, 2.0);
    for corrupt in 0..4 {
        let mut records = ib.records();
        match corrupt {
            0 => records[0].center.y = f64::NAN,
            1 => records[0].velocity.x = f64::INFINITY,
            2 => records[0].omega.z = f64::NAN,
            _ => records[0].varphi.x = f64::NEG_INFINITY,
        }
        let mut target = engine();
        assert!(target.restore(&records).is_err(), "case {corrupt}");
        assert!(target.bodies().is_empty());
    }
}
