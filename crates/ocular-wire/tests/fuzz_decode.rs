use bytes::Bytes;
use ocular_wire::{
    DisplayCaps, DisplayEntry, DisplayTableBuilder, DisplayTableSchema, Schema, SnapshotBuilder,
    TrackingSchema, Verified, SNAPSHOT_MAGIC, WIRE_VERSION,
};
use rand::{thread_rng, Rng};

#[test]
fn fuzz_snapshot_acquire_never_panics() {
    let mut rng = thread_rng();
    for _ in 0..10_000 {
        let len: usize = rng.gen_range(0..2048);
        let mut data = vec![0u8; len];
        rng.fill(&mut data[..]);
        let _ = Verified::<TrackingSchema>::acquire(|| Bytes::from(data.clone()));
    }
}

#[test]
fn fuzz_display_table_acquire_never_panics() {
    let mut rng = thread_rng();
    for _ in 0..10_000 {
        let len: usize = rng.gen_range(0..2048);
        let mut data = vec![0u8; len];
        rng.fill(&mut data[..]);
        let _ = Verified::<DisplayTableSchema>::acquire(|| Bytes::from(data.clone()));
    }
}

#[test]
fn random_mutation_of_valid_snapshot_is_handled() {
    let mut rng = thread_rng();
    let valid = SnapshotBuilder::new(42.0)
        .hmd(ocular_wire::HmdView {
            left_view: Some([1.0; 16]),
            right_view: Some([1.0; 16]),
            pose: Some(ocular_wire::Pose {
                position: Some([0.0, 1.7, 0.0]),
                orientation: Some([0.0, 0.0, 0.0, 1.0]),
                ..Default::default()
            }),
            ..Default::default()
        })
        .controller(ocular_wire::ControllerRecord {
            index: 0,
            connected: true,
            id: "pad".to_string(),
            mapping: "standard".to_string(),
            axes: vec![0.5, -0.5],
            ..Default::default()
        })
        .build()
        .to_vec();

    assert!(TrackingSchema::verify(&valid).is_ok());

    for _ in 0..1_000 {
        let mut mutated = valid.clone();
        let flip_count = rng.gen_range(1..6);
        for _ in 0..flip_count {
            let idx = rng.gen_range(0..mutated.len());
            mutated[idx] ^= rng.gen::<u8>();
        }
        let _ = TrackingSchema::verify(&mutated);
    }
}

#[test]
fn every_truncation_of_valid_snapshot_is_handled() {
    let valid = SnapshotBuilder::new(7.0)
        .hmd(ocular_wire::HmdView {
            left_view: Some([0.5; 16]),
            left_projection: Some([0.5; 16]),
            ..Default::default()
        })
        .build();

    for end in 0..valid.len() {
        assert!(TrackingSchema::verify(&valid[..end]).is_err());
    }
    assert!(TrackingSchema::verify(&valid).is_ok());
}

#[test]
fn magic_and_version_mutations_fail_with_matching_variant() {
    let valid = SnapshotBuilder::new(0.0).build().to_vec();

    let mut bad_magic = valid.clone();
    bad_magic[0] ^= 0xFF;
    assert!(matches!(
        TrackingSchema::verify(&bad_magic),
        Err(ocular_wire::WireError::InvalidMagic(_))
    ));
    assert_ne!(bad_magic[0], SNAPSHOT_MAGIC[0]);

    let mut bad_version = valid;
    bad_version[2..4].copy_from_slice(&(WIRE_VERSION + 9).to_le_bytes());
    assert!(matches!(
        TrackingSchema::verify(&bad_version),
        Err(ocular_wire::WireError::UnsupportedVersion(_))
    ));
}

/// `verify` and `view` are separate passes over the same layout; this
/// pins them to the same verdict on valid, truncated, mutated and
/// random input.
#[test]
fn verify_and_view_agree_on_any_input() {
    let mut rng = thread_rng();

    let snapshot = SnapshotBuilder::new(3.5)
        .hmd(ocular_wire::HmdView {
            left_view: Some([1.0; 16]),
            left_projection: Some([2.0; 16]),
            right_view: Some([3.0; 16]),
            pose: Some(ocular_wire::Pose {
                position: Some([0.0, 1.7, 0.0]),
                orientation: Some([0.0, 0.0, 0.0, 1.0]),
                angular_velocity: Some([0.1, 0.0, 0.0]),
                ..Default::default()
            }),
            ..Default::default()
        })
        .controller(ocular_wire::ControllerRecord {
            index: 1,
            connected: true,
            id: "pad".to_string(),
            mapping: "standard".to_string(),
            axes: vec![0.25, -0.75],
            ..Default::default()
        })
        .build()
        .to_vec();
    let table = DisplayTableBuilder::new()
        .display(DisplayEntry {
            handle: 4,
            caps: DisplayCaps::CAN_PRESENT,
            max_layers: 1,
            name: "Fuzz HMD".to_string(),
        })
        .build()
        .to_vec();

    for end in 0..=snapshot.len() {
        assert_agreement::<TrackingSchema>(&snapshot[..end]);
    }
    for end in 0..=table.len() {
        assert_agreement::<DisplayTableSchema>(&table[..end]);
    }

    for _ in 0..1_000 {
        let mut mutated = snapshot.clone();
        for _ in 0..rng.gen_range(1..6) {
            let idx = rng.gen_range(0..mutated.len());
            mutated[idx] ^= rng.gen::<u8>();
        }
        assert_agreement::<TrackingSchema>(&mutated);

        let mut mutated = table.clone();
        for _ in 0..rng.gen_range(1..4) {
            let idx = rng.gen_range(0..mutated.len());
            mutated[idx] ^= rng.gen::<u8>();
        }
        assert_agreement::<DisplayTableSchema>(&mutated);
    }

    for _ in 0..2_000 {
        let len: usize = rng.gen_range(0..512);
        let mut data = vec![0u8; len];
        rng.fill(&mut data[..]);
        assert_agreement::<TrackingSchema>(&data);
        assert_agreement::<DisplayTableSchema>(&data);
    }
}

fn assert_agreement<S: Schema>(bytes: &[u8]) {
    let checked = S::verify(bytes);
    let decoded = S::view(bytes).map(|_| ());
    match (&checked, &decoded) {
        (Ok(()), Ok(())) => {}
        (Err(a), Err(b)) => {
            assert_eq!(std::mem::discriminant(a), std::mem::discriminant(b));
        }
        _ => panic!("verify {checked:?} disagrees with view {decoded:?}"),
    }
}
