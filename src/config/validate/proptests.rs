//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use proptest::prelude::*;

fn arb_valid_spec() -> impl Strategy<Value = AcganSpec> {
    (
        1usize..256,  // batch_size
        1e-6f32..1.0, // lr
        1usize..100,  // epochs
        0.0f32..0.5,  // soft_zero
        0.5f32..1.0,  // soft_one
        0.0f32..0.9,  // dropout
    )
        .prop_map(|(batch_size, lr, epochs, soft_zero, soft_one, dropout)| {
            let mut spec = AcganSpec::default();
            spec.training.batch_size = batch_size;
            spec.training.epochs = epochs;
            spec.training.soft_zero = soft_zero;
            spec.training.soft_one = soft_one.max(soft_zero + 0.01);
            spec.optimizer.lr = lr;
            spec.model.dropout = dropout;
            spec
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_spec_passes(spec in arb_valid_spec()) {
        prop_assert!(validate_config(&spec).is_ok());
    }

    #[test]
    fn prop_zero_batch_size_fails(spec in arb_valid_spec()) {
        let mut spec = spec;
        spec.training.batch_size = 0;
        prop_assert!(matches!(
            validate_config(&spec),
            Err(ValidationError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn prop_negative_lr_fails(spec in arb_valid_spec(), lr in -10.0f32..=0.0) {
        let mut spec = spec;
        spec.optimizer.lr = lr;
        prop_assert!(matches!(
            validate_config(&spec),
            Err(ValidationError::InvalidLearningRate(_))
        ));
    }

    #[test]
    fn prop_nan_hyperparameter_fails(spec in arb_valid_spec(), field in 0usize..4) {
        let mut spec = spec;
        match field {
            0 => spec.optimizer.lr = f32::NAN,
            1 => spec.optimizer.epsilon = f32::NAN,
            2 => spec.model.leaky_slope = f32::NAN,
            _ => spec.training.real_class_weight = f32::NAN,
        }
        prop_assert!(validate_config(&spec).is_err());
    }

    #[test]
    fn prop_inverted_soft_labels_fail(spec in arb_valid_spec()) {
        let mut spec = spec;
        std::mem::swap(&mut spec.training.soft_zero, &mut spec.training.soft_one);
        let is_soft_label_error =
            matches!(validate_config(&spec), Err(ValidationError::InvalidSoftLabels { .. }));
        prop_assert!(is_soft_label_error);
    }

    #[test]
    fn prop_seed_size_changes_geometry(seed_size in 1usize..30) {
        let mut spec = AcganSpec::default();
        spec.model.seed_size = seed_size;
        let result = validate_config(&spec);
        if seed_size == 12 {
            prop_assert!(result.is_ok());
        } else {
            let is_geometry_mismatch = matches!(result, Err(ValidationError::GeometryMismatch { .. }));
            prop_assert!(is_geometry_mismatch);
        }
    }
}
