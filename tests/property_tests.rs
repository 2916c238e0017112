use img_variant::{
    aspect_ratio_fit, gcd, ratio_label, resolve, InputSpec, OperationSpec, ResizeRequest,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn fit_never_exceeds_bounds(
        src_w in 1u32..=8000u32,
        src_h in 1u32..=8000u32,
        max_w in 1u32..=8000u32,
        max_h in 1u32..=8000u32,
    ) {
        let fit = aspect_ratio_fit(src_w, src_h, Some(max_w), Some(max_h)).unwrap();
        prop_assert!(fit.width <= max_w);
        prop_assert!(fit.height <= max_h);
    }

    #[test]
    fn fit_preserves_aspect_ratio_within_floor_rounding(
        src_w in 1u32..=8000u32,
        src_h in 1u32..=8000u32,
        max_w in 1u32..=8000u32,
        max_h in 1u32..=8000u32,
    ) {
        let fit = aspect_ratio_fit(src_w, src_h, Some(max_w), Some(max_h)).unwrap();
        // Both dimensions come from the same ratio, so un-flooring them
        // must land within one pixel of the exact scaled value.
        let exact_w = src_w as f64 * fit.ratio;
        let exact_h = src_h as f64 * fit.ratio;
        prop_assert!((fit.width as f64 - exact_w).abs() < 1.0);
        prop_assert!((fit.height as f64 - exact_h).abs() < 1.0);
    }

    #[test]
    fn fit_without_bounds_is_identity(
        src_w in 1u32..=8000u32,
        src_h in 1u32..=8000u32,
    ) {
        let fit = aspect_ratio_fit(src_w, src_h, None, None).unwrap();
        prop_assert_eq!(fit.width, src_w);
        prop_assert_eq!(fit.height, src_h);
        prop_assert_eq!(fit.ratio, 1.0);
    }

    #[test]
    fn fit_is_idempotent(
        src_w in 1u32..=8000u32,
        src_h in 1u32..=8000u32,
        max_w in prop::option::weighted(0.7, 1u32..=8000u32),
        max_h in prop::option::weighted(0.7, 1u32..=8000u32),
    ) {
        let a = aspect_ratio_fit(src_w, src_h, max_w, max_h).unwrap();
        let b = aspect_ratio_fit(src_w, src_h, max_w, max_h).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn gcd_divides_both_operands(a in 1u32..=100_000u32, b in 1u32..=100_000u32) {
        let d = gcd(a, b);
        prop_assert!(d > 0);
        prop_assert_eq!(a % d, 0);
        prop_assert_eq!(b % d, 0);
    }

    #[test]
    fn ratio_label_terms_are_coprime(w in 1u32..=10_000u32, h in 1u32..=10_000u32) {
        let label = ratio_label(w, h);
        let (lw, lh) = label.split_once(':').unwrap();
        let lw: u32 = lw.parse().unwrap();
        let lh: u32 = lh.parse().unwrap();
        prop_assert_eq!(gcd(lw, lh), 1);
    }

    #[test]
    fn resolve_prefers_most_specific_layer(
        op in prop::option::weighted(0.5, 0u8..=100u8),
        request in prop::option::weighted(0.5, 0u8..=100u8),
        default in 0u8..=100u8,
    ) {
        let resolved = resolve(op.as_ref(), request.as_ref(), default);
        match (op, request) {
            (Some(o), _) => prop_assert_eq!(resolved, o),
            (None, Some(r)) => prop_assert_eq!(resolved, r),
            (None, None) => prop_assert_eq!(resolved, default),
        }
    }

    #[test]
    fn quality_validation_matches_range(quality in 0u8..=255u8) {
        let req = ResizeRequest {
            input: InputSpec { key: "a.jpg".to_string() },
            output: None,
            operations: vec![OperationSpec {
                quality: Some(quality),
                ..Default::default()
            }],
        };
        if quality <= 100 {
            prop_assert!(req.validate().is_ok());
        } else {
            prop_assert!(req.validate().is_err());
        }
    }
}
