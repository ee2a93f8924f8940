use crate::core::skills::SkillSpace;

/// Cosine similarity (0-1) between two skill sequences
///
/// Returns 0.0 when either sequence is empty or has a zero norm.
pub fn cosine_similarity(a: &[String], b: &[String]) -> f64 {
    cosine(&SkillSpace::new(a, b))
}

/// Cosine of the angle between the two count vectors of a space
pub fn cosine(space: &SkillSpace<'_>) -> f64 {
    if space.is_empty() {
        return 0.0;
    }

    let (dot, norm_left_sq, norm_right_sq) = space.dimensions().iter().fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, l, r), d| {
            let (left, right) = (d.left as f64, d.right as f64);
            (dot + left * right, l + left * left, r + right * right)
        },
    );

    if norm_left_sq == 0.0 || norm_right_sq == 0.0 {
        return 0.0;
    }

    // sqrt of the product keeps identical vectors at exactly 1.0
    (dot / (norm_left_sq * norm_right_sq).sqrt()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_is_one() {
        let a = tags(&["plumbing", "plumbing", "welding", "tiling"]);
        assert_eq!(cosine_similarity(&a, &a), 1.0);
    }

    #[test]
    fn test_disjoint_is_zero() {
        let a = tags(&["plumbing"]);
        let b = tags(&["carpentry", "roofing"]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_empty_is_zero() {
        let a = tags(&["plumbing"]);
        assert_eq!(cosine_similarity(&a, &[]), 0.0);
        assert_eq!(cosine_similarity(&[], &a), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let listing = tags(&["plumbing", "pipe-fitting"]);
        let provider = tags(&["plumbing", "pipe-fitting", "welding"]);
        let score = cosine_similarity(&listing, &provider);
        assert!((score - 0.8165).abs() < 0.001, "got {}", score);
    }

    #[test]
    fn test_duplicates_weight_vector() {
        let listing = tags(&["plumbing", "welding"]);
        let heavy = tags(&["plumbing", "plumbing", "plumbing", "welding"]);
        let balanced = tags(&["plumbing", "welding"]);
        assert!(cosine_similarity(&listing, &heavy) < cosine_similarity(&listing, &balanced));
    }

    #[test]
    fn test_symmetric() {
        let a = tags(&["electrical", "hvac", "hvac"]);
        let b = tags(&["hvac", "plumbing"]);
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }
}
