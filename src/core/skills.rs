use std::collections::BTreeMap;

/// Occurrence counts of one tag in each of two skill sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillDimension<'a> {
    pub tag: &'a str,
    pub left: u32,
    pub right: u32,
}

/// Paired count vectors over every distinct tag of two skill sequences.
///
/// Repeated tags raise the count for that tag, so this is a multiset
/// comparison rather than set overlap. Dimensions are ordered by tag, which
/// keeps any arithmetic over them independent of argument order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSpace<'a> {
    dimensions: Vec<SkillDimension<'a>>,
}

impl<'a> SkillSpace<'a> {
    /// Build the space; empty when either sequence is empty
    pub fn new(left: &'a [String], right: &'a [String]) -> Self {
        if left.is_empty() || right.is_empty() {
            return Self::default();
        }

        let mut counts: BTreeMap<&'a str, (u32, u32)> = BTreeMap::new();
        for tag in left {
            counts.entry(tag.as_str()).or_default().0 += 1;
        }
        for tag in right {
            counts.entry(tag.as_str()).or_default().1 += 1;
        }

        let dimensions = counts
            .into_iter()
            .map(|(tag, (left, right))| SkillDimension { tag, left, right })
            .collect();

        Self { dimensions }
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn dimensions(&self) -> &[SkillDimension<'a>] {
        &self.dimensions
    }
}

/// Number of entries in `candidate` whose tag also appears in `anchor`
#[inline]
pub fn overlap_count(candidate: &[String], anchor: &[String]) -> usize {
    candidate.iter().filter(|tag| anchor.contains(tag)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_counts_duplicates() {
        let a = tags(&["plumbing", "plumbing", "welding"]);
        let b = tags(&["welding", "tiling"]);
        let space = SkillSpace::new(&a, &b);

        assert_eq!(
            space.dimensions(),
            &[
                SkillDimension { tag: "plumbing", left: 2, right: 0 },
                SkillDimension { tag: "tiling", left: 0, right: 1 },
                SkillDimension { tag: "welding", left: 1, right: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_side_gives_empty_space() {
        let a = tags(&["plumbing"]);
        let empty: Vec<String> = vec![];
        assert!(SkillSpace::new(&a, &empty).is_empty());
        assert!(SkillSpace::new(&empty, &a).is_empty());
    }

    #[test]
    fn test_overlap_count_exact_match() {
        let provider = tags(&["plumbing", "pipe-fitting", "welding"]);
        let listing = tags(&["plumbing", "pipe-fitting"]);
        assert_eq!(overlap_count(&provider, &listing), 2);
        assert_eq!(overlap_count(&tags(&["Plumbing"]), &listing), 0);
    }
}
