use ahash::AHashSet;

/// Size of the intersection of two attribute sets.
///
/// Walks the smaller set and probes the larger, so the cost is
/// O(min(|a|, |b|)) hash lookups.
#[inline]
pub fn shared_attribute_count(a: &AHashSet<String>, b: &AHashSet<String>) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|token| large.contains(token.as_str())).count()
}
