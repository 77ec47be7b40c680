/// Redistribute `values` so their ordering follows the ordering of
/// `target_reference`.
///
/// The largest value goes to the position with the largest target
/// reference, the second largest to the next, and so on. Ties in the target
/// reference are broken by `source_reference` (larger first) and then by
/// position, which keeps a stat that was a strength before the swap ahead of
/// an equally weighted one. The multiset of values is preserved, so the sum
/// never changes.
///
/// All three slices must have the same length.
pub fn mapped_values(
    values: &[i64],
    source_reference: &[i64],
    target_reference: &[i64],
) -> Vec<i64> {
    debug_assert_eq!(values.len(), target_reference.len());
    debug_assert_eq!(values.len(), source_reference.len());

    let mut sorted_values = values.to_vec();
    sorted_values.sort_unstable_by(|a, b| b.cmp(a));

    let mut slots: Vec<usize> = (0..values.len()).collect();
    slots.sort_by(|&a, &b| {
        target_reference[b]
            .cmp(&target_reference[a])
            .then(source_reference[b].cmp(&source_reference[a]))
            .then(a.cmp(&b))
    });

    let mut mapped = vec![0; values.len()];
    for (slot, value) in slots.into_iter().zip(sorted_values) {
        mapped[slot] = value;
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_value_follows_highest_target_base() {
        // Effective STR, SKL, SPD, DEF, RES of a speedy unit moving to a
        // class whose strongest base is DEF.
        let values = [5, 9, 14, 4, 2];
        let source = [2, 4, 6, 1, 0];
        let target = [4, 2, 1, 9, 1];
        let mapped = mapped_values(&values, &source, &target);
        assert_eq!(mapped, vec![9, 5, 4, 14, 2]);
    }

    #[test]
    fn preserves_target_ordering_and_sum() {
        let values = [7, 3, 11, 6, 8];
        let source = [1, 1, 1, 1, 1];
        let target = [3, 0, 5, 5, 2];
        let mapped = mapped_values(&values, &source, &target);

        assert_eq!(mapped.iter().sum::<i64>(), values.iter().sum::<i64>());
        for i in 0..target.len() {
            for j in 0..target.len() {
                if target[i] > target[j] {
                    assert!(mapped[i] >= mapped[j], "{mapped:?}");
                }
            }
        }
    }

    #[test]
    fn ties_fall_back_to_source_emphasis() {
        let values = [10, 20];
        let source = [0, 5];
        let target = [3, 3];
        assert_eq!(mapped_values(&values, &source, &target), vec![10, 20]);
    }
}
