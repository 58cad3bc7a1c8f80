//! Max-buildable computation over a BOM snapshot.

use serde::{Deserialize, Serialize};

use inventoryflow_core::ItemId;

use crate::bom::BomLine;

/// Per-entry breakdown of a feasibility calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartFeasibility {
    pub item_id: ItemId,
    pub name: String,
    pub stock: i64,
    pub required: i64,
    /// `floor(stock / required)`; 0 for non-qualifying entries.
    pub max_by_this_part: i64,
    pub qualifying: bool,
}

/// Result of [`calculate_feasibility`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feasibility {
    pub can_build: i64,
    /// One entry per input line, in input order.
    pub details: Vec<PartFeasibility>,
    /// Index into `details` of the bottleneck, if any entry qualifies.
    pub limiting_part: Option<usize>,
}

impl Feasibility {
    /// The bottleneck entry (first minimal `max_by_this_part` among qualifying entries).
    pub fn limiting(&self) -> Option<&PartFeasibility> {
        self.limiting_part.and_then(|idx| self.details.get(idx))
    }

    /// Whether at least one entry constrains the build.
    pub fn has_qualifying_entries(&self) -> bool {
        self.limiting_part.is_some()
    }
}

/// Compute how many complete units the snapshot can produce.
///
/// `can_build` is the minimum of `floor(stock / required)` over entries with
/// `required > 0`. With no such entry the answer is 0, not unbounded: a product
/// without a verifiable BOM is not buildable. Ties for the limiting part go to
/// the earliest entry.
pub fn calculate_feasibility(bom: &[BomLine]) -> Feasibility {
    let mut details = Vec::with_capacity(bom.len());
    let mut limiting: Option<(usize, i64)> = None;

    for (idx, line) in bom.iter().enumerate() {
        let max_units = line.max_units();
        if let Some(units) = max_units {
            // Strict comparison keeps the first occurrence on ties.
            if limiting.is_none_or(|(_, min)| units < min) {
                limiting = Some((idx, units));
            }
        }

        details.push(PartFeasibility {
            item_id: line.item_id,
            name: line.name.clone(),
            stock: line.stock,
            required: line.required,
            max_by_this_part: max_units.unwrap_or(0),
            qualifying: max_units.is_some(),
        });
    }

    Feasibility {
        can_build: limiting.map(|(_, units)| units).unwrap_or(0),
        details,
        limiting_part: limiting.map(|(idx, _)| idx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, stock: i64, required: i64) -> BomLine {
        BomLine::new(ItemId::new(), name, stock, required, 1)
    }

    #[test]
    fn minimum_ratio_limits_the_build() {
        let bom = vec![line("A", 10, 2), line("B", 9, 3)];
        let result = calculate_feasibility(&bom);

        assert_eq!(result.can_build, 3);
        assert_eq!(result.details[0].max_by_this_part, 5);
        assert_eq!(result.details[1].max_by_this_part, 3);
        assert_eq!(result.limiting().map(|p| p.name.as_str()), Some("B"));
    }

    #[test]
    fn zero_required_entries_do_not_qualify() {
        let bom = vec![line("A", 10, 0)];
        let result = calculate_feasibility(&bom);

        assert_eq!(result.can_build, 0);
        assert_eq!(result.details.len(), 1);
        assert!(!result.details[0].qualifying);
        assert_eq!(result.details[0].max_by_this_part, 0);
        assert!(result.limiting().is_none());
    }

    #[test]
    fn non_qualifying_entries_never_limit() {
        // B has no stock but is not required, so A alone decides.
        let bom = vec![line("A", 7, 2), line("B", 0, 0)];
        let result = calculate_feasibility(&bom);

        assert_eq!(result.can_build, 3);
        assert_eq!(result.limiting_part, Some(0));
    }

    #[test]
    fn empty_bom_builds_nothing() {
        let result = calculate_feasibility(&[]);
        assert_eq!(result.can_build, 0);
        assert!(result.details.is_empty());
        assert!(!result.has_qualifying_entries());
    }

    #[test]
    fn ties_resolve_to_first_entry() {
        let bom = vec![line("A", 4, 1), line("B", 8, 2), line("C", 12, 3)];
        let result = calculate_feasibility(&bom);

        assert_eq!(result.can_build, 4);
        assert_eq!(result.limiting_part, Some(0));
    }

    #[test]
    fn division_rounds_down() {
        let bom = vec![line("A", 7, 3)];
        assert_eq!(calculate_feasibility(&bom).can_build, 2);
    }

    #[test]
    fn negative_stock_counts_as_empty() {
        let bom = vec![line("A", -5, 1), line("B", 10, 1)];
        let result = calculate_feasibility(&bom);
        assert_eq!(result.can_build, 0);
        assert_eq!(result.details[0].max_by_this_part, 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_bom() -> impl Strategy<Value = Vec<BomLine>> {
            prop::collection::vec((0i64..1_000, -2i64..20), 0..12).prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (stock, required))| line(&format!("part-{i}"), stock, required))
                    .collect()
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: can_build is the min of floor(stock/required) over qualifying entries, else 0.
            #[test]
            fn can_build_is_min_ratio(bom in arb_bom()) {
                let result = calculate_feasibility(&bom);

                let expected = bom
                    .iter()
                    .filter(|l| l.required > 0)
                    .map(|l| l.stock / l.required)
                    .min()
                    .unwrap_or(0);

                prop_assert_eq!(result.can_build, expected);
                prop_assert!(result.can_build >= 0);
                prop_assert_eq!(result.details.len(), bom.len());
            }

            /// Property: the limiting part is the first qualifying entry hitting the minimum.
            #[test]
            fn limiting_part_is_first_minimum(bom in arb_bom()) {
                let result = calculate_feasibility(&bom);

                let expected = bom
                    .iter()
                    .position(|l| l.required > 0 && l.stock / l.required == result.can_build);

                prop_assert_eq!(result.limiting_part, expected);
            }

            /// Property: the calculation is a pure function of its input.
            #[test]
            fn calculation_is_idempotent(bom in arb_bom()) {
                let first = calculate_feasibility(&bom);
                let second = calculate_feasibility(&bom);
                prop_assert_eq!(first, second);
            }
        }
    }
}
