//! Exclusive and shared partitions of two or three DEG sets

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::degs::DegSet;
use crate::error::{DashboardError, Result};

type Genes = BTreeSet<String>;

/// Disjoint regions of a two- or three-way Venn diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlapPartition {
    Two {
        only_first: Genes,
        only_second: Genes,
        both: Genes,
    },
    Three {
        only_first: Genes,
        only_second: Genes,
        only_third: Genes,
        first_second: Genes,
        first_third: Genes,
        second_third: Genes,
        all: Genes,
    },
}

/// One region of the partition with the indices of the sets it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region<'a> {
    pub members: Vec<usize>,
    pub genes: &'a Genes,
}

impl OverlapPartition {
    /// Number of input sets (2 or 3)
    pub fn n_sets(&self) -> usize {
        match self {
            OverlapPartition::Two { .. } => 2,
            OverlapPartition::Three { .. } => 3,
        }
    }

    /// Regions in export order: exclusive regions, then pairwise, then the triple
    /// (two-way: only first, both, only second)
    pub fn regions(&self) -> Vec<Region<'_>> {
        match self {
            OverlapPartition::Two {
                only_first,
                only_second,
                both,
            } => vec![
                Region { members: vec![0], genes: only_first },
                Region { members: vec![0, 1], genes: both },
                Region { members: vec![1], genes: only_second },
            ],
            OverlapPartition::Three {
                only_first,
                only_second,
                only_third,
                first_second,
                first_third,
                second_third,
                all,
            } => vec![
                Region { members: vec![0], genes: only_first },
                Region { members: vec![1], genes: only_second },
                Region { members: vec![2], genes: only_third },
                Region { members: vec![0, 1], genes: first_second },
                Region { members: vec![0, 2], genes: first_third },
                Region { members: vec![1, 2], genes: second_third },
                Region { members: vec![0, 1, 2], genes: all },
            ],
        }
    }

    /// Human-readable category for a region, given the comparison names
    pub fn region_label(&self, region: &Region<'_>, names: &[String]) -> String {
        let name = |i: usize| names.get(i).map(String::as_str).unwrap_or("?");
        match (self.n_sets(), region.members.as_slice()) {
            (_, [i]) => format!("Only {}", name(*i)),
            (2, [i, j]) => format!("Overlap ({} & {})", name(*i), name(*j)),
            (_, [i, j]) => format!("Overlap {} & {}", name(*i), name(*j)),
            _ => "Overlap All Three".to_string(),
        }
    }

    /// Union of all regions
    pub fn union(&self) -> Genes {
        self.regions()
            .into_iter()
            .flat_map(|r| r.genes.iter().cloned())
            .collect()
    }
}

/// Partition two or three DEG sets into their Venn regions.
///
/// Rejects fewer than two or more than three sets, and any two sets that
/// came from the same file.
pub fn overlap(sets: &[DegSet]) -> Result<OverlapPartition> {
    if sets.len() < 2 {
        return Err(DashboardError::validation("Please select at least two comparisons"));
    }
    if sets.len() > 3 {
        return Err(DashboardError::validation(format!(
            "At most three comparisons can be overlapped, got {}",
            sets.len()
        )));
    }

    let distinct: HashSet<&str> = sets.iter().map(|s| s.source.as_str()).collect();
    if distinct.len() != sets.len() {
        let reason = if sets.len() == 2 {
            "Please select two different comparisons"
        } else {
            "Please select three different comparisons"
        };
        return Err(DashboardError::validation(reason));
    }

    let partition = match sets {
        [a, b] => {
            let (a, b) = (&a.genes, &b.genes);
            OverlapPartition::Two {
                only_first: a - b,
                only_second: b - a,
                both: a & b,
            }
        }
        [a, b, c] => {
            let (a, b, c) = (&a.genes, &b.genes, &c.genes);
            let ab = a & b;
            let ac = a & c;
            let bc = b & c;
            OverlapPartition::Three {
                only_first: &(a - b) - c,
                only_second: &(b - a) - c,
                only_third: &(c - a) - b,
                all: &ab & c,
                first_second: &ab - c,
                first_third: &ac - b,
                second_third: &bc - a,
            }
        }
        _ => unreachable!("set count validated above"),
    };

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(source: &str, genes: &[&str]) -> DegSet {
        DegSet::new(source, genes.iter().copied())
    }

    fn genes(items: &[&str]) -> Genes {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn assert_disjoint_cover(partition: &OverlapPartition, inputs: &[DegSet]) {
        let regions = partition.regions();
        for (i, a) in regions.iter().enumerate() {
            for b in regions.iter().skip(i + 1) {
                assert!(a.genes.is_disjoint(b.genes), "{:?} and {:?} overlap", a.members, b.members);
            }
        }
        let expected: Genes = inputs.iter().flat_map(|s| s.genes.iter().cloned()).collect();
        assert_eq!(partition.union(), expected);

        for region in &regions {
            for gene in region.genes {
                for (idx, input) in inputs.iter().enumerate() {
                    assert_eq!(input.genes.contains(gene), region.members.contains(&idx));
                }
            }
        }
    }

    #[test]
    fn test_two_way_scenario() {
        let inputs = vec![set("a", &["A", "B", "C"]), set("b", &["B", "C", "D"])];
        let partition = overlap(&inputs).unwrap();
        assert_eq!(
            partition,
            OverlapPartition::Two {
                only_first: genes(&["A"]),
                only_second: genes(&["D"]),
                both: genes(&["B", "C"]),
            }
        );
        assert_disjoint_cover(&partition, &inputs);
    }

    #[test]
    fn test_three_way_partitions() {
        let inputs = vec![
            set("a", &["g1", "g4", "g5", "g7"]),
            set("b", &["g2", "g4", "g6", "g7"]),
            set("c", &["g3", "g5", "g6", "g7", "g8"]),
        ];
        let partition = overlap(&inputs).unwrap();
        match &partition {
            OverlapPartition::Three {
                only_first,
                only_second,
                only_third,
                first_second,
                first_third,
                second_third,
                all,
            } => {
                assert_eq!(only_first, &genes(&["g1"]));
                assert_eq!(only_second, &genes(&["g2"]));
                assert_eq!(only_third, &genes(&["g3", "g8"]));
                assert_eq!(first_second, &genes(&["g4"]));
                assert_eq!(first_third, &genes(&["g5"]));
                assert_eq!(second_third, &genes(&["g6"]));
                let triple: Genes = inputs[0]
                    .genes
                    .iter()
                    .filter(|g| inputs[1].genes.contains(*g) && inputs[2].genes.contains(*g))
                    .cloned()
                    .collect();
                assert_eq!(all, &triple);
            }
            other => panic!("expected three-way partition, got {:?}", other),
        }
        assert_disjoint_cover(&partition, &inputs);
    }

    #[test]
    fn test_empty_sets() {
        let inputs = vec![set("a", &[]), set("b", &["x"]), set("c", &[])];
        let partition = overlap(&inputs).unwrap();
        assert_disjoint_cover(&partition, &inputs);
    }

    #[test]
    fn test_rejects_bad_counts_and_duplicates() {
        assert!(matches!(
            overlap(&[set("a", &["x"])]),
            Err(DashboardError::Validation { .. })
        ));
        let four: Vec<_> = ["a", "b", "c", "d"].iter().map(|s| set(s, &[])).collect();
        assert!(matches!(overlap(&four), Err(DashboardError::Validation { .. })));

        let err = overlap(&[set("a", &["x"]), set("a", &["y"])]).unwrap_err();
        assert_eq!(err.to_string(), "Please select two different comparisons");

        let err = overlap(&[set("a", &[]), set("b", &[]), set("a", &[])]).unwrap_err();
        assert_eq!(err.to_string(), "Please select three different comparisons");
    }

    #[test]
    fn test_region_labels() {
        let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let two = overlap(&[set("a", &[]), set("b", &[])]).unwrap();
        let labels: Vec<_> = two.regions().iter().map(|r| two.region_label(r, &names)).collect();
        assert_eq!(labels, vec!["Only A", "Overlap (A & B)", "Only B"]);

        let three = overlap(&[set("a", &[]), set("b", &[]), set("c", &[])]).unwrap();
        let labels: Vec<_> = three.regions().iter().map(|r| three.region_label(r, &names)).collect();
        assert_eq!(
            labels,
            vec![
                "Only A",
                "Only B",
                "Only C",
                "Overlap A & B",
                "Overlap A & C",
                "Overlap B & C",
                "Overlap All Three"
            ]
        );
    }
}
