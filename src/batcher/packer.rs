//! Suite packing
//!
//! First-fit-decreasing bin packing of suites into batches. A suite is never
//! split: all of its functions land in the same batch.

use std::cmp::Reverse;
use tracing::{debug, info, warn};

use super::batched::{BatchedSuite, Bootstrap};
use super::ExecutableUnit;
use crate::models::{BatchSizePolicy, ConfigurationError, Suite, TestMethod};

/// Groups test suites into batches for a pool of worker processes
#[derive(Clone, Debug)]
pub struct Batcher {
    processes: usize,
    policy: BatchSizePolicy,
    bootstrap: Bootstrap,
}

impl Batcher {
    pub fn new(processes: usize, policy: BatchSizePolicy) -> Self {
        Self {
            processes,
            policy,
            bootstrap: Bootstrap::default(),
        }
    }

    /// Parse the batch-size token and build a batcher from it
    pub fn from_token(processes: usize, batch_size: &str) -> Result<Self, ConfigurationError> {
        Ok(Self::new(processes, batch_size.parse()?))
    }

    pub fn with_bootstrap(mut self, bootstrap: Bootstrap) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn processes(&self) -> usize {
        self.processes
    }

    pub fn policy(&self) -> BatchSizePolicy {
        self.policy
    }

    /// Target number of functions per batch, `None` when batching is disabled
    pub fn compute_batch_size(&self, total_functions: usize) -> Option<usize> {
        self.policy.target_size(total_functions)
    }

    /// Method-level batching. Not implemented: methods pass through unchanged.
    pub fn batch_methods(&self, methods: Vec<TestMethod>) -> Vec<ExecutableUnit> {
        methods.into_iter().map(ExecutableUnit::Method).collect()
    }

    /// Pack suites into batches.
    ///
    /// With batching disabled the suites come back unchanged and in order.
    /// Otherwise one `BatchedSuite` is returned per batch, in creation order.
    pub fn batch_suites(&self, suites: Vec<Suite>) -> Vec<ExecutableUnit> {
        let total_functions: usize = suites.iter().map(Suite::function_count).sum();

        let Some(target_size) = self.compute_batch_size(total_functions) else {
            debug!("Batching disabled, running {} suites standalone", suites.len());
            return suites.into_iter().map(ExecutableUnit::Suite).collect();
        };

        info!(
            "Packing {} suites ({} functions) into batches of ~{} for {} processes",
            suites.len(),
            total_functions,
            target_size,
            self.processes
        );

        let batches = pack(&suites, target_size);

        info!("Packed {} suites into {} batches", suites.len(), batches.len());

        batches
            .into_iter()
            .map(|batch| {
                let mut batched = BatchedSuite::with_bootstrap(self.bootstrap.clone());
                for suite in &batch.members {
                    batched.add_suite(suite);
                }
                ExecutableUnit::Batch(batched)
            })
            .collect()
    }
}

/// Group of suites under construction
#[derive(Debug)]
struct Batch<'a> {
    id: usize,
    members: Vec<&'a Suite>,
    function_count: usize,
}

impl<'a> Batch<'a> {
    fn new(id: usize, suite: &'a Suite) -> Self {
        Self {
            id,
            members: vec![suite],
            function_count: suite.function_count(),
        }
    }

    fn fits(&self, count: usize, target_size: usize) -> bool {
        self.function_count + count <= target_size
    }

    fn push(&mut self, suite: &'a Suite) {
        self.function_count += suite.function_count();
        self.members.push(suite);
    }
}

/// Place each suite, largest first, into the first batch with room for it
fn pack(suites: &[Suite], target_size: usize) -> Vec<Batch<'_>> {
    // Stable: equal-sized suites keep their input order
    let mut ordered: Vec<&Suite> = suites.iter().collect();
    ordered.sort_by_key(|suite| Reverse(suite.function_count()));

    let mut batches: Vec<Batch<'_>> = Vec::new();

    for suite in ordered {
        let count = suite.function_count();

        // Stop at the first fit so a suite lands in exactly one batch
        match batches.iter_mut().find(|b| b.fits(count, target_size)) {
            Some(batch) => {
                debug!("Adding {} to batch {}", suite, batch.id);
                batch.push(suite);
            }
            None => {
                if count > target_size {
                    warn!(
                        "{} exceeds the target batch size of {}; running it alone",
                        suite, target_size
                    );
                }
                let id = batches.len();
                debug!("Starting batch {} with {}", id, suite);
                batches.push(Batch::new(id, suite));
            }
        }
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExecutableTest;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn suite(class_name: &str, count: usize) -> Suite {
        Suite::new(
            format!("tests/{class_name}.php"),
            class_name,
            (0..count).map(|i| format!("test{i}")).collect(),
        )
    }

    fn batches(units: &[ExecutableUnit]) -> Vec<(Vec<String>, usize)> {
        units
            .iter()
            .map(|unit| match unit {
                ExecutableUnit::Batch(b) => (b.classes().to_vec(), b.function_count()),
                other => panic!("Expected batch, got {other:?}"),
            })
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fixed_size_example() {
        let batcher = Batcher::new(4, BatchSizePolicy::Fixed(10));
        let units = batcher.batch_suites(vec![
            suite("A", 10),
            suite("B", 8),
            suite("C", 5),
            suite("D", 3),
        ]);

        assert_eq!(
            batches(&units),
            vec![
                (names(&["A"]), 10),
                (names(&["B"]), 8),
                (names(&["C", "D"]), 8),
            ]
        );
    }

    #[test]
    fn test_packs_largest_first_regardless_of_input_order() {
        let batcher = Batcher::new(2, BatchSizePolicy::Fixed(10));
        let units = batcher.batch_suites(vec![
            suite("D", 3),
            suite("C", 5),
            suite("A", 10),
            suite("B", 8),
        ]);

        assert_eq!(
            batches(&units),
            vec![
                (names(&["A"]), 10),
                (names(&["B"]), 8),
                (names(&["C", "D"]), 8),
            ]
        );
    }

    #[test]
    fn test_suite_placed_in_exactly_one_batch() {
        // Both the first and second batch have room for C; it must only join the first
        let batcher = Batcher::new(2, BatchSizePolicy::Fixed(10));
        let units = batcher.batch_suites(vec![suite("A", 6), suite("B", 6), suite("C", 2)]);

        assert_eq!(
            batches(&units),
            vec![(names(&["A", "C"]), 8), (names(&["B"]), 6)]
        );
    }

    #[test]
    fn test_disabled_returns_input_unchanged() {
        let input = vec![suite("B", 1), suite("A", 9), suite("C", 4)];
        let batcher = Batcher::new(4, BatchSizePolicy::Disabled);
        let units = batcher.batch_suites(input.clone());

        let output: Vec<Suite> = units
            .into_iter()
            .map(|unit| match unit {
                ExecutableUnit::Suite(s) => s,
                other => panic!("Expected suite, got {other:?}"),
            })
            .collect();
        assert_eq!(output, input);
    }

    #[test]
    fn test_no_suites_no_batches() {
        for token in ["0", "10", "/4"] {
            let batcher = Batcher::from_token(4, token).unwrap();
            assert!(batcher.batch_suites(Vec::new()).is_empty());
        }
    }

    #[test]
    fn test_oversized_suite_gets_own_batch() {
        let batcher = Batcher::new(2, BatchSizePolicy::Fixed(5));
        let units = batcher.batch_suites(vec![suite("Big", 12), suite("Small", 2)]);

        assert_eq!(
            batches(&units),
            vec![(names(&["Big"]), 12), (names(&["Small"]), 2)]
        );
    }

    #[test]
    fn test_zero_target_isolates_every_suite() {
        let batcher = Batcher::new(2, BatchSizePolicy::Fixed(0));
        let units = batcher.batch_suites(vec![suite("A", 1), suite("B", 1), suite("C", 1)]);
        assert_eq!(units.len(), 3);
    }

    #[test]
    fn test_non_positive_tokens_give_one_batch_per_suite() {
        for token in ["-3", "0.0"] {
            let batcher = Batcher::from_token(2, token).unwrap();
            let units = batcher.batch_suites(vec![suite("A", 4), suite("B", 1), suite("C", 2)]);
            assert_eq!(
                batches(&units),
                vec![(names(&["A"]), 4), (names(&["C"]), 2), (names(&["B"]), 1)],
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_fraction_target() {
        let batcher = Batcher::from_token(4, "/4").unwrap();
        assert_eq!(batcher.compute_batch_size(17), Some(5));
    }

    #[test]
    fn test_fraction_even_split_stays_within_divisor() {
        let batcher = Batcher::from_token(4, "/4").unwrap();
        let suites: Vec<Suite> = (0..8).map(|i| suite(&format!("S{i}"), 2)).collect();
        let units = batcher.batch_suites(suites);
        assert!(units.len() <= 4, "got {} batches", units.len());
    }

    #[test]
    fn test_unsupported_token() {
        let err = Batcher::from_token(4, "abc").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnsupportedBatchSize("abc".to_string())
        );
    }

    #[test]
    fn test_batch_methods_is_pass_through() {
        let methods = suite("A", 3).methods();
        let units = Batcher::new(2, BatchSizePolicy::Fixed(10)).batch_methods(methods.clone());

        let output: Vec<TestMethod> = units
            .into_iter()
            .map(|unit| match unit {
                ExecutableUnit::Method(m) => m,
                other => panic!("Expected method, got {other:?}"),
            })
            .collect();
        assert_eq!(output, methods);
    }

    #[test]
    fn test_batches_use_configured_bootstrap() {
        let bootstrap = Bootstrap {
            path: "tests/Batch.php".to_string(),
            class_name: "Batch".to_string(),
            env_var: "CLASSES".to_string(),
        };
        let batcher = Batcher::new(2, BatchSizePolicy::Fixed(10)).with_bootstrap(bootstrap);
        let units = batcher.batch_suites(vec![suite("A", 1)]);
        assert_eq!(units[0].path(), "tests/Batch.php");
        assert_eq!(units[0].class_name(), "Batch");
    }

    fn arb_suites() -> impl Strategy<Value = Vec<Suite>> {
        prop::collection::vec(0usize..20, 0..24).prop_map(|counts| {
            counts
                .into_iter()
                .enumerate()
                .map(|(i, count)| {
                    Suite::new(
                        format!("tests/S{i}.php"),
                        format!("S{i}"),
                        (0..count).map(|f| format!("S{i}::test{f}")).collect(),
                    )
                })
                .collect()
        })
    }

    fn arb_policy() -> impl Strategy<Value = BatchSizePolicy> {
        prop_oneof![
            (0usize..40).prop_map(BatchSizePolicy::Fixed),
            (1usize..10).prop_map(|d| {
                BatchSizePolicy::Fraction(std::num::NonZeroUsize::new(d).unwrap())
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_functions_preserved(suites in arb_suites(), policy in arb_policy()) {
            let by_class: HashMap<String, Vec<String>> = suites
                .iter()
                .map(|s| (s.class_name().to_string(), s.functions().to_vec()))
                .collect();

            let units = Batcher::new(4, policy).batch_suites(suites.clone());

            let mut produced: Vec<String> = units
                .iter()
                .flat_map(|unit| match unit {
                    ExecutableUnit::Batch(b) => b.classes().to_vec(),
                    other => panic!("Expected batch, got {other:?}"),
                })
                .flat_map(|class| by_class[&class].clone())
                .collect();
            let mut expected: Vec<String> =
                suites.iter().flat_map(|s| s.functions().to_vec()).collect();

            produced.sort();
            expected.sort();
            prop_assert_eq!(produced, expected);
        }

        #[test]
        fn prop_disabled_is_identity(suites in arb_suites()) {
            let units = Batcher::new(4, BatchSizePolicy::Disabled).batch_suites(suites.clone());
            let output: Vec<Suite> = units
                .into_iter()
                .filter_map(|unit| match unit {
                    ExecutableUnit::Suite(s) => Some(s),
                    _ => None,
                })
                .collect();
            prop_assert_eq!(output, suites);
        }

        #[test]
        fn prop_batches_respect_target(suites in arb_suites(), policy in arb_policy()) {
            let total: usize = suites.iter().map(Suite::function_count).sum();
            let target = policy.target_size(total).unwrap();

            for unit in Batcher::new(4, policy).batch_suites(suites) {
                let ExecutableUnit::Batch(batch) = unit else {
                    panic!("Expected batch");
                };
                prop_assert!(
                    batch.function_count() <= target || batch.classes().len() == 1,
                    "batch {:?} holds {} functions, target {}",
                    batch.classes(),
                    batch.function_count(),
                    target
                );
            }
        }

        #[test]
        fn prop_fraction_even_split(d in 1usize..8, per_batch in 1usize..6) {
            // d * per_batch unit-sized suites split evenly into d batches
            let suites: Vec<Suite> = (0..d * per_batch)
                .map(|i| Suite::new(format!("tests/S{i}.php"), format!("S{i}"), vec!["t".to_string()]))
                .collect();
            let batcher = Batcher::new(d, BatchSizePolicy::Fraction(std::num::NonZeroUsize::new(d).unwrap()));
            prop_assert!(batcher.batch_suites(suites).len() <= d);
        }
    }
}
