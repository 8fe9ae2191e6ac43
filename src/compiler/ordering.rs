use ahash::AHashMap;
use std::collections::BTreeSet;

/// Dependency graph between calculated fields, indexed by calculation position.
pub(super) struct DependencyGraph {
    /// `edges[i]` holds the calculations that calculation `i` reads.
    edges: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    pub(super) fn new(names: &[&str], dependencies: &[&BTreeSet<String>]) -> Self {
        let positions: AHashMap<&str, usize> =
            names.iter().enumerate().map(|(i, name)| (*name, i)).collect();
        let edges = dependencies
            .iter()
            .map(|deps| {
                deps.iter()
                    .filter_map(|name| positions.get(name.as_str()).copied())
                    .collect()
            })
            .collect();
        Self { edges }
    }

    /// A stable topological order: among the calculations whose inputs are all
    /// computed, the earliest declared goes first. When none is ready, the
    /// earliest member of a cycle that waits on nothing outside itself is
    /// forced and reads seed values for the inputs that are not computed yet.
    /// Calculations that only read from a cycle still run after it.
    pub(super) fn evaluation_order(&self) -> Vec<usize> {
        let count = self.edges.len();
        let mut emitted = vec![false; count];
        let mut order = Vec::with_capacity(count);

        while order.len() < count {
            let ready = (0..count)
                .find(|&i| !emitted[i] && self.edges[i].iter().all(|&dep| emitted[dep]));
            let next = match ready {
                Some(i) => i,
                None => {
                    let Some(forced) = self
                        .closed_cycle_member(&emitted)
                        .or_else(|| (0..count).find(|&i| !emitted[i]))
                    else {
                        break;
                    };
                    log::debug!("Forcing calculation #{} to break a dependency cycle", forced);
                    forced
                }
            };
            emitted[next] = true;
            order.push(next);
        }
        order
    }

    /// Every calculation reachable from `start` by following dependencies.
    pub(super) fn reachable_from(&self, start: usize) -> BTreeSet<usize> {
        self.reachable_within(start, &vec![false; self.edges.len()])
    }

    /// Like [`Self::reachable_from`], but never steps onto emitted calculations.
    fn reachable_within(&self, start: usize, emitted: &[bool]) -> BTreeSet<usize> {
        let pending = |node: &usize| !emitted[*node];
        let mut seen = BTreeSet::new();
        let mut stack: Vec<usize> = self.edges[start].iter().copied().filter(pending).collect();
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend(self.edges[node].iter().copied().filter(pending));
            }
        }
        seen
    }

    /// The earliest pending calculation on a cycle whose pending inputs all
    /// lead back to it. Forcing it never runs a dependent of the cycle early.
    fn closed_cycle_member(&self, emitted: &[bool]) -> Option<usize> {
        (0..self.edges.len()).filter(|&i| !emitted[i]).find(|&i| {
            let reach = self.reachable_within(i, emitted);
            reach.contains(&i)
                && reach
                    .iter()
                    .all(|&j| self.reachable_within(j, emitted).contains(&i))
        })
    }

    /// Calculations that depend on themselves, directly or through others.
    pub(super) fn cycle_members(&self) -> Vec<usize> {
        (0..self.edges.len())
            .filter(|&i| self.reachable_from(i).contains(&i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(spec: &[(&str, &[&str])]) -> DependencyGraph {
        let names: Vec<&str> = spec.iter().map(|(name, _)| *name).collect();
        let deps: Vec<BTreeSet<String>> = spec
            .iter()
            .map(|(_, deps)| deps.iter().map(|d| d.to_string()).collect())
            .collect();
        let dep_refs: Vec<&BTreeSet<String>> = deps.iter().collect();
        DependencyGraph::new(&names, &dep_refs)
    }

    #[test]
    fn test_order_follows_dependencies() {
        // total reads subtotal, which reads tax; declared in reverse.
        let g = graph(&[
            ("total", &["subtotal", "shipping"]),
            ("subtotal", &["tax", "price"]),
            ("tax", &["price"]),
        ]);
        assert_eq!(g.evaluation_order(), vec![2, 1, 0]);
        assert!(g.cycle_members().is_empty());
    }

    #[test]
    fn test_cycle_is_forced_deterministically() {
        let g = graph(&[("a", &["b"]), ("b", &["a"]), ("c", &["a"]), ("d", &[])]);
        assert_eq!(g.evaluation_order(), vec![3, 0, 1, 2]);
        assert_eq!(g.cycle_members(), vec![0, 1]);
    }

    #[test]
    fn test_dependents_of_a_cycle_wait_for_it() {
        // c only reads the a/b cycle, so it must not be the forced one.
        let g = graph(&[("c", &["a"]), ("a", &["b", "x"]), ("b", &["a"])]);
        assert_eq!(g.evaluation_order(), vec![1, 2, 0]);
        assert_eq!(g.cycle_members(), vec![1, 2]);
    }

    #[test]
    fn test_upstream_cycle_is_forced_first() {
        // p and q form a cycle that also reads the u/v cycle.
        let g = graph(&[
            ("p", &["q", "u"]),
            ("q", &["p"]),
            ("u", &["v"]),
            ("v", &["u"]),
        ]);
        assert_eq!(g.evaluation_order(), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let g = graph(&[("a", &["a"])]);
        assert_eq!(g.evaluation_order(), vec![0]);
        assert_eq!(g.cycle_members(), vec![0]);
    }
}
