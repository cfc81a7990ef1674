use std::collections::BTreeMap;
use std::fmt;

/// A pair `(first, second)` of signals, each in `1..=num_sides`.
pub type SignalHistory = (usize, usize);

/// Maps every signal history to the canonical history of its class. The
/// canonical history of a class maps to itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalAbstraction {
    signal_names: Vec<String>,
    canonical: BTreeMap<SignalHistory, SignalHistory>,
}

impl SignalAbstraction {
    pub fn new(signal_names: Vec<String>) -> SignalAbstraction {
        SignalAbstraction {
            signal_names,
            canonical: BTreeMap::new(),
        }
    }

    /// Records that `member` is treated as `canonical`.
    pub fn add_abstraction(&mut self, canonical: SignalHistory, member: SignalHistory) {
        self.canonical.insert(member, canonical);
    }

    pub fn canonical(&self, history: SignalHistory) -> Option<SignalHistory> {
        self.canonical.get(&history).cloned()
    }

    /// `(canonical, member)` pairs ordered by member.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (SignalHistory, SignalHistory)> + 'a {
        self.canonical
            .iter()
            .map(|(&member, &canonical)| (canonical, member))
    }

    /// Members of every class keyed by the class's canonical history.
    pub fn classes(&self) -> BTreeMap<SignalHistory, Vec<SignalHistory>> {
        let mut classes = BTreeMap::<SignalHistory, Vec<SignalHistory>>::new();
        for (canonical, member) in self.iter() {
            classes.entry(canonical).or_insert_with(Vec::new).push(member);
        }
        classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes().len()
    }

    /// Number of histories covered by the abstraction.
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn signal_name(&self, signal: usize) -> &str {
        &self.signal_names[signal - 1]
    }

    pub fn history_name(&self, history: SignalHistory) -> String {
        format!("{}{}", self.signal_name(history.0), self.signal_name(history.1))
    }
}

impl fmt::Display for SignalAbstraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (canonical, members) in self.classes() {
            let names = members
                .iter()
                .map(|&member| self.history_name(member))
                .collect::<Vec<_>>();
            writeln!(f, "{} <- {}", self.history_name(canonical), names.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["1".to_string(), "2".to_string()]
    }

    #[test]
    fn classes_and_canonicals() {
        let mut abstraction = SignalAbstraction::new(names());
        abstraction.add_abstraction((1, 1), (1, 1));
        abstraction.add_abstraction((1, 2), (1, 2));
        abstraction.add_abstraction((1, 2), (2, 1));
        abstraction.add_abstraction((2, 2), (2, 2));

        assert_eq!(abstraction.len(), 4);
        assert_eq!(abstraction.num_classes(), 3);
        assert_eq!(abstraction.canonical((2, 1)), Some((1, 2)));
        assert_eq!(abstraction.canonical((3, 1)), None);
        assert_eq!(
            abstraction.iter().collect::<Vec<_>>(),
            vec![((1, 1), (1, 1)), ((1, 2), (1, 2)), ((1, 2), (2, 1)), ((2, 2), (2, 2))]
        );
        assert_eq!(format!("{}", abstraction), "11 <- 11\n12 <- 12 21\n22 <- 22\n");
    }
}
