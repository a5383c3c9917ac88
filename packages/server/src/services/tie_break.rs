use rand::seq::SliceRandom;
use rand::Rng;

/// How to choose among targets sharing the highest vote count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Uniformly random among the tied targets. Used for the werewolf vote.
    Random,
    /// The earliest target in tally order that reached the maximum. Used for
    /// the day vote.
    FirstSeen,
}

impl TieBreak {
    /// `tally` is (target, votes) in tally order. Returns `None` when no target
    /// has a positive count.
    pub fn select<R: Rng + ?Sized>(&self, tally: &[(String, usize)], rng: &mut R) -> Option<String> {
        let max = tally.iter().map(|(_, count)| *count).max().unwrap_or(0);
        if max == 0 {
            return None;
        }
        match self {
            TieBreak::Random => {
                let tied: Vec<&String> = tally
                    .iter()
                    .filter(|(_, count)| *count == max)
                    .map(|(target, _)| target)
                    .collect();
                tied.choose(rng).map(|target| (*target).clone())
            }
            TieBreak::FirstSeen => tally
                .iter()
                .find(|(_, count)| *count == max)
                .map(|(target, _)| target.clone()),
        }
    }
}

/// Counts votes per target, keeping targets in the order they first appear.
pub fn tally_in_order<'a>(targets: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut tally: Vec<(String, usize)> = Vec::new();
    for target in targets {
        match tally.iter_mut().find(|(t, _)| t == target) {
            Some((_, count)) => *count += 1,
            None => tally.push((target.to_string(), 1)),
        }
    }
    tally
}
