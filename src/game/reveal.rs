//! Partial reveal sampling

use rand::Rng;

use super::{Reveal, CASE_COUNT, MISS_REVEALS};

/// Choose which cases to open as misses before the picked one resolves.
///
/// Draws uniformly from `0..CASE_COUNT`, rejecting the picked case and any
/// case that is already revealed or already drawn. At most `MISS_REVEALS`
/// indices are returned, never more than there are eligible cases, so the
/// loop always terminates.
pub fn sample_misses<R: Rng + ?Sized>(
    slots: &[Reveal; CASE_COUNT],
    selected: usize,
    rng: &mut R,
) -> Vec<usize> {
    let eligible = slots
        .iter()
        .enumerate()
        .filter(|&(i, slot)| i != selected && *slot == Reveal::Hidden)
        .count();
    let wanted = MISS_REVEALS.min(eligible);

    let mut picked = Vec::with_capacity(wanted);
    while picked.len() < wanted {
        let i = rng.gen_range(0..CASE_COUNT);
        if i == selected || slots[i] != Reveal::Hidden || picked.contains(&i) {
            continue;
        }
        picked.push(i);
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_never_picks_selected_or_repeats() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selected = (seed as usize) % CASE_COUNT;
            let mut misses = sample_misses(&[Reveal::Hidden; CASE_COUNT], selected, &mut rng);

            assert_eq!(misses.len(), MISS_REVEALS);
            assert!(!misses.contains(&selected));
            misses.sort();
            misses.dedup();
            assert_eq!(misses.len(), MISS_REVEALS, "seed {} drew a case twice", seed);
        }
    }

    #[test]
    fn test_skips_revealed_cases() {
        let mut rng = StdRng::seed_from_u64(7);
        let slots = [Reveal::Hidden, Reveal::Miss, Reveal::Hidden, Reveal::Hidden];
        let mut misses = sample_misses(&slots, 0, &mut rng);
        misses.sort();
        assert_eq!(misses, vec![2, 3]);
    }

    #[test]
    fn test_nothing_eligible() {
        let mut rng = StdRng::seed_from_u64(1);
        let slots = [Reveal::Hidden, Reveal::Miss, Reveal::Miss, Reveal::Miss];
        assert!(sample_misses(&slots, 0, &mut rng).is_empty());
    }
}
