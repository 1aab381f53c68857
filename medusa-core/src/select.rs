//! Source discovery and selection

use std::path::{Path, PathBuf};

use medusa_format::SLOT_COUNT;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{MedusaError, Result};

/// Order in which candidate files fill the slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Sorted by path, first files win
    #[default]
    Alphabetical,
    /// Uniform sample without replacement
    Random,
}

/// Audio files in `dir`, filtered by extension (case-insensitive)
///
/// Hidden files (including `._*` resource forks) are skipped. The result is
/// unordered; ordering is the job of [`select_sources`].
pub fn collect_sources(dir: &Path, extensions: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| MedusaError::io(dir, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let wanted = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)));
        if wanted && !hidden {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("Found {} candidate files in {}", files.len(), dir.display());
    Ok(files)
}

/// Choose up to `cap` files (never more than a bank holds); the returned order is slot order
pub fn select_sources<R: Rng + ?Sized>(
    files: &[PathBuf],
    cap: usize,
    policy: SelectionPolicy,
    rng: &mut R,
) -> Vec<PathBuf> {
    let mut chosen = files.to_vec();
    match policy {
        SelectionPolicy::Alphabetical => chosen.sort(),
        SelectionPolicy::Random => chosen.shuffle(rng),
    }
    chosen.truncate(cap.min(SLOT_COUNT));
    chosen
}

/// [`select_sources`] with a seeded PCG when `seed` is set, the thread RNG otherwise
pub fn select_seeded(
    files: &[PathBuf],
    cap: usize,
    policy: SelectionPolicy,
    seed: Option<u64>,
) -> Vec<PathBuf> {
    match seed {
        Some(seed) => select_sources(files, cap, policy, &mut rand_pcg::Pcg64::seed_from_u64(seed)),
        None => select_sources(files, cap, policy, &mut rand::rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn names(count: usize) -> Vec<PathBuf> {
        // reverse order so sorting has work to do
        (0..count).rev().map(|i| PathBuf::from(format!("src_{i:03}.wav"))).collect()
    }

    #[test]
    fn test_alphabetical_sorts_and_caps() {
        let chosen = select_seeded(&names(70), 64, SelectionPolicy::Alphabetical, None);
        assert_eq!(chosen.len(), 64);
        assert_eq!(chosen[0], PathBuf::from("src_000.wav"));
        assert_eq!(chosen[63], PathBuf::from("src_063.wav"));
    }

    #[test]
    fn test_alphabetical_is_stable() {
        let files = names(10);
        let a = select_seeded(&files, 64, SelectionPolicy::Alphabetical, Some(1));
        let b = select_seeded(&files, 64, SelectionPolicy::Alphabetical, Some(2));
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
    }

    #[test]
    fn test_random_without_replacement() {
        let files = names(100);
        let chosen = select_seeded(&files, 64, SelectionPolicy::Random, None);
        assert_eq!(chosen.len(), 64);
        let unique: HashSet<_> = chosen.iter().collect();
        assert_eq!(unique.len(), 64);
        assert!(chosen.iter().all(|f| files.contains(f)));
    }

    #[test]
    fn test_random_seed_is_reproducible() {
        let files = names(100);
        let a = select_seeded(&files, 64, SelectionPolicy::Random, Some(42));
        let b = select_seeded(&files, 64, SelectionPolicy::Random, Some(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_fewer_than_cap() {
        let chosen = select_seeded(&names(5), 64, SelectionPolicy::Random, Some(3));
        assert_eq!(chosen.len(), 5);
    }

    #[test]
    fn test_collect_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.wav", "b.MP3", "c.txt", ".hidden.wav", "._d.wav"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/e.flac"), b"").unwrap();

        let extensions: Vec<String> = vec!["wav".into(), "mp3".into(), "flac".into()];

        let mut flat = collect_sources(dir.path(), &extensions, false).unwrap();
        flat.sort();
        assert_eq!(flat, vec![dir.path().join("a.wav"), dir.path().join("b.MP3")]);

        let deep = collect_sources(dir.path(), &extensions, true).unwrap();
        assert_eq!(deep.len(), 3);
    }
}
