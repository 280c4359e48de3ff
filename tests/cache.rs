use std::fs;

use county_report::cache::SummaryCache;
use county_report::config::{Config, SourceSpec};
use tempfile::TempDir;

#[test]
fn hits_on_unchanged_inputs_and_misses_after_edit() {
    let dir = TempDir::new().unwrap();
    let pop = dir.path().join("pop.csv");
    fs::write(&pop, "Judet,Pop\nCluj,100\n").unwrap();
    let config = Config {
        sources: vec![SourceSpec::new("pop", pop.clone())],
        ..Config::default()
    };

    let mut cache = SummaryCache::new();
    let first = cache.get_or_run(&config).unwrap().summary.clone();
    let again = cache.get_or_run(&config).unwrap().summary.clone();
    assert_eq!(first, again);
    assert_eq!(cache.stats(), (1, 1));
    assert_eq!(cache.len(), 1);

    fs::write(&pop, "Judet,Pop\nCluj,100\nIasi,90\n").unwrap();
    let edited = cache.get_or_run(&config).unwrap();
    assert_eq!(edited.summary.len(), 2);
    assert_eq!(cache.stats(), (1, 2));
    assert_eq!(cache.len(), 1);

    cache.invalidate();
    assert!(cache.is_empty());
}

#[test]
fn fingerprint_depends_on_config_and_content() {
    let dir = TempDir::new().unwrap();
    let pop = dir.path().join("pop.csv");
    fs::write(&pop, "Judet,Pop\nCluj,100\n").unwrap();
    let config = Config {
        sources: vec![SourceSpec::new("pop", pop.clone())],
        ..Config::default()
    };
    let a = SummaryCache::fingerprint(&config).unwrap();
    assert_eq!(a, SummaryCache::fingerprint(&config).unwrap());

    let mut other = config.clone();
    other.key_column = "County".into();
    assert_ne!(a, SummaryCache::fingerprint(&other).unwrap());

    fs::remove_file(&pop).unwrap();
    assert_ne!(a, SummaryCache::fingerprint(&config).unwrap());
}

#[test]
fn failed_runs_are_not_cached() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        sources: vec![SourceSpec::new("pop", dir.path().join("missing.csv"))],
        ..Config::default()
    };
    let mut cache = SummaryCache::new();
    assert!(cache.get_or_run(&config).is_err());
    assert!(cache.is_empty());
}

#[test]
fn edited_inputs_replace_the_stale_entry() {
    let dir = TempDir::new().unwrap();
    let pop = dir.path().join("pop.csv");
    let config = Config {
        sources: vec![SourceSpec::new("pop", pop.clone())],
        ..Config::default()
    };
    let mut other = config.clone();
    other.display_names.clear();

    let mut cache = SummaryCache::new();
    for n in 1..=5 {
        let rows: String = (0..n).map(|i| format!("J{i},{i}\n")).collect();
        fs::write(&pop, format!("Judet,Pop\n{rows}")).unwrap();
        assert_eq!(cache.get_or_run(&config).unwrap().summary.len(), n);
        cache.get_or_run(&other).unwrap();
    }
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats(), (0, 10));
}
