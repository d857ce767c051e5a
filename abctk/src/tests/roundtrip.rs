//! コーパスの読み書きと精緻化の往復テスト

use crate::errors::Result;
use crate::io::{dump_psd, PsdLoader};
use crate::transform::elaborate_cat_annotations;

const CORPUS: &str = concat!(
    "(TOP (S#deriv=none (NP 太郎) (<NP\\S> 走る)) (ID 1_test_BUFFALO;TSOGD_1;JP))\n",
    "(TOP (S#deriv=none (PP 学校に) (<PP\\S> 行く)) (ID 1_test_BUFFALO;TSOGD_2;JP))\n",
    "(TOP (NP#deriv=conj (NP 女) (P や) (NP 男)) (ID 1_test_BUFFALO;TSOGD_3;JP))\n",
);

#[test]
fn test_load_elaborate_dump_reload() {
    let tmp = tempfile::tempdir().unwrap();
    let loader = PsdLoader::default();

    let mut pairs = loader.load_str(CORPUS, "corpus").unwrap();
    for (id, tree) in &mut pairs {
        elaborate_cat_annotations(tree, id);
    }
    // Valid derivations stay intact; no error feature appears.
    for (_, tree) in &pairs {
        assert!(!tree.pprint(Default::default()).contains("trace.elab.error"));
    }

    dump_psd(&mut pairs, tmp.path()).unwrap();
    let reloaded: Vec<_> = loader
        .iter_dir(tmp.path())
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(reloaded, pairs);
}

#[test]
fn test_blank_filled_labels_survive_the_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let loader = PsdLoader::default();

    // Elaboration fills the blank label with a parsed category; the
    // reloaded copy holds the same label as a raw token.
    let corpus = "(TOP (#deriv=none (NP 太郎) (<NP\\S> 走る)) (ID 1_blank_X_1))\n";
    let mut pairs = loader.load_str(corpus, "corpus").unwrap();
    for (id, tree) in &mut pairs {
        elaborate_cat_annotations(tree, id);
    }
    let label = pairs[0].1.label().unwrap();
    assert_eq!(label.cat.pprint(Default::default()), "S");
    assert_eq!(label.feats.get("trace.elab.error"), None);

    dump_psd(&mut pairs, tmp.path()).unwrap();
    let reloaded: Vec<_> = loader
        .iter_dir(tmp.path())
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(reloaded, pairs);
}

#[test]
fn test_added_features_survive_the_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let loader = PsdLoader::default();

    // A mislabeled root provokes a diagnostic feature.
    let corpus = "(TOP (NP#deriv=none (NP 太郎) (<NP\\S> 走る)) (ID 1_err_X_1))\n";
    let mut pairs = loader.load_str(corpus, "corpus").unwrap();
    for (id, tree) in &mut pairs {
        elaborate_cat_annotations(tree, id);
    }
    let label = pairs[0].1.label().unwrap();
    assert_eq!(label.feats.get("trace.elab.error"), Some("cat-discrepancy"));

    dump_psd(&mut pairs, tmp.path()).unwrap();
    let reloaded: Vec<_> = loader
        .iter_dir(tmp.path())
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(reloaded, pairs);
}
