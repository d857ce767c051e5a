//! 書き換えパスを連鎖させる結合テスト

use crate::cat::ReprMode;
use crate::dataset::Instance;
use crate::io::PsdLoader;
use crate::jigg::project_jigg;
use crate::transform::{
    annotate_char_spans, binarize_conj_tree, collapse_unary_nodes, elaborate_cat_annotations,
    elim_empty_terminals, incorporate_all_comps, minimize_tree, restore_rel_trace,
    restore_unary_nodes, CompSpan,
};
use crate::transform::binconj::DEFAULT_COORDINATOR;
use crate::transform::norm::MinimizeOptions;

#[test]
fn test_full_normalization_chain() {
    let loader = PsdLoader::default();
    let corpus = "(TOP (S (NP *pro*) \
                  (<NP\\S> (NP#deriv=conj (NP 女) (P や) (NP 男)) (<NP\\<NP\\S>> 見た))) \
                  (ID 1_chain_X_1))";
    let mut pairs = loader.load_str(corpus, "corpus").unwrap();
    let (id, tree) = &mut pairs[0];

    elim_empty_terminals(tree, id);
    assert_eq!(
        tree.label().unwrap().feats.get("deriv"),
        Some("unary-elim-empty"),
    );

    *tree = binarize_conj_tree(tree, id, &DEFAULT_COORDINATOR).unwrap();
    let printed = tree.pprint(ReprMode::Tlcg);
    assert!(printed.contains("trace.binconj=root"));
    assert!(printed.contains("trace.binconj=conjunctor"));

    minimize_tree(tree, id, MinimizeOptions::default());
    assert!(!tree.pprint(ReprMode::Tlcg).contains("trace.binconj"));

    elaborate_cat_annotations(tree, id);
    // Blanked binary labels are recomputed from their children.
    assert!(!tree.pprint(ReprMode::Tlcg).contains("trace.elab.error"));
}

#[test]
fn test_unary_collapse_survives_rel_trace_restoration() {
    let loader = PsdLoader::default();
    let corpus = "(TOP (NP (<N/N>#deriv=unary-IPREL (<PP\\S> 書いた)) (N 本)) (ID 1_rel_X_1))";
    let mut pairs = loader.load_str(corpus, "corpus").unwrap();
    let (id, tree) = &mut pairs[0];

    restore_rel_trace(tree, id, false).unwrap();
    let restored = tree.pprint(ReprMode::Tlcg);
    assert!(restored.contains("(<Srel|PP>#rel=bind (Srel (PP *T*) (<PP\\S> 書いた)))"));

    let collapsed = collapse_unary_nodes(tree);
    assert_eq!(
        restore_unary_nodes(&collapsed).pprint(ReprMode::Tlcg),
        tree.pprint(ReprMode::Tlcg),
    );
}

#[test]
fn test_comparative_annotation_end_to_end() {
    let loader = PsdLoader::default();
    let corpus = "(TOP (S (NP 太郎) (<NP\\S> (PP より) (<PP\\<NP\\S>> 高い))) (ID 1_comp_X_1))";
    let mut pairs = loader.load_str(corpus, "corpus").unwrap();
    let (id, tree) = &mut pairs[0];

    annotate_char_spans(tree);
    let spans = vec![
        CompSpan::new(0, 6, "root"),
        CompSpan::new(2, 4, "prej"),
    ];
    incorporate_all_comps(&spans, tree, id);

    assert_eq!(tree.label().unwrap().feats.get("comp"), Some("1,root"));
    let pp = &tree.children()[1].children()[0];
    assert_eq!(pp.label().unwrap().feats.get("comp"), Some("1,prej"));
}

#[test]
fn test_exporters_agree_on_token_order() {
    let loader = PsdLoader::default();
    let corpus = "(TOP (S (NP 太郎) (<NP\\S> 走る)) (ID 1_exp_X_1))";
    let pairs = loader.load_str(corpus, "corpus").unwrap();
    let (id, tree) = &pairs[0];

    let sentence = project_jigg(tree, id, 0);
    let surfs: Vec<&str> = sentence.tokens.iter().map(|t| t.surf.as_str()).collect();
    assert_eq!(surfs, vec!["太郎", "走る"]);
    assert_eq!(sentence.abc_id, "1_exp_X_1");

    let (instance, _, binary) = Instance::from_tree(tree, id).unwrap();
    assert_eq!(instance.spellout(), "太郎 走る");
    assert_eq!(
        binary,
        vec![("NP".to_string(), "(S\\NP)".to_string())],
    );
}
