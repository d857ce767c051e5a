//! ラベルの最小化と精緻化
//!
//! 最小化は、子カテゴリからの簡約で復元できるノードラベルを
//! 空文字列に落とし、`trace.*`素性などを剥ぎ取ります。
//! 精緻化はその逆向きの検査で、空ラベルを簡約結果で補い、
//! 既存ラベルとの食い違いを`trace.elab.*`素性として記録します。
//! あわせて文字スパン付与と素性の一括削除もここに置かれます。

use hashbrown::HashSet;

use crate::annot::AnnotCat;
use crate::cat::simplify::simplify_exh;
use crate::cat::{AbcCat, FunctorMode};
use crate::id::RecordId;
use crate::tree::{is_empty_terminal, Tree};

/// 最小化の調整項目
#[derive(Clone, Copy, Debug)]
pub struct MinimizeOptions {
    /// `trace.*`と`role`素性を剥ぎ取るかどうか
    pub discard_trace: bool,

    /// ラベルを落とす前に簡約で復元できることを確認するかどうか
    pub reduction_check: bool,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            discard_trace: true,
            reduction_check: true,
        }
    }
}

/// 木のラベルを最小化します
///
/// 2分岐かつ`deriv`が空か`none`のノードについて、子カテゴリの簡約が
/// 成功する場合に限りカテゴリを空文字列に落とします。
/// `reduction_check`が偽のときは確認なしで落とします。
pub fn minimize_tree(tree: &mut Tree, id: &RecordId, options: MinimizeOptions) {
    minimize_walk(tree, id, options);
}

/// 再帰本体。戻り値は最小化前の自ノードのカテゴリです。
fn minimize_walk(tree: &mut Tree, id: &RecordId, options: MinimizeOptions) -> Option<AbcCat> {
    let (label, children) = match tree {
        Tree::Leaf(_) => return None,
        Tree::Node { label, children } => (label, children),
    };

    let children_cats: Vec<Option<AbcCat>> = children
        .iter_mut()
        .map(|child| minimize_walk(child, id, options))
        .collect();

    let original_cat = label.to_cat();
    let deriv_is_plain = matches!(label.feats.get_or("deriv", ""), "" | "none");

    let blank = if options.reduction_check {
        children_cats.len() == 2
            && deriv_is_plain
            && match (&children_cats[0], &children_cats[1]) {
                (Some(c1), Some(c2)) => !simplify_exh(c1, c2).is_empty(),
                _ => false,
            }
    } else {
        deriv_is_plain
    };

    if blank {
        label.cat = AnnotCat::Raw(String::new());
    }
    if options.discard_trace {
        label
            .feats
            .retain(|key, _| !key.starts_with("trace.") && key != "role");
    }

    original_cat
}

/// 木のラベルを精緻化します
///
/// 2分岐かつ`deriv`が`none`のノードについて子カテゴリの簡約を計算し、
/// 空ラベルを結果で補完するか、既存ラベルと突き合わせます。
/// 有効な派生の非空ラベルは変更されず、診断素性だけが追加されます。
pub fn elaborate_cat_annotations(tree: &mut Tree, id: &RecordId) {
    elaborate_walk(tree, id);
}

fn elaborate_walk(tree: &mut Tree, id: &RecordId) -> Option<AbcCat> {
    let (label, children) = match tree {
        Tree::Leaf(_) => return None,
        Tree::Node { label, children } => (label, children),
    };

    if label.cat.pprint(Default::default()) == "COMMENT" {
        return None;
    }

    let children_cats: Vec<AbcCat> = children
        .iter_mut()
        .filter_map(|child| elaborate_walk(child, id))
        .collect();

    let deriv_is_plain = label.feats.get_or("deriv", "none") == "none";

    if children_cats.len() == 2 && deriv_is_plain {
        let results = simplify_exh(&children_cats[0], &children_cats[1]);
        match results.first() {
            Some((cat_simp, elim)) => {
                if label.cat.is_blank() {
                    label.cat = AnnotCat::Parsed(cat_simp.clone());
                    label.feats.insert("trace.elab.res-deriv", elim.to_string());
                } else if label.to_cat().as_ref() == Some(cat_simp) {
                    // The recorded category agrees with the computed one.
                } else {
                    label.feats.insert("trace.elab.error", "cat-discrepancy");
                    label
                        .feats
                        .insert("trace.elab.res", cat_simp.pprint(Default::default()));
                    label.feats.insert("trace.elab.res-deriv", elim.to_string());
                }
            }
            None => {
                if label.cat.is_blank() {
                    label.cat = AnnotCat::Parsed(AbcCat::Bot);
                    log::warn!("simplification failure left a ⊥ label in {id}");
                }
                label.feats.insert("trace.elab.error", "failed-simp");
            }
        }
    } else if children_cats.len() == 1 && deriv_is_plain {
        if let Some(self_cat) = label.to_cat() {
            let deriv = match &self_cat {
                AbcCat::Functor {
                    mode: FunctorMode::Vert,
                    conseq,
                    ..
                } if **conseq == children_cats[0] => {
                    // A vertical introduction; look for a binder index.
                    let comp: Vec<&str> =
                        label.feats.get_or("comp", "").split(',').collect();
                    let index = if comp.contains(&"bind") && comp.len() >= 2 {
                        format!("{}{}", comp[1], comp[0])
                    } else {
                        "unary-unknown".to_string()
                    };
                    format!("|intro-{index}")
                }
                _ => "unary-unknown".to_string(),
            };
            label.feats.insert("deriv", deriv);
        }
    }

    label.to_cat()
}

/// 各ノードに文字スパン素性を付与します
///
/// 葉の表層形の文字数を左から積算し、`char-start`と`char-end`を
/// 内部ノードに書き込みます。空要素の長さは0と数えられ、
/// `COMMENT`ノードは読み飛ばされます。
pub fn annotate_char_spans(tree: &mut Tree) {
    span_walk(tree, 0);
}

fn span_walk(tree: &mut Tree, offset: usize) -> (usize, usize) {
    let (label, children) = match tree {
        Tree::Leaf(word) => {
            let len = if is_empty_terminal(word) {
                0
            } else {
                word.chars().count()
            };
            return (offset, offset + len);
        }
        Tree::Node { label, children } => (label, children),
    };

    if label.cat.pprint(Default::default()) == "COMMENT" {
        return (offset, offset);
    }

    let span_start = offset;
    let mut span_end = offset;
    for child in children {
        let (_, child_end) = span_walk(child, span_end);
        span_end = child_end;
    }

    label.feats.insert("char-start", span_start.to_string());
    label.feats.insert("char-end", span_end.to_string());
    (span_start, span_end)
}

/// 指定された素性を木全体から削除します
pub fn delete_feats(tree: &mut Tree, black_list: &HashSet<&str>) {
    prune_feats(tree, |key| !black_list.contains(key));
}

/// 指定された素性だけを木全体に残します
pub fn keep_feats(tree: &mut Tree, white_list: &HashSet<&str>) {
    prune_feats(tree, |key| white_list.contains(key));
}

fn prune_feats<F>(tree: &mut Tree, keep: F)
where
    F: Fn(&str) -> bool + Copy,
{
    if let Tree::Node { label, children } = tree {
        label.feats.retain(|key, _| keep(key));
        for child in children {
            prune_feats(child, keep);
        }
    }
}
