//! 等位接続の2分岐化
//!
//! `deriv=conj…`で標識されたノードの平坦な子の列を、等位句ごとの
//! スパンに切り分けてから右結合の2分岐連鎖に組み替えます。
//! 連鎖の各ノードには`trace.binconj`素性が刻印され、後段の検査や
//! 最小化で復元の手掛かりになります。

use std::sync::LazyLock;

use regex::Regex;

use crate::annot::{Annot, Feats};
use crate::cat::AbcCat;
use crate::errors::{AbctkError, Result};
use crate::id::RecordId;
use crate::tree::Tree;

/// 等位接続詞とみなす基底カテゴリの既定パターン
///
/// `CONJ`が上流から実際に排出されるかは確認できていないため、
/// このパターンは呼び出し元で差し替え可能です。
pub static DEFAULT_COORDINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(P|PU|CONJ)$").unwrap());

/// 等位句スパン
///
/// 等位項と接続詞のどちらか一方を欠くことがあります。
struct ConjunctSpan {
    conj: Option<Tree>,
    p: Option<Tree>,
}

impl ConjunctSpan {
    /// 子の列をスパンの列に切り分けます
    ///
    /// 接続詞が先行すれば孤立接続詞、等位項の直後に接続詞が続けば
    /// 対、それ以外は孤立等位項になります。
    fn chop_children(children: Vec<Tree>, coordinator: &Regex) -> Vec<ConjunctSpan> {
        let mut spans = Vec::new();
        let mut rest = children.into_iter().peekable();
        while let Some(child) = rest.next() {
            if is_coordinator(&child, coordinator) {
                spans.push(ConjunctSpan {
                    conj: None,
                    p: Some(child),
                });
            } else if rest
                .peek()
                .is_some_and(|next| is_coordinator(next, coordinator))
            {
                spans.push(ConjunctSpan {
                    conj: Some(child),
                    p: rest.next(),
                });
            } else {
                spans.push(ConjunctSpan {
                    conj: Some(child),
                    p: None,
                });
            }
        }
        spans
    }

    /// スパンを周囲カテゴリ`R`の部分木に組み立てます
    ///
    /// 対のスパン`(C, P)`は`(R C (<C\R> Pの子…))`に展開され、
    /// 接続詞のラベルは落とされます。
    fn into_tree(self, surrounding: &AbcCat, id: &RecordId) -> Result<Tree> {
        match (self.conj, self.p) {
            (Some(conj), Some(p)) => {
                let conj_cat =
                    conj.label()
                        .and_then(Annot::to_cat)
                        .ok_or_else(|| AbctkError::ConjunctionMalformed {
                            id: id.to_string(),
                        })?;
                let inner = Tree::node(
                    Annot::from(conj_cat.l(surrounding.clone())),
                    particle_children(p),
                );
                Ok(Tree::node(
                    Annot::new(
                        surrounding.clone(),
                        [("trace.binconj", "conjunctor")].into_iter().collect(),
                    ),
                    vec![conj, inner],
                ))
            }
            (Some(conj), None) => Ok(Tree::node(
                Annot::new(
                    surrounding.clone(),
                    [
                        ("deriv", "unary-binconj-conjunctor"),
                        ("trace.binconj", "conjunctor"),
                    ]
                    .into_iter()
                    .collect(),
                ),
                vec![conj],
            )),
            (None, Some(p)) => Ok(Tree::node(
                Annot::new(
                    surrounding.clone(),
                    [("trace.binconj", "orphan-conjunctor")].into_iter().collect(),
                ),
                particle_children(p),
            )),
            (None, None) => Err(AbctkError::ConjunctionMalformed {
                id: id.to_string(),
            }),
        }
    }

    fn into_children(self) -> impl Iterator<Item = Tree> {
        [self.conj, self.p].into_iter().flatten()
    }
}

fn is_coordinator(tree: &Tree, coordinator: &Regex) -> bool {
    tree.label()
        .and_then(Annot::to_cat)
        .is_some_and(|cat| matches!(&cat, AbcCat::Base(name) if coordinator.is_match(name)))
}

/// 接続詞ノードの中身を取り出します（ラベルは落とされます）
fn particle_children(mut p: Tree) -> Vec<Tree> {
    if let Tree::Node { children, .. } = &mut p {
        std::mem::take(children)
    } else {
        vec![p]
    }
}

/// スパンの列を右結合の2分岐連鎖に畳み込みます
///
/// 最終スパンは`R`そのもの、それ以外のスパンは`<R\R>`として
/// 組み立てられます。根は`trace.binconj=root`、中間ノードは
/// `trace.binconj=interm`を帯びます。
fn chain_conjuncts(
    given_label: &Annot,
    root_cat: &AbcCat,
    spans: Vec<ConjunctSpan>,
    id: &RecordId,
) -> Result<Tree> {
    let mut rightward = spans.into_iter().rev();
    let last = rightward
        .next()
        .ok_or_else(|| AbctkError::ConjunctionMalformed {
            id: id.to_string(),
        })?;
    let mut acc = last.into_tree(root_cat, id)?;

    let remainder: Vec<ConjunctSpan> = rightward.collect();
    let leftmost_idx = remainder.len().saturating_sub(1);
    for (idx, span) in remainder.into_iter().enumerate() {
        let feats: Feats = if idx == leftmost_idx {
            let mut feats = given_label.feats.clone();
            feats.insert("trace.binconj", "root");
            feats
        } else {
            [("trace.binconj", "interm")].into_iter().collect()
        };
        acc = Tree::node(
            Annot::new(root_cat.clone(), feats),
            vec![span.into_tree(&root_cat.adj_l(), id)?, acc],
        );
    }
    Ok(acc)
}

/// 等位接続ノードを再帰的に2分岐化します
///
/// 新しい木を返し、引数は変更しません。スパンが一つしか得られない
/// ノードは実質的な等位接続ではないため、そのまま返されます。
///
/// # エラー
///
/// 空の等位句スパンに遭遇した場合は
/// [`ConjunctionMalformedError`](crate::errors::AbctkError::ConjunctionMalformed)
/// を返します。
pub fn binarize_conj_tree(tree: &Tree, id: &RecordId, coordinator: &Regex) -> Result<Tree> {
    let (label, children) = match tree {
        Tree::Leaf(_) => return Ok(tree.clone()),
        Tree::Node { label, children } => (label, children),
    };

    let children_bin: Vec<Tree> = children
        .iter()
        .map(|child| binarize_conj_tree(child, id, coordinator))
        .collect::<Result<_>>()?;

    let is_conj_node =
        children.len() > 1 && label.feats.get_or("deriv", "none").starts_with("conj");
    if !is_conj_node {
        return Ok(Tree::node(label.clone(), children_bin));
    }

    let Some(root_cat) = label.to_cat() else {
        log::warn!("conjunction node with an unparsable category left flat; tree {id}");
        return Ok(Tree::node(label.clone(), children_bin));
    };

    let spans = ConjunctSpan::chop_children(children_bin, coordinator);
    if spans.len() <= 1 {
        let children_back: Vec<Tree> = spans
            .into_iter()
            .flat_map(ConjunctSpan::into_children)
            .collect();
        return Ok(Tree::node(label.clone(), children_back));
    }

    chain_conjuncts(label, &root_cat, spans, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cat::ReprMode;

    fn node(label: &str, children: Vec<Tree>) -> Tree {
        Tree::node(Annot::parse(label).unwrap(), children)
    }

    fn rid() -> RecordId {
        RecordId::from_string("conj_1")
    }

    #[test]
    fn test_binarize_two_conjuncts() {
        // (NP#deriv=conj (NP 女) (P や) (NP 男))
        let tree = node(
            "NP#deriv=conj",
            vec![
                node("NP", vec![Tree::leaf("女")]),
                node("P", vec![Tree::leaf("や")]),
                node("NP", vec![Tree::leaf("男")]),
            ],
        );
        let result = binarize_conj_tree(&tree, &rid(), &DEFAULT_COORDINATOR).unwrap();

        assert_eq!(
            result.pprint(ReprMode::Tlcg),
            "(NP#deriv=conj#trace.binconj=root \
             (<NP\\NP>#trace.binconj=conjunctor (NP 女) (<NP\\<NP\\NP>> や)) \
             (NP#deriv=unary-binconj-conjunctor#trace.binconj=conjunctor (NP 男)))",
        );
    }

    #[test]
    fn test_three_conjuncts_chain_right() {
        let tree = node(
            "NP#deriv=conj",
            vec![
                node("NP", vec![Tree::leaf("あ")]),
                node("P", vec![Tree::leaf("と")]),
                node("NP", vec![Tree::leaf("い")]),
                node("P", vec![Tree::leaf("と")]),
                node("NP", vec![Tree::leaf("う")]),
            ],
        );
        let result = binarize_conj_tree(&tree, &rid(), &DEFAULT_COORDINATOR).unwrap();

        let root_feats = &result.label().unwrap().feats;
        assert_eq!(root_feats.get("trace.binconj"), Some("root"));
        assert_eq!(result.children().len(), 2);

        let second = &result.children()[1];
        assert_eq!(
            second.label().unwrap().feats.get("trace.binconj"),
            Some("interm"),
        );
        assert_eq!(result.leaves(), vec!["あ", "と", "い", "と", "う"]);
    }

    #[test]
    fn test_orphan_coordinator_first() {
        let tree = node(
            "NP#deriv=conj",
            vec![
                node("P", vec![Tree::leaf("と")]),
                node("NP", vec![Tree::leaf("男")]),
            ],
        );
        let result = binarize_conj_tree(&tree, &rid(), &DEFAULT_COORDINATOR).unwrap();

        let first = &result.children()[0];
        assert_eq!(
            first.label().unwrap().feats.get("trace.binconj"),
            Some("orphan-conjunctor"),
        );
        // The particle label is dropped in favor of its children.
        assert_eq!(first.children(), &[Tree::leaf("と")]);
    }

    #[test]
    fn test_single_span_unchanged() {
        let tree = node(
            "NP#deriv=conj",
            vec![
                node("NP", vec![Tree::leaf("女")]),
                node("P", vec![Tree::leaf("や")]),
            ],
        );
        let result = binarize_conj_tree(&tree, &rid(), &DEFAULT_COORDINATOR).unwrap();
        assert_eq!(result, tree);
    }

    #[test]
    fn test_non_conj_node_untouched() {
        let tree = node(
            "S",
            vec![
                node("NP", vec![Tree::leaf("女")]),
                node("P", vec![Tree::leaf("や")]),
                node("NP", vec![Tree::leaf("男")]),
            ],
        );
        let result = binarize_conj_tree(&tree, &rid(), &DEFAULT_COORDINATOR).unwrap();
        assert_eq!(result, tree);
    }

    #[test]
    fn test_custom_coordinator_set() {
        let coord = Regex::new(r"^(P|PU)$").unwrap();
        let tree = node(
            "NP#deriv=conj",
            vec![
                node("NP", vec![Tree::leaf("女")]),
                node("CONJ", vec![Tree::leaf("や")]),
                node("NP", vec![Tree::leaf("男")]),
            ],
        );
        // With CONJ excluded, the particle counts as an ordinary conjunct.
        let result = binarize_conj_tree(&tree, &rid(), &coord).unwrap();
        let second = &result.children()[1];
        assert_eq!(
            second.label().unwrap().feats.get("trace.binconj"),
            Some("interm"),
        );
    }
}
