//! 関係節トレースの復元
//!
//! `<N/N>#deriv=unary-IPREL`の下に畳み込まれた関係節の派生を、
//! 束縛演算子とトレース`*T*`を持つ明示的な形に展開します。
//! 前件`A`を持つ関手カテゴリの子に対して、書き換え後の子は
//! `(<Srel|A> (Srel (A *T*) 元の子))`となります。

use std::sync::LazyLock;

use crate::annot::{Annot, Feats};
use crate::cat::AbcCat;
use crate::errors::{AbctkError, Result};
use crate::id::RecordId;
use crate::tree::Tree;

static CAT_REL: LazyLock<AbcCat> = LazyLock::new(|| AbcCat::base("N").adj_r());

/// 関係節化サイトの検査結果
enum Verdict {
    /// 前件`A`を取り出せた
    Rewrite(AbcCat),

    /// 形が合わない（理由つき）
    Mismatch(String),

    /// 関係節化サイトではない
    NotASite,
}

/// 関係節トレースを木全体にわたって復元します
///
/// `generous`が真のときはカテゴリ`<N/N>`のノードすべてが候補になり、
/// 形の合わないノードは警告の上で読み飛ばされます。偽のときは
/// `deriv=unary-IPREL`のノードだけが候補になり、形の合わないノードは
/// [`RelTraceRestorationError`](crate::errors::AbctkError::RelTraceRestoration)
/// になります。
pub fn restore_rel_trace(tree: &mut Tree, id: &RecordId, generous: bool) -> Result<()> {
    if let Tree::Node { label, children } = tree {
        let verdict = examine(label, children, generous);
        match verdict {
            Verdict::Rewrite(ant) => {
                log::info!("found a relativization structure in {id}");
                if let Some(original_child) = children.pop() {
                    children.push(rewrite_child(ant, original_child));
                }
            }
            Verdict::Mismatch(reason) => {
                if generous {
                    log::warn!(
                        "a subtree labeled <N/N> is not a relativization structure \
                         ({reason}); tree {id}"
                    );
                } else {
                    return Err(AbctkError::RelTraceRestoration {
                        id: id.to_string(),
                        reason,
                    });
                }
            }
            Verdict::NotASite => {}
        }

        for child in children {
            restore_rel_trace(child, id, generous)?;
        }
    }
    Ok(())
}

fn examine(label: &Annot, children: &[Tree], generous: bool) -> Verdict {
    let is_site = label.to_cat().is_some_and(|cat| cat == *CAT_REL)
        && (generous || label.feats.get_or("deriv", "none") == "unary-IPREL");
    if !is_site {
        return Verdict::NotASite;
    }

    if children.len() != 1 {
        return Verdict::Mismatch("not unary".to_string());
    }
    match &children[0] {
        Tree::Leaf(word) => Verdict::Mismatch(format!("unexpected lexical node \"{word}\"")),
        Tree::Node { label: child, .. } => match child.to_cat() {
            Some(AbcCat::Functor { ant, .. }) if matches!(*ant, AbcCat::Base(_)) => {
                Verdict::Rewrite(*ant)
            }
            Some(cat) => Verdict::Mismatch(format!(
                "illegal subtree category ({})",
                cat.pprint(Default::default()),
            )),
            None => Verdict::Mismatch("unparsable subtree category".to_string()),
        },
    }
}

/// `(<Srel|A> (Srel (A *T*) 元の子))`を組み立てます
fn rewrite_child(ant: AbcCat, original_child: Tree) -> Tree {
    let srel = AbcCat::base("Srel");
    let binder = Annot::new(
        srel.clone().v(ant.clone()),
        [("rel", "bind")].into_iter().collect::<Feats>(),
    );
    Tree::node(
        binder,
        vec![Tree::node(
            Annot::from(srel),
            vec![
                Tree::node(Annot::from(ant), vec![Tree::leaf("*T*")]),
                original_child,
            ],
        )],
    )
}
