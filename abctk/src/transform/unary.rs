//! 単分岐ノードの圧縮と復元
//!
//! 連続する単分岐ノードのラベルを`☆`で連結して一つのノードに
//! 圧縮します。復元はその逆で、`☆`で分割して入れ子の単分岐ノードを
//! 再構成します。両者は互いに逆変換です。

use crate::annot::Annot;
use crate::cat::ReprMode;
use crate::tree::Tree;

/// 単分岐ノードの連鎖を一つのノードに圧縮します
///
/// 内部ノードをただ一つの子に持つノードは、両者のラベルを
/// `親☆子`と連結したラベルの下に孫を直接持つノードに置き換わります。
/// 不動点まで繰り返されるため、三段以上の連鎖も一つになります。
/// 葉の列は保存されます。新しい木を返し、引数は変更しません。
pub fn collapse_unary_nodes(tree: &Tree) -> Tree {
    let (label, children) = match tree {
        Tree::Leaf(_) => return tree.clone(),
        Tree::Node { label, children } => (label, children),
    };

    if children.len() == 1 {
        let mut only_child = collapse_unary_nodes(&children[0]);
        if let Tree::Node {
            label: child_label,
            children: grandchildren,
        } = &mut only_child
        {
            let merged = format!(
                "{}☆{}",
                label.pprint(ReprMode::Tlcg),
                child_label.pprint(ReprMode::Tlcg),
            );
            Tree::node(Annot::raw(merged), std::mem::take(grandchildren))
        } else {
            Tree::node(label.clone(), vec![only_child])
        }
    } else {
        Tree::node(
            label.clone(),
            children.iter().map(collapse_unary_nodes).collect(),
        )
    }
}

/// 圧縮された単分岐ノードを復元します
///
/// `☆`を含むラベルを分割し、先頭の断片を最外、末尾の断片を最内と
/// する入れ子の単分岐ノードに展開します。断片ごとの素性は
/// 再パースによってそれぞれのノードに保たれます。
pub fn restore_unary_nodes(tree: &Tree) -> Tree {
    let (label, children) = match tree {
        Tree::Leaf(_) => return tree.clone(),
        Tree::Node { label, children } => (label, children),
    };

    let children_restored: Vec<Tree> = children.iter().map(restore_unary_nodes).collect();

    let printed = label.pprint(ReprMode::Tlcg);
    if !printed.contains('☆') {
        return Tree::node(label.clone(), children_restored);
    }

    let mut pieces = printed.split('☆').rev();
    let mut acc = match pieces.next() {
        Some(innermost) => Tree::node(reparse_label(innermost), children_restored),
        None => return Tree::node(label.clone(), children_restored),
    };
    for piece in pieces {
        acc = Tree::node(reparse_label(piece), vec![acc]);
    }
    acc
}

fn reparse_label(piece: &str) -> Annot {
    match Annot::parse(piece) {
        Ok(annot) => annot,
        Err(err) => {
            log::warn!("unparsable collapsed label fragment: {err}");
            Annot::raw(piece)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(label: &str, children: Vec<Tree>) -> Tree {
        Tree::node(Annot::parse(label).unwrap(), children)
    }

    #[test]
    fn test_collapse_two_levels() {
        let tree = node(
            "<N/N>#deriv=unary-IPREL",
            vec![node("<PP\\S>", vec![Tree::leaf("書いた")])],
        );
        let collapsed = collapse_unary_nodes(&tree);
        assert_eq!(
            collapsed.label().unwrap().pprint(ReprMode::Tlcg),
            "<N/N>#deriv=unary-IPREL☆<PP\\S>",
        );
        assert_eq!(collapsed.children(), &[Tree::leaf("書いた")]);
    }

    #[test]
    fn test_collapse_chain_reaches_fixed_point() {
        let tree = node(
            "A",
            vec![node("B", vec![node("C", vec![Tree::leaf("x")])])],
        );
        let collapsed = collapse_unary_nodes(&tree);
        assert_eq!(collapsed.label().unwrap().pprint(ReprMode::Tlcg), "A☆B☆C");
        assert_eq!(collapsed.leaves(), vec!["x"]);
    }

    #[test]
    fn test_collapse_keeps_lexical_unary() {
        // A preterminal above a single leaf is not a collapsible chain.
        let tree = node("NP", vec![Tree::leaf("太郎")]);
        assert_eq!(collapse_unary_nodes(&tree), tree);
    }

    #[test]
    fn test_restore_is_inverse() {
        let tree = node(
            "S",
            vec![
                node(
                    "<N/N>#deriv=unary-IPREL",
                    vec![node("<PP\\S>#role=h", vec![Tree::leaf("書いた")])],
                ),
                node("N", vec![Tree::leaf("本")]),
            ],
        );
        let roundtripped = restore_unary_nodes(&collapse_unary_nodes(&tree));
        assert_eq!(roundtripped, tree);
    }

    #[test]
    fn test_restore_three_way_split() {
        let collapsed = Tree::node(Annot::raw("A☆B#x=1☆C"), vec![Tree::leaf("x")]);
        let restored = restore_unary_nodes(&collapsed);
        assert_eq!(restored.pprint(ReprMode::Tlcg), "(A (B#x=1 (C x)))");
    }
}
