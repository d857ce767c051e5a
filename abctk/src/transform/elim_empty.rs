//! 空要素の消去
//!
//! `*`または`__`で始まる葉だけを支配する部分木を親から取り除きます。
//! 2分岐ノードが単分岐に縮退した場合は`deriv=unary-elim-empty`で
//! 標識されます。

use crate::id::RecordId;
use crate::tree::{is_empty_terminal, Tree};

/// 空要素とそれだけを支配するノードを木から取り除きます
///
/// 木全体が空要素だけからなる場合、木は変更されずに警告が出ます。
/// このパスは冪等です。
pub fn elim_empty_terminals(tree: &mut Tree, id: &RecordId) {
    if walk(tree) {
        log::warn!("tree {id} dominates no overt material; left untouched");
    }
}

/// 再帰本体。戻り値は部分木が空かどうかです。
fn walk(tree: &mut Tree) -> bool {
    let (label, children) = match tree {
        Tree::Leaf(word) => return is_empty_terminal(word),
        Tree::Node { label, children } => (label, children),
    };

    let verdicts: Vec<bool> = children.iter_mut().map(walk).collect();

    if children.len() == 1 {
        return verdicts[0];
    }
    if verdicts.iter().all(|&is_empty| is_empty) {
        // The node itself is empty; deletion is the parent's business.
        return true;
    }

    let arity_before = children.len();
    let mut verdicts = verdicts.into_iter();
    children.retain(|_| !verdicts.next().unwrap_or(false));

    if arity_before == 2 && children.len() == 1 {
        label.feats.insert("deriv", "unary-elim-empty");
    }

    false
}
