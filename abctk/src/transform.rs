//! 木の書き換えパス
//!
//! いずれのパスも`(木, 識別子)`を受け取り、木を書き換えるか
//! 新しい木を返します。パスは呼び出し元が与えた順に逐次適用され、
//! 同じ木の上で並行に走ることはありません。

pub mod binconj;
pub mod comp;
pub mod elim_empty;
pub mod norm;
pub mod rel_trace;
pub mod unary;

pub use binconj::binarize_conj_tree;
pub use comp::{incorporate_all_comps, CompSpan};
pub use elim_empty::elim_empty_terminals;
pub use norm::{
    annotate_char_spans, delete_feats, elaborate_cat_annotations, keep_feats, minimize_tree,
};
pub use rel_trace::restore_rel_trace;
pub use unary::{collapse_unary_nodes, restore_unary_nodes};
