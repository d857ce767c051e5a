//! 外部CCGパーザ向けデータセットの抽出
//!
//! 2分岐に正規化された木から、語とカテゴリと主辞の依存を並べた
//! 学習インスタンスを取り出します。主辞は常に右側の部分木に
//! 取られ、根の主辞は0を指します。あわせて観測された単項規則と
//! 2項規則の組も収集されます。

use crate::annot::Annot;
use crate::cat::ReprMode;
use crate::errors::{AbctkError, Result};
use crate::id::RecordId;
use crate::tree::{is_empty_terminal, Tree};

/// インスタンスの1語分
///
/// `(位置, 語, depccg表記のカテゴリ, 主辞の位置)`の組です。
/// 位置は1始まりで、根の主辞は0です。
pub type InstanceNode = (usize, String, String, usize);

/// カテゴリ文字列の組（単項・2項規則の記録用）
pub type RulePair = (String, String);

/// 学習インスタンス
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    /// 語の列（位置順とは限りません）
    pub analysis: Vec<InstanceNode>,

    /// 元のレコード識別子
    pub id: String,
}

impl Instance {
    /// 文を語ごとに空白区切りで綴り出します
    pub fn spellout(&self) -> String {
        let mut nodes = self.analysis.clone();
        nodes.sort();
        let words: Vec<&str> = nodes.iter().map(|(_, word, _, _)| word.as_str()).collect();
        words.join(" ")
    }

    /// 木からインスタンスを抽出します
    ///
    /// 戻り値はインスタンスと、観測された単項規則および2項規則の
    /// 組の列です。
    ///
    /// # エラー
    ///
    /// 空要素や3分岐以上、`deriv=leave`の非CCG派生を含む木に対しては
    /// [`IneligibleTreeError`](crate::errors::AbctkError::IneligibleTree)
    /// を返します。
    pub fn from_tree(
        tree: &Tree,
        id: &RecordId,
    ) -> Result<(Instance, Vec<RulePair>, Vec<RulePair>)> {
        let mut extractor = Extractor {
            id,
            counter: 0,
            nodes: Vec::new(),
            unary_rules: Vec::new(),
            binary_rules: Vec::new(),
        };
        let head = extractor.walk(tree)?;
        let (index, word, cat) = head;
        extractor.nodes.push((index, word, cat, 0));

        let mut analysis = extractor.nodes;
        analysis.sort();
        analysis.dedup();

        Ok((
            Instance {
                analysis,
                id: id.to_string(),
            },
            extractor.unary_rules,
            extractor.binary_rules,
        ))
    }
}

struct Extractor<'a> {
    id: &'a RecordId,
    counter: usize,
    nodes: Vec<InstanceNode>,
    unary_rules: Vec<RulePair>,
    binary_rules: Vec<RulePair>,
}

impl Extractor<'_> {
    fn ineligible<T>(&self, msg: &str) -> Result<T> {
        Err(AbctkError::IneligibleTree {
            id: self.id.to_string(),
            msg: msg.to_string(),
        })
    }

    fn depccg_cat(&self, label: &Annot) -> Result<String> {
        match label.to_cat() {
            Some(cat) => Ok(cat.pprint(ReprMode::Depccg)),
            None => self.ineligible("unparsable category"),
        }
    }

    /// 部分木を処理し、その主辞の`(位置, 語, カテゴリ)`を返します
    fn walk(&mut self, tree: &Tree) -> Result<(usize, String, String)> {
        let (label, children) = match tree {
            Tree::Leaf(word) => {
                return self.ineligible(&format!("bare lexical node \"{word}\""))
            }
            Tree::Node { label, children } => (label, children),
        };

        if label.feats.get_or("deriv", "") == "leave" {
            return self.ineligible("non-CCG derivations are not supported");
        }

        match children.as_slice() {
            [Tree::Leaf(word)] => {
                if is_empty_terminal(word) {
                    return self.ineligible("empty categories are not supported");
                }
                self.counter += 1;
                Ok((self.counter, word.clone(), self.depccg_cat(label)?))
            }
            [only_child @ Tree::Node { label: child_label, .. }] => {
                self.unary_rules
                    .push((self.depccg_cat(label)?, self.depccg_cat(child_label)?));
                self.walk(only_child)
            }
            [child_1, child_2] => {
                let cat_1 = match child_1.label() {
                    Some(l) => self.depccg_cat(l)?,
                    None => return self.ineligible("lexical node in a binary branching"),
                };
                let cat_2 = match child_2.label() {
                    Some(l) => self.depccg_cat(l)?,
                    None => return self.ineligible("lexical node in a binary branching"),
                };
                self.binary_rules.push((cat_1, cat_2));

                let (dep_index, dep_word, dep_cat) = self.walk(child_1)?;
                let head = self.walk(child_2)?;
                self.nodes.push((dep_index, dep_word, dep_cat, head.0));
                Ok(head)
            }
            _ => self.ineligible("non-binary branching detected"),
        }
    }
}
