//! 注釈付き順序木
//!
//! ツリーバンクの一文は根付き順序木で表されます。内部ノードは
//! [`Annot`]ラベルを持ち、葉は表層形の文字列です。`*`で始まる葉
//! （`*T*`などのトレース）と`__`で始まる葉は空要素の標識です。
//!
//! 木は深くなりうるため、走査は再帰ではなく明示的なスタックで行います。

use std::fmt;

use crate::annot::Annot;
use crate::cat::ReprMode;

/// 葉文字列が空要素の標識かどうかを検査します
pub fn is_empty_terminal(word: &str) -> bool {
    word.starts_with('*') || word.starts_with("__")
}

/// 注釈付き順序木
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tree {
    /// 内部ノード
    Node {
        /// ノードラベル
        label: Annot,

        /// 子の列。順序が同一性を定めます。
        children: Vec<Tree>,
    },

    /// 葉（表層形または空要素標識）
    Leaf(String),
}

impl Tree {
    /// 内部ノードを生成します
    pub fn node(label: Annot, children: Vec<Tree>) -> Self {
        Self::Node { label, children }
    }

    /// 葉を生成します
    pub fn leaf<S>(word: S) -> Self
    where
        S: Into<String>,
    {
        Self::Leaf(word.into())
    }

    /// 葉かどうかを検査します
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// 内部ノードのラベルを返します
    pub fn label(&self) -> Option<&Annot> {
        match self {
            Self::Node { label, .. } => Some(label),
            Self::Leaf(_) => None,
        }
    }

    /// 内部ノードのラベルを可変参照で返します
    pub fn label_mut(&mut self) -> Option<&mut Annot> {
        match self {
            Self::Node { label, .. } => Some(label),
            Self::Leaf(_) => None,
        }
    }

    /// 子の列を返します。葉に対しては空スライスです。
    pub fn children(&self) -> &[Tree] {
        match self {
            Self::Node { children, .. } => children,
            Self::Leaf(_) => &[],
        }
    }

    /// 子の列を可変参照で返します
    pub fn children_mut(&mut self) -> Option<&mut Vec<Tree>> {
        match self {
            Self::Node { children, .. } => Some(children),
            Self::Leaf(_) => None,
        }
    }

    /// 葉を左から右の順で列挙します
    pub fn leaves(&self) -> Vec<&str> {
        let mut result = Vec::new();
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            match tree {
                Self::Leaf(word) => result.push(word.as_str()),
                Self::Node { children, .. } => {
                    stack.extend(children.iter().rev());
                }
            }
        }
        result
    }

    /// 木全体が空要素だけからなるかどうかを検査します
    ///
    /// 葉を一つも支配しないノードも空とみなされます。
    pub fn is_empty(&self) -> bool {
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            match tree {
                Self::Leaf(word) => {
                    if !is_empty_terminal(word) {
                        return false;
                    }
                }
                Self::Node { children, .. } => stack.extend(children.iter()),
            }
        }
        true
    }

    /// 木を一行の括弧付き表記に整形します
    pub fn pprint(&self, mode: ReprMode) -> String {
        let mut buf = String::new();
        self.pprint_into(&mut buf, mode);
        buf
    }

    fn pprint_into(&self, buf: &mut String, mode: ReprMode) {
        // Right-to-left frames on an explicit stack keep deep trees safe.
        enum Frame<'a> {
            Tree(&'a Tree),
            Text(&'static str),
        }

        let mut stack = vec![Frame::Tree(self)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Text(text) => buf.push_str(text),
                Frame::Tree(Tree::Leaf(word)) => buf.push_str(word),
                Frame::Tree(Tree::Node { label, children }) => {
                    buf.push('(');
                    buf.push_str(&label.pprint(mode));
                    stack.push(Frame::Text(")"));
                    for child in children.iter().rev() {
                        stack.push(Frame::Tree(child));
                        stack.push(Frame::Text(" "));
                    }
                }
            }
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pprint(ReprMode::Tlcg))
    }
}

// 既定の再帰デストラクタは深い木でスタックを溢れさせるため、
// 子を作業リストへ退避して反復的に解放します。
impl Drop for Tree {
    fn drop(&mut self) {
        let Self::Node { children, .. } = self else {
            return;
        };
        if children.is_empty() {
            return;
        }
        let mut worklist = std::mem::take(children);
        while let Some(mut tree) = worklist.pop() {
            if let Self::Node { children, .. } = &mut tree {
                worklist.append(children);
            }
        }
    }
}
