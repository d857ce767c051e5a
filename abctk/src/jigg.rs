//! JIGG形式への構造射影
//!
//! 木をJIGGの文要素に相当する平坦な構造（トークン列とスパン列）に
//! 射影します。カテゴリはccg2lambda互換の表記で出力され、
//! 各スパンには派生規則が付されます。規則は`deriv`素性から、
//! なければ子カテゴリの簡約から求められます。

use crate::cat::simplify::simplify_exh;
use crate::cat::ReprMode;
use crate::id::RecordId;
use crate::tree::Tree;

/// 射影されたトークン
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JiggToken {
    /// トークン識別子（`s0_3`のような形）
    pub id: String,

    /// 表層形
    pub surf: String,

    /// 開始文字位置
    pub offset_begin: usize,

    /// 終了文字位置
    pub offset_end: usize,
}

/// 射影されたスパン
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JiggSpan {
    /// スパン識別子（`s0_sp2`のような形）
    pub id: String,

    /// ccg2lambda表記のカテゴリ
    pub category: String,

    /// 開始トークン位置
    pub begin: usize,

    /// 終了トークン位置
    pub end: usize,

    /// 派生規則。終端直上のスパンにはありません。
    pub rule: Option<String>,

    /// 直下のトークン（終端直上のスパンのみ）
    pub terminal: Option<String>,

    /// 子スパンの識別子
    pub children: Vec<String>,
}

/// 射影された一文
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JiggSentence {
    /// 元のレコード識別子
    pub abc_id: String,

    /// 空要素込みの表層文
    pub text: String,

    /// トークン列
    pub tokens: Vec<JiggToken>,

    /// スパン列（後順で付番）
    pub spans: Vec<JiggSpan>,
}

/// 走査の戻り値
struct Projected {
    token_begin: usize,
    token_end: usize,
    name: String,
    is_terminal: bool,
}

/// 木をJIGG形の構造に射影します
///
/// `jigg_id`はトークンとスパンの識別子の接頭辞になる文番号です。
pub fn project_jigg(tree: &Tree, id: &RecordId, jigg_id: usize) -> JiggSentence {
    let mut sentence = JiggSentence {
        abc_id: id.to_string(),
        text: tree.leaves().concat(),
        tokens: Vec::new(),
        spans: Vec::new(),
    };

    let mut token_count = 0usize;
    let mut span_count = 0usize;
    let mut offset = 0usize;

    // Post-order traversal on an explicit stack; the second visit of a
    // node consumes its children's results from the return stack.
    let mut call_stack: Vec<(&Tree, bool)> = vec![(tree, false)];
    let mut return_stack: Vec<Projected> = Vec::new();

    while let Some((pointer, is_back)) = call_stack.pop() {
        if !is_back {
            match pointer {
                Tree::Node { .. } => {
                    call_stack.push((pointer, true));
                    call_stack.extend(pointer.children().iter().rev().map(|c| (c, false)));
                }
                Tree::Leaf(word) => {
                    let offset_end = offset + word.chars().count();
                    let name = format!("s{jigg_id}_{token_count}");
                    sentence.tokens.push(JiggToken {
                        id: name.clone(),
                        surf: word.clone(),
                        offset_begin: offset,
                        offset_end,
                    });
                    return_stack.push(Projected {
                        token_begin: token_count,
                        token_end: token_count + 1,
                        name,
                        is_terminal: true,
                    });
                    token_count += 1;
                    offset = offset_end;
                }
            }
            continue;
        }

        let Tree::Node { label, children } = pointer else {
            continue;
        };
        let split = return_stack.len() - children.len();
        let returned: Vec<Projected> = return_stack.split_off(split);

        let token_begin = returned
            .iter()
            .map(|r| r.token_begin)
            .min()
            .unwrap_or(token_count);
        let token_end = returned
            .iter()
            .map(|r| r.token_end)
            .max()
            .unwrap_or(token_count);
        let name = format!("s{jigg_id}_sp{span_count}");
        span_count += 1;

        let category = match label.to_cat() {
            Some(cat) => cat.pprint(ReprMode::Ccg2lambda),
            None => label.cat.pprint(ReprMode::Ccg2lambda),
        };

        let is_subterminal = returned.len() == 1 && returned[0].is_terminal;
        let rule = if is_subterminal {
            None
        } else {
            Some(find_rule(label, children))
        };
        let (terminal, child_names) = if is_subterminal {
            (Some(returned[0].name.clone()), Vec::new())
        } else {
            (None, returned.iter().map(|r| r.name.clone()).collect())
        };

        sentence.spans.push(JiggSpan {
            id: name.clone(),
            category,
            begin: token_begin,
            end: token_end,
            rule,
            terminal,
            children: child_names,
        });
        return_stack.push(Projected {
            token_begin,
            token_end,
            name,
            is_terminal: false,
        });
    }

    sentence
}

/// スパンの派生規則を求めます
///
/// `deriv`素性があればそれを、なければ2分岐の子カテゴリの簡約から
/// 規則を推定します。求まらない場合は`unknown`です。
fn find_rule(label: &crate::annot::Annot, children: &[Tree]) -> String {
    let deriv = label.feats.get_or("deriv", "none");
    if deriv != "none" {
        return deriv.to_string();
    }

    if children.len() == 2 {
        let cats: Vec<_> = children
            .iter()
            .filter_map(|c| c.label().and_then(|l| l.to_cat()))
            .collect();
        if cats.len() == 2 {
            if let Some((_, elim)) = simplify_exh(&cats[0], &cats[1]).first() {
                return elim.to_string();
            }
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annot::Annot;

    fn node(label: &str, children: Vec<Tree>) -> Tree {
        Tree::node(Annot::parse(label).unwrap(), children)
    }

    fn sample() -> Tree {
        node(
            "S[m]",
            vec![
                node("NP", vec![Tree::leaf("太郎")]),
                node("<NP\\S[m]>", vec![Tree::leaf("走る")]),
            ],
        )
    }

    #[test]
    fn test_tokens_and_text() {
        let sent = project_jigg(&sample(), &RecordId::from_string("j_1"), 0);
        assert_eq!(sent.text, "太郎走る");
        assert_eq!(sent.tokens.len(), 2);

        let first = &sent.tokens[0];
        assert_eq!(first.id, "s0_0");
        assert_eq!(first.surf, "太郎");
        assert_eq!((first.offset_begin, first.offset_end), (0, 2));
        assert_eq!(
            (sent.tokens[1].offset_begin, sent.tokens[1].offset_end),
            (2, 4),
        );
    }

    #[test]
    fn test_spans_postorder() {
        let sent = project_jigg(&sample(), &RecordId::from_string("j_2"), 1);
        assert_eq!(sent.spans.len(), 3);

        // Subterminal spans point at their token and carry no rule.
        let np = &sent.spans[0];
        assert_eq!(np.id, "s1_sp0");
        assert_eq!(np.category, "NP");
        assert_eq!(np.terminal.as_deref(), Some("s1_0"));
        assert_eq!(np.rule, None);

        let root = &sent.spans[2];
        assert_eq!((root.begin, root.end), (0, 2));
        assert_eq!(root.children, vec!["s1_sp0", "s1_sp1"]);
        assert_eq!(root.rule.as_deref(), Some("<"));
    }

    #[test]
    fn test_ccg2lambda_category_rendering() {
        let sent = project_jigg(&sample(), &RecordId::from_string("j_3"), 0);
        assert_eq!(sent.spans[2].category, "S[m=true]");
        assert_eq!(sent.spans[1].category, "(S[m=true]\\NP)");
    }

    #[test]
    fn test_deriv_feature_wins_over_inference() {
        let tree = node(
            "NP#deriv=conj",
            vec![
                node("NP", vec![Tree::leaf("女")]),
                node("NP", vec![Tree::leaf("男")]),
            ],
        );
        let sent = project_jigg(&tree, &RecordId::from_string("j_4"), 0);
        assert_eq!(sent.spans[2].rule.as_deref(), Some("conj"));
    }
}
