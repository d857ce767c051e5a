//! 比較構文スパンの取り込み
//!
//! 外部から与えられた文字スパン注釈を、[`annotate_char_spans`]で
//! スパン素性を付与済みの木のノードに割り当てます。割り当ては
//! スパンとノードの位置ずれから計算したコスト行列上の
//! 最小コスト2部マッチング（ハンガリアン法）で決めます。
//!
//! [`annotate_char_spans`]: crate::transform::norm::annotate_char_spans

use crate::id::RecordId;
use crate::tree::Tree;

/// 比較構文の文字スパン注釈
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompSpan {
    /// 開始文字位置
    pub start: usize,

    /// 終了文字位置
    pub end: usize,

    /// スパンの種別（`root`、`cont`、`prej`など）
    pub label: String,
}

impl CompSpan {
    /// スパンを生成します
    pub fn new<S>(start: usize, end: usize, label: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}

/// 割り当て不能な組に与える有限の大コスト
const COST_MAX: f64 = 1.0e9;

/// スパンとノードの位置ずれのコスト
///
/// ずれがないとき0、ずれが大きいほど対数的に増加します。
fn alignment_cost(span: &CompSpan, node_start: usize, node_end: usize) -> f64 {
    let span_len = span.end.saturating_sub(span.start);
    let node_len = node_end.saturating_sub(node_start);
    let gap = span_len.min(node_len) as f64;

    let ds = (span.start.abs_diff(node_start) as f64).min(gap);
    let de = (span.end.abs_diff(node_end) as f64).min(gap);

    let num = 2.0 * gap - ds - de;
    let denom = 2.0 * gap + ds + de;
    if num <= 0.0 || denom <= 0.0 {
        COST_MAX
    } else {
        -(num / denom).ln()
    }
}

/// 正方コスト行列の最小コスト割り当てを解きます
///
/// ポテンシャル付きのハンガリアン法（O(n³)）です。戻り値は
/// 各行に割り当てられた列の添字です。
fn solve_assignment(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut col_row = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        col_row[0] = row;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = col_row[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[col_row[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if col_row[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path back to the start.
        while j0 != 0 {
            let j1 = way[j0];
            col_row[j0] = col_row[j1];
            j0 = j1;
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if col_row[j] > 0 {
            assignment[col_row[j] - 1] = j - 1;
        }
    }
    assignment
}

/// 素性に記録された文字スパンを読み出します
fn read_char_span(tree: &Tree) -> Option<(usize, usize)> {
    let feats = &tree.label()?.feats;
    let start = feats.get("char-start")?.parse().ok()?;
    let end = feats.get("char-end")?.parse().ok()?;
    Some((start, end))
}

/// 比較構文スパンを木のノードに割り当てます
///
/// 各マッチしたノードの素性に`comp=1,{label}`が書き込まれます。
/// マッチしなかったスパンとノードは黙って無視されます。
pub fn incorporate_all_comps(spans: &[CompSpan], tree: &mut Tree, id: &RecordId) {
    // Phase 1: collect the paths of span-annotated nodes.
    let mut node_paths: Vec<Vec<usize>> = Vec::new();
    let mut node_spans: Vec<(usize, usize)> = Vec::new();
    let mut stack: Vec<(Vec<usize>, &Tree)> = vec![(Vec::new(), &*tree)];
    while let Some((path, pointer)) = stack.pop() {
        if let Some(span) = read_char_span(pointer) {
            node_paths.push(path.clone());
            node_spans.push(span);
        }
        for (idx, child) in pointer.children().iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(idx);
            stack.push((child_path, child));
        }
    }

    if spans.is_empty() || node_paths.is_empty() {
        log::debug!("no comparative span to incorporate in {id}");
        return;
    }

    // Square matrix padded with zero cost; padding rows and columns are
    // indifferent, so real spans still compete for their best nodes.
    let dim = spans.len().max(node_paths.len());
    let mut cost = vec![vec![0.0f64; dim]; dim];
    for (i, span) in spans.iter().enumerate() {
        for (j, &(node_start, node_end)) in node_spans.iter().enumerate() {
            cost[i][j] = alignment_cost(span, node_start, node_end);
        }
    }

    // Phase 2: write the assignment back into the tree.
    let assignment = solve_assignment(&cost);
    for (i, span) in spans.iter().enumerate() {
        let j = assignment[i];
        if j >= node_paths.len() {
            log::info!("comparative span {:?} left unassigned in {id}", span.label);
            continue;
        }
        if let Some(node) = descend_mut(tree, &node_paths[j]) {
            if let Some(label) = node.label_mut() {
                label.feats.insert("comp", format!("1,{}", span.label));
            }
        }
    }
}

fn descend_mut<'a>(tree: &'a mut Tree, path: &[usize]) -> Option<&'a mut Tree> {
    let mut pointer = tree;
    for &idx in path {
        pointer = pointer.children_mut()?.get_mut(idx)?;
    }
    Some(pointer)
}
