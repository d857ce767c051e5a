//! 括弧付きコーパスの読み書き
//!
//! ツリーバンクは一行一文の括弧付き（PTB風）表記で格納されます。
//! 各文は`(TOP (…本体…) (ID 識別子))`の形をとり、ローダは本体と
//! 識別子を分離して`(識別子, 木)`の組を遅延的に産出します。
//! ダンパはその逆で、識別子でソートし、名前ごとにファイルへまとめて
//! 書き戻します。既存のファイルは警告なしに上書きされます。
//!
//! # 使用例
//!
//! ```no_run
//! use abctk::io::PsdLoader;
//!
//! let loader = PsdLoader::default();
//! for entry in loader.iter_dir("treebank/")? {
//!     let (id, tree) = entry?;
//!     println!("{id}: {}", tree.pprint(Default::default()));
//! }
//! # Ok::<(), abctk::errors::AbctkError>(())
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::annot::Annot;
use crate::cat::ReprMode;
use crate::errors::{AbctkError, Result};
use crate::id::RecordId;
use crate::tree::Tree;

static RE_PSD_FILE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.psd$").unwrap());

/// ノードラベルをパースします
///
/// 素性部分が不正なラベルは警告の上、生トークンのまま保持されます。
fn parse_label(token: &str, source_name: &str) -> Annot {
    match Annot::parse(token) {
        Ok(annot) => annot,
        Err(err) => {
            log::warn!("unparsable node label in {source_name}: {err}");
            Annot::raw(token)
        }
    }
}

/// 一つの文書をトップレベルの括弧式の列としてパースします
///
/// # エラー
///
/// 括弧の対応が取れない入力に対しては
/// [`TreeStructureError`](crate::errors::AbctkError::TreeStructure)を返します。
pub fn parse_trees(source: &str, source_name: &str) -> Result<Vec<Tree>> {
    struct Frame {
        label: Option<Annot>,
        children: Vec<Tree>,
    }

    let mut roots: Vec<Tree> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let push = |stack: &mut Vec<Frame>, roots: &mut Vec<Tree>, tree: Tree| {
        match stack.last_mut() {
            Some(frame) => frame.children.push(tree),
            None => roots.push(tree),
        }
    };

    let mut chars = source.char_indices().peekable();
    while let Some((pos, ch)) = chars.next() {
        match ch {
            '(' => stack.push(Frame {
                label: None,
                children: Vec::new(),
            }),
            ')' => {
                let frame = stack.pop().ok_or_else(|| AbctkError::TreeStructure {
                    id: source_name.to_string(),
                    msg: "unbalanced closing parenthesis".to_string(),
                })?;
                let label = frame.label.unwrap_or_else(|| Annot::raw(""));
                push(&mut stack, &mut roots, Tree::node(label, frame.children));
            }
            _ if ch.is_whitespace() => {}
            _ => {
                let mut end = pos + ch.len_utf8();
                while let Some(&(next_pos, next_ch)) = chars.peek() {
                    if next_ch == '(' || next_ch == ')' || next_ch.is_whitespace() {
                        break;
                    }
                    end = next_pos + next_ch.len_utf8();
                    chars.next();
                }
                let atom = &source[pos..end];
                match stack.last_mut() {
                    Some(frame) if frame.label.is_none() => {
                        frame.label = Some(parse_label(atom, source_name));
                    }
                    _ => push(&mut stack, &mut roots, Tree::leaf(atom)),
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err(AbctkError::TreeStructure {
            id: source_name.to_string(),
            msg: format!("{} unclosed parenthesis(es)", stack.len()),
        });
    }

    Ok(roots)
}

/// IDノードを木から切り離します
///
/// 根がちょうど2つの子を持ち、第2子が`(ID 識別子)`であれば
/// 識別子をパースして本体を返します。その形でない木には新しい
/// 識別子が採番され、木はそのまま保持されます。IDノードの
/// 項数が不正な場合は警告を出して同様に扱います。
pub fn split_id(mut tree: Tree) -> (RecordId, Tree) {
    let is_wrapper = matches!(
        &tree,
        Tree::Node { children, .. }
            if children.len() == 2
                && children[1].label().is_some_and(|l| l.pprint(ReprMode::Tlcg) == "ID")
    );
    if !is_wrapper {
        return (RecordId::probe(), tree);
    }

    let Tree::Node { label, children } = &mut tree else {
        unreachable!("wrapper shape was just checked");
    };
    let id_node = children.pop().unwrap_or_else(|| unreachable!());
    let content = children.pop().unwrap_or_else(|| unreachable!());

    match id_node.children() {
        [Tree::Leaf(raw)] => (RecordId::from_string(raw), content),
        other => {
            log::warn!("ID node with arity {} kept verbatim", other.len());
            let id = RecordId::probe();
            let label = std::mem::replace(label, Annot::raw(""));
            (id, Tree::node(label, vec![content, id_node]))
        }
    }
}

/// 木をID込みの一行表記に整形します
pub fn flatten_tree_with_id(id: &RecordId, tree: &Tree) -> String {
    format!("(TOP {} (ID {id}))", tree.pprint(ReprMode::Tlcg))
}

/// 括弧付きコーパスのローダ
///
/// フォルダを走査し、ファイル名フィルタに合致するファイルの各文を
/// `(識別子, 木)`の組として産出します。
pub struct PsdLoader {
    file_filter: Regex,
}

impl Default for PsdLoader {
    fn default() -> Self {
        Self {
            file_filter: RE_PSD_FILE.clone(),
        }
    }
}

impl PsdLoader {
    /// ファイル名フィルタを指定してローダを生成します
    pub fn new(file_filter: Regex) -> Self {
        Self { file_filter }
    }

    /// 一つのファイルの内容をパースします
    pub fn load_str(&self, source: &str, source_name: &str) -> Result<Vec<(RecordId, Tree)>> {
        let trees = parse_trees(source, source_name)?;
        Ok(trees.into_iter().map(split_id).collect())
    }

    /// 一つのファイルを読み込んでパースします
    pub fn load_file<P>(&self, path: P) -> Result<Vec<(RecordId, Tree)>>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        self.load_str(&source, &path.display().to_string())
    }

    /// フォルダ以下の全ファイルを走査して文を産出します
    ///
    /// ファイルはパス順に整列され、ファイル内の文は出現順に
    /// 産出されます。ファイル単位のエラーは項目として産出され、
    /// 走査は続行されます。
    pub fn iter_dir<P>(&self, dir: P) -> Result<PsdIter>
    where
        P: AsRef<Path>,
    {
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => AbctkError::Io(io),
                None => AbctkError::TreeStructure {
                    id: String::new(),
                    msg: "walk hit a filesystem loop".to_string(),
                },
            })?;
            if entry.file_type().is_file()
                && self
                    .file_filter
                    .is_match(&entry.file_name().to_string_lossy())
            {
                files.push(entry.into_path());
            }
        }

        log::info!("found {} treebank file(s)", files.len());
        Ok(PsdIter {
            loader: Self {
                file_filter: self.file_filter.clone(),
            },
            files: files.into_iter(),
            pending: Vec::new().into_iter(),
        })
    }
}

/// [`PsdLoader::iter_dir`]が返す遅延イテレータ
pub struct PsdIter {
    loader: PsdLoader,
    files: std::vec::IntoIter<PathBuf>,
    pending: std::vec::IntoIter<(RecordId, Tree)>,
}

impl Iterator for PsdIter {
    type Item = Result<(RecordId, Tree)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.pending.next() {
                return Some(Ok(pair));
            }
            let path = self.files.next()?;
            match self.loader.load_file(&path) {
                Ok(pairs) => self.pending = pairs.into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// 文の列を識別子でソートしてフォルダへ書き出します
///
/// 識別子の名前ごとに一つのファイルが作られ、パスは
/// [`RecordId::tell_path`]で導出されます。必要な中間ディレクトリは
/// 作成され、既存のファイルは上書きされます。
pub fn dump_psd<P>(pairs: &mut [(RecordId, Tree)], dest: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let dest = dest.as_ref();
    pairs.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut idx = 0;
    while idx < pairs.len() {
        let name = pairs[idx].0.name.clone();
        let group_end = pairs[idx..]
            .iter()
            .position(|(id, _)| id.name != name)
            .map_or(pairs.len(), |off| idx + off);

        let path = dest.join(RecordId::path_of_name(&name));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&path)?);
        for (id, tree) in &pairs[idx..group_end] {
            writeln!(writer, "{}", flatten_tree_with_id(id, tree))?;
        }
        writer.flush()?;
        log::info!(
            "wrote {} record(s) to {}",
            group_end - idx,
            path.display(),
        );

        idx = group_end;
    }

    Ok(())
}
