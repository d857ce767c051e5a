//! カテゴリ簡約（CCG結合規則の探索）
//!
//! 隣接する2つのカテゴリ`L`、`R`に対して、関手適用規則と
//! 関数合成規則で到達可能な簡約結果をすべて列挙します。
//! 関数合成の次数は3で打ち切られます。
//!
//! カテゴリは不変値であるため、結果は`(L, R)`の組をキーとして
//! プロセス全体でメモ化されます。
//!
//! # 使用例
//!
//! ```
//! use abctk::cat::AbcCat;
//! use abctk::cat::simplify::simplify_exh;
//!
//! let left = AbcCat::parse("<S/NP>").unwrap();
//! let right = AbcCat::parse("NP").unwrap();
//! let results = simplify_exh(&left, &right);
//! assert_eq!(results[0].0, AbcCat::base("S"));
//! assert_eq!(results[0].1.to_string(), ">");
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{LazyLock, Mutex};

use hashbrown::HashMap;

use crate::cat::{AbcCat, FunctorMode};

/// 関数合成次数の上限
const MAX_COMPOSITION_LEVEL: usize = 3;

/// 垂直関手の消去時に関手がどちら側にあったか
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertSide {
    /// 関手が左側にあり、右隣の項を消費した
    FunctorOnLeft,

    /// 関手が右側にあり、左隣の項を消費した
    FunctorOnRight,
}

/// 簡約の詳細（消去の種類）
///
/// どの結合規則が何次の合成で使われたかを記録します。
/// 表示形式は`>`、`<`、`|>`、`|<`、`|`、`>Bn`、`<Bn`、`|Bn`です。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElimType {
    /// 右関手の消去。`>`（適用）または`>Bn`（n次合成）。
    Right(u8),

    /// 左関手の消去。`<`（適用）または`<Bn`（n次合成）。
    Left(u8),

    /// 垂直関手の消去。方向が復元可能な適用では`|>`または`|<`、
    /// それ以外では`|`または`|Bn`。
    Vert(u8, Option<VertSide>),
}

impl ElimType {
    /// 合成の次数を返します。適用は0です。
    pub fn level(&self) -> u8 {
        match self {
            Self::Right(n) | Self::Left(n) | Self::Vert(n, _) => *n,
        }
    }
}

impl fmt::Display for ElimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Right(0) => write!(f, ">"),
            Self::Right(n) => write!(f, ">B{n}"),
            Self::Left(0) => write!(f, "<"),
            Self::Left(n) => write!(f, "<B{n}"),
            Self::Vert(0, Some(VertSide::FunctorOnLeft)) => write!(f, "|>"),
            Self::Vert(0, Some(VertSide::FunctorOnRight)) => write!(f, "|<"),
            Self::Vert(0, None) => write!(f, "|"),
            Self::Vert(n, _) => write!(f, "|B{n}"),
        }
    }
}

/// 簡約結果の組
pub type SimplifyRes = (AbcCat, ElimType);

/// 探索キューの項目
///
/// `wrappers`は合成で剥がした関手の殻で、簡約成功時に逆順で巻き戻されます。
struct QueueItem<'a> {
    functor: &'a AbcCat,
    arg: AbcCat,
    ant_left: bool,
    wrappers: Vec<(FunctorMode, AbcCat)>,
}

/// 2つの隣接カテゴリの簡約結果を列挙します
///
/// 適用規則と次数3までの合成規則を幅優先で探索します。
/// 簡約が不可能な場合は空のベクタを返します。これはエラーではありません。
pub fn simplify(left: &AbcCat, right: &AbcCat) -> Vec<SimplifyRes> {
    let mut results: Vec<SimplifyRes> = Vec::new();
    let mut queue: VecDeque<QueueItem<'_>> = VecDeque::new();

    if let AbcCat::Functor { mode, .. } = left {
        if matches!(mode, FunctorMode::Right | FunctorMode::Vert) {
            queue.push_back(QueueItem {
                functor: left,
                arg: right.clone(),
                ant_left: false,
                wrappers: Vec::new(),
            });
        }
    }
    if let AbcCat::Functor { mode, .. } = right {
        if matches!(mode, FunctorMode::Left | FunctorMode::Vert) {
            queue.push_back(QueueItem {
                functor: right,
                arg: left.clone(),
                ant_left: true,
                wrappers: Vec::new(),
            });
        }
    }

    while let Some(item) = queue.pop_front() {
        let AbcCat::Functor { mode, ant, conseq } = item.functor else {
            unreachable!("only functors are enqueued");
        };

        if **ant == item.arg {
            // The functor eliminates against its antecedent; rewind the
            // composition shells collected on the way here.
            let mut cat = (**conseq).clone();
            for (wrap_mode, wrap_ant) in item.wrappers.iter().rev() {
                cat = AbcCat::functor(*wrap_mode, wrap_ant.clone(), cat);
            }

            let level = item.wrappers.len() as u8;
            let elim = match mode {
                FunctorMode::Right => ElimType::Right(level),
                FunctorMode::Left => ElimType::Left(level),
                FunctorMode::Vert => {
                    let side = if item.ant_left {
                        VertSide::FunctorOnRight
                    } else {
                        VertSide::FunctorOnLeft
                    };
                    ElimType::Vert(level, Some(side))
                }
            };
            results.push((cat, elim));
        } else if item.wrappers.len() < MAX_COMPOSITION_LEVEL {
            // Try function composition: peel one functor shell off the
            // argument when its direction agrees with the eliminator.
            if let AbcCat::Functor {
                mode: arg_mode,
                ant: arg_ant,
                conseq: arg_conseq,
            } = &item.arg
            {
                if arg_mode == mode {
                    let mut wrappers = item.wrappers;
                    wrappers.push((*arg_mode, (**arg_ant).clone()));
                    queue.push_back(QueueItem {
                        functor: item.functor,
                        arg: (**arg_conseq).clone(),
                        ant_left: item.ant_left,
                        wrappers,
                    });
                }
            }
        }
    }

    results
}

static SIMPLIFY_CACHE: LazyLock<Mutex<HashMap<(AbcCat, AbcCat), Vec<SimplifyRes>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// 簡約結果の集合を返します（メモ化付き）
///
/// [`simplify`]の結果から重複を除いたものを返します。結果の順序は
/// 探索順で決定的であり、一意な簡約が必要な呼び出し元は先頭要素を
/// 選択します。
pub fn simplify_exh(left: &AbcCat, right: &AbcCat) -> Vec<SimplifyRes> {
    let key = (left.clone(), right.clone());
    {
        let cache = SIMPLIFY_CACHE.lock().unwrap();
        if let Some(hit) = cache.get(&key) {
            return hit.clone();
        }
    }

    let mut results = simplify(left, right);
    let mut seen: Vec<SimplifyRes> = Vec::with_capacity(results.len());
    results.retain(|res| {
        if seen.contains(res) {
            false
        } else {
            seen.push(res.clone());
            true
        }
    });

    SIMPLIFY_CACHE
        .lock()
        .unwrap()
        .insert(key, results.clone());
    results
}
